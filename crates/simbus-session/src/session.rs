use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use simbus_codec::{is_blank, StreamDecoder};
use simbus_transport::{UdpReceiveSocket, UdpSendSocket};
use tracing::{debug, error, info, trace};

use crate::config::{NotifyMode, SessionConfig};
use crate::dispatcher::{self, OutboundCommand};
use crate::error::Result;
use crate::events::SessionEvents;
use crate::fault::FaultTracker;

/// Period of the idle-throttle pulse.
///
/// When no datagram is available the receive loop parks on this signal
/// instead of spinning, bounding idle CPU while adding at most one period
/// of latency.
const THROTTLE_PERIOD: Duration = Duration::from_millis(10);

/// Largest payload a single UDP datagram can carry.
const MAX_DATAGRAM: usize = 65_507;

/// One Startup-to-Shutdown lifetime of the transport.
///
/// A running session owns two UDP sockets and exactly three threads: the
/// receive loop, the throttle timer and the command dispatcher. `startup`
/// and `shutdown` are idempotent and callable from any thread, as are
/// [`enqueue_command`](Session::enqueue_command) and the fault accessors.
pub struct Session {
    config: SessionConfig,
    events: Arc<dyn SessionEvents>,
    faults: Arc<FaultTracker>,
    running: Arc<AtomicBool>,
    throttle: Arc<Throttle>,
    state: Mutex<Option<RunningState>>,
}

struct RunningState {
    command_tx: Sender<OutboundCommand>,
    threads: Vec<(&'static str, JoinHandle<()>)>,
}

impl Session {
    /// Create a session. Nothing starts until [`startup`](Session::startup).
    pub fn new(config: SessionConfig, events: Arc<dyn SessionEvents>) -> Self {
        Self {
            config,
            events,
            faults: Arc::new(FaultTracker::new()),
            running: Arc::new(AtomicBool::new(false)),
            throttle: Arc::new(Throttle::default()),
            state: Mutex::new(None),
        }
    }

    /// Open both sockets and start the three session threads.
    ///
    /// Idempotent: a call while already running is a no-op. A session whose
    /// receive loop died on a fault is not running and is restarted like
    /// any stopped session — its leftover threads are reclaimed first. On
    /// failure the fault is recorded, partially-opened sockets are closed
    /// and the session remains not-running.
    pub fn startup(&self) -> Result<()> {
        let mut state = self.state_slot();
        if let Some(run) = state.take() {
            if self.running.load(Ordering::SeqCst) {
                debug!("startup called while running, ignoring");
                *state = Some(run);
                return Ok(());
            }
            // The receive loop died and cleared the flag on its own; the
            // other two threads have exited or are about to. Reap them so
            // the old receive socket is released before rebinding.
            debug!("reclaiming dead session before restart");
            self.teardown(run);
        }

        let receive_socket =
            UdpReceiveSocket::bind(self.config.receive_group, self.config.receive_port)
                .map_err(|err| {
                    self.faults.record("startup", err.to_string());
                    error!(error = %err, "receive socket setup failed");
                    err
                })?;
        let send_socket = UdpSendSocket::open(self.config.send_target).map_err(|err| {
            // The receive socket is dropped here, so nothing leaks.
            self.faults.record("startup", err.to_string());
            error!(error = %err, "send socket setup failed");
            err
        })?;
        let send_socket = Arc::new(send_socket);

        let (command_tx, command_rx) = mpsc::channel();
        self.running.store(true, Ordering::SeqCst);

        let throttle_thread = {
            let running = self.running.clone();
            let throttle = self.throttle.clone();
            thread::spawn(move || {
                while running.load(Ordering::SeqCst) {
                    thread::sleep(THROTTLE_PERIOD);
                    throttle.pulse();
                }
            })
        };

        let receive_thread = {
            let running = self.running.clone();
            let throttle = self.throttle.clone();
            let events = self.events.clone();
            let faults = self.faults.clone();
            let mode = self.config.mode;
            thread::spawn(move || {
                receive_loop(receive_socket, mode, events, running, throttle, faults);
            })
        };

        let dispatcher_thread = {
            let running = self.running.clone();
            let events = self.events.clone();
            let faults = self.faults.clone();
            thread::spawn(move || {
                dispatcher::run_consumer(command_rx, send_socket, events, running, faults);
            })
        };

        *state = Some(RunningState {
            command_tx,
            threads: vec![
                ("throttle", throttle_thread),
                ("receive", receive_thread),
                ("dispatcher", dispatcher_thread),
            ],
        });

        info!(
            group = %self.config.receive_group,
            port = self.config.receive_port,
            target = %self.config.send_target,
            "session started"
        );
        Ok(())
    }

    /// Stop all threads and close both sockets.
    ///
    /// Idempotent, and every teardown step is best-effort: a failed step
    /// is recorded in the fault tracker and later steps still run.
    pub fn shutdown(&self) {
        let Some(run) = self.state_slot().take() else {
            debug!("shutdown called while not running, ignoring");
            return;
        };

        self.teardown(run);
        info!("session stopped");
    }

    /// Clear the running flag, wake every parked thread and join all three.
    ///
    /// Best-effort: a panicked thread is recorded in the fault tracker and
    /// the remaining joins still run.
    fn teardown(&self, run: RunningState) {
        self.running.store(false, Ordering::SeqCst);
        self.throttle.pulse();
        // Dropping the queue tail wakes an idle consumer immediately.
        drop(run.command_tx);

        for (name, handle) in run.threads {
            if handle.join().is_err() {
                self.faults
                    .record("shutdown", format!("{name} thread panicked"));
            }
        }
    }

    /// True only between a completed `startup` and a subsequent `shutdown`.
    ///
    /// Also cleared by the receive loop itself if it dies on an unexpected
    /// error, so a degraded session is observable here.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Queue one command for transmission.
    ///
    /// Empty or all-whitespace text is silently dropped, as is any command
    /// enqueued while the session is not running. Commands are sent in
    /// global FIFO enqueue order.
    pub fn enqueue_command(&self, sender: Option<&str>, text: &str) {
        if is_blank(text) {
            trace!("dropping blank command");
            return;
        }
        if let Some(run) = self.state_slot().as_ref() {
            let _ = run.command_tx.send(OutboundCommand {
                sender: sender.map(str::to_owned),
                text: text.to_owned(),
            });
        } else {
            debug!("command enqueued while not running, dropping");
        }
    }

    /// The session's fault tracker.
    pub fn faults(&self) -> &FaultTracker {
        &self.faults
    }

    /// The configuration this session was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn state_slot(&self) -> MutexGuard<'_, Option<RunningState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Receive side of the loop; implemented by the UDP socket and by test
/// doubles injecting failures.
trait DatagramSource {
    fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize>;
}

impl DatagramSource for UdpReceiveSocket {
    fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
        UdpReceiveSocket::recv(self, buf)
    }
}

fn receive_loop(
    socket: impl DatagramSource,
    mode: NotifyMode,
    events: Arc<dyn SessionEvents>,
    running: Arc<AtomicBool>,
    throttle: Arc<Throttle>,
    faults: Arc<FaultTracker>,
) {
    let mut decoder = StreamDecoder::new();
    let mut buf = vec![0u8; MAX_DATAGRAM];

    while running.load(Ordering::SeqCst) {
        match socket.recv(&mut buf) {
            Ok(len) => {
                events.connection_active();
                let chunk = &buf[..len];
                if mode.decode {
                    decoder.feed(chunk, &mut |update| events.control_update(&update));
                }
                if mode.pass_through {
                    events.bulk_data(chunk);
                }
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                // Nothing available; park until the next throttle pulse.
                throttle.wait();
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                error!(error = %err, "receive loop failed");
                faults.record("receive", err.to_string());
                // A dead receive loop must be observable, not silent.
                running.store(false, Ordering::SeqCst);
                break;
            }
        }
    }
    debug!("receive loop stopped");
}

/// Auto-reset pulse signal: the timer thread raises it once per period,
/// the receive loop consumes it when idle.
#[derive(Debug, Default)]
struct Throttle {
    raised: Mutex<bool>,
    condvar: Condvar,
}

impl Throttle {
    fn pulse(&self) {
        let mut raised = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        *raised = true;
        self.condvar.notify_all();
    }

    fn wait(&self) {
        let mut raised = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        if !*raised {
            // Bounded wait so a missed pulse can never park us forever.
            let (guard, _timeout) = self
                .condvar
                .wait_timeout(raised, THROTTLE_PERIOD * 2)
                .unwrap_or_else(PoisonError::into_inner);
            raised = guard;
        }
        *raised = false;
    }
}
