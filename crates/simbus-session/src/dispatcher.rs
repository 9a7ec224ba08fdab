use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use simbus_codec::encode_command_ascii;
use simbus_transport::UdpSendSocket;
use tracing::{debug, warn};

use crate::events::SessionEvents;
use crate::fault::FaultTracker;

/// How long the consumer parks between running-flag checks.
///
/// A safety valve against the shutdown race, not a feature-level timeout:
/// shutdown latency for an idle dispatcher is at most one such wait.
pub(crate) const QUEUE_WAIT: Duration = Duration::from_millis(100);

/// One queued outbound command.
///
/// Immutable once enqueued. The optional sender tag is opaque to the
/// transport and comes back verbatim in the command-sent event. The text
/// carries its own terminator (`"<TOKEN> <ARGUMENT>\n"`); the transport
/// adds nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand {
    pub sender: Option<String>,
    pub text: String,
}

/// Consumer loop: single thread draining the command queue in FIFO order.
///
/// One consumer is what guarantees the global send order across all
/// producers. A failed send is logged and recorded, never fatal — the
/// loop moves on to the next queued command.
pub(crate) fn run_consumer(
    queue: Receiver<OutboundCommand>,
    socket: Arc<UdpSendSocket>,
    events: Arc<dyn SessionEvents>,
    running: Arc<AtomicBool>,
    faults: Arc<FaultTracker>,
) {
    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match queue.recv_timeout(QUEUE_WAIT) {
            Ok(command) => {
                let payload = encode_command_ascii(&command.text);
                match socket.send(&payload) {
                    Ok(_) => {
                        debug!(text = command.text.trim_end(), "command sent");
                        events.command_sent(command.sender.as_deref(), &command.text);
                    }
                    Err(err) => {
                        warn!(send_target = %socket.target(), error = %err, "command send failed");
                        faults.record("dispatcher", err.to_string());
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("dispatcher stopped");
}
