use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use simbus_codec::ControlUpdate;
use simbus_session::{NotifyMode, Session, SessionConfig, SessionEvents};

use crate::cmd::ListenArgs;
use crate::exit::{session_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS};

struct PrintEvents {
    printed: AtomicUsize,
}

impl SessionEvents for PrintEvents {
    fn control_update(&self, update: &ControlUpdate) {
        println!(
            "{:04X} = {}",
            update.address,
            hex::encode(update.data.as_ref())
        );
        self.printed.fetch_add(1, Ordering::SeqCst);
    }

    fn bulk_data(&self, bytes: &[u8]) {
        println!("raw {} bytes: {}", bytes.len(), hex::encode(bytes));
        self.printed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn run(args: ListenArgs) -> CliResult<i32> {
    let mode = if args.raw {
        NotifyMode::PASS_THROUGH
    } else {
        NotifyMode::DECODE
    };
    let config = SessionConfig::from_parts(&args.group, "", args.port, 0, mode);

    let events = Arc::new(PrintEvents {
        printed: AtomicUsize::new(0),
    });
    let session = Session::new(config, events.clone());
    session
        .startup()
        .map_err(|err| session_error("startup failed", err))?;

    // Echo the resolved addresses, since empty args fall back to defaults.
    let resolved = session.config();
    eprintln!(
        "listening on {}:{} ({})",
        resolved.receive_group,
        resolved.receive_port,
        if args.raw { "raw" } else { "decoded" }
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(interrupted.clone())?;

    while !interrupted.load(Ordering::SeqCst) && session.is_running() {
        if let Some(count) = args.count {
            if events.printed.load(Ordering::SeqCst) >= count {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let died = !session.is_running();
    session.shutdown();

    if died {
        if let Some(fault) = session.faults().take() {
            return Err(CliError::new(FAILURE, format!("session died: {fault}")));
        }
    }
    Ok(SUCCESS)
}

fn install_ctrlc_handler(interrupted: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
