use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use simbus_session::{NotifyMode, Session, SessionConfig, SessionEvents};

use crate::cmd::SendArgs;
use crate::exit::{session_error, CliError, CliResult, SUCCESS, TIMEOUT};

/// How long to wait for the command-sent acknowledgement.
const SEND_DEADLINE: Duration = Duration::from_secs(2);

struct AckEvents {
    tx: Mutex<Sender<String>>,
}

impl SessionEvents for AckEvents {
    fn command_sent(&self, _sender: Option<&str>, text: &str) {
        if let Ok(tx) = self.tx.lock() {
            let _ = tx.send(text.to_owned());
        }
    }
}

pub fn run(args: SendArgs) -> CliResult<i32> {
    let mut text = args.text;
    if !text.ends_with('\n') {
        text.push('\n');
    }

    // Degenerate receive mode: no decode, no pass-through, ephemeral
    // receive port so a listener on the default port is not disturbed.
    let mut config = SessionConfig::from_parts(
        "127.0.0.1",
        &args.target,
        0,
        args.port,
        NotifyMode {
            decode: false,
            pass_through: false,
        },
    );
    config.receive_port = 0;

    let (tx, rx) = mpsc::channel();
    let session = Session::new(config, Arc::new(AckEvents { tx: Mutex::new(tx) }));
    session
        .startup()
        .map_err(|err| session_error("startup failed", err))?;

    session.enqueue_command(Some("simbus-cli"), &text);

    let result = rx.recv_timeout(SEND_DEADLINE);
    session.shutdown();

    match result {
        Ok(sent) => {
            println!("sent: {}", sent.trim_end());
            Ok(SUCCESS)
        }
        Err(_) => {
            let detail = session
                .faults()
                .take()
                .map(|fault| format!(": {fault}"))
                .unwrap_or_default();
            Err(CliError::new(
                TIMEOUT,
                format!("no send acknowledgement within {SEND_DEADLINE:?}{detail}"),
            ))
        }
    }
}
