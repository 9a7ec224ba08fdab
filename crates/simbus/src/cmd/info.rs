use simbus_codec::{HEADER_SIZE, SYNC_BYTE, SYNC_RUN};
use simbus_session::{DEFAULT_RECEIVE_GROUP, DEFAULT_RECEIVE_PORT, DEFAULT_SEND_TARGET};

use crate::exit::{CliResult, SUCCESS};

pub fn run() -> CliResult<i32> {
    println!("simbus {}", env!("CARGO_PKG_VERSION"));
    println!("export stream: {DEFAULT_RECEIVE_GROUP}:{DEFAULT_RECEIVE_PORT} (multicast)");
    println!("command target: {DEFAULT_SEND_TARGET}");
    println!(
        "wire format: {SYNC_RUN}x 0x{SYNC_BYTE:02X} sync, {HEADER_SIZE}-byte header (address u16 LE, length u16 LE), payload"
    );
    Ok(SUCCESS)
}
