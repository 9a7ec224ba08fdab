//! Wire-stream decoding for the cockpit-state export protocol.
//!
//! The simulator exports cockpit state as a continuous byte stream carried
//! over UDP. Each frame is:
//! - A sync marker: four (or more) consecutive `0x55` bytes
//! - A 4-byte header: `address` (u16 LE), `length` (u16 LE)
//! - `length` payload bytes
//!
//! Frames are not aligned to datagram boundaries — a frame may straddle
//! datagrams and one datagram may carry many frames. [`StreamDecoder`]
//! reassembles frames regardless of how the bytes are chunked.

pub mod decoder;
pub mod text;

pub use decoder::{ControlUpdate, StreamDecoder, HEADER_SIZE, SYNC_BYTE, SYNC_RUN};
pub use text::{encode_command_ascii, is_blank};
