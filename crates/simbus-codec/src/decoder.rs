use bytes::{Bytes, BytesMut};
use tracing::trace;

/// The sync marker byte.
pub const SYNC_BYTE: u8 = 0x55;

/// Number of consecutive sync bytes required to enter a frame.
pub const SYNC_RUN: usize = 4;

/// Frame header: address (2) + length (2) = 4 bytes, both little-endian.
pub const HEADER_SIZE: usize = 4;

/// One decoded state change: the control at `address` now holds `data`.
///
/// Transient — the decoder hands these out in stream order and retains
/// nothing. Mapping addresses to named controls is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlUpdate {
    /// 16-bit identifier of the cockpit control.
    pub address: u16,
    /// Payload bytes associated with the address.
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    SeekSync,
    Header,
    Payload,
}

/// Stateful decoder for the export byte stream.
///
/// Feed it raw chunks as they arrive; complete frames are emitted through
/// the callback, in the exact order they complete in the stream. State
/// carries over between `feed` calls, so a chunk ending mid-header or
/// mid-payload resumes exactly where it left off — no data loss, no
/// re-scanning.
///
/// Malformed input never raises an error: the only way out of the sync
/// search is four consecutive `0x55` bytes, so garbage is inertly
/// discarded. Extra `0x55` bytes beyond the fourth are absorbed as an
/// extended sync run.
///
/// Single-producer: `feed` must be called from one thread at a time.
#[derive(Debug)]
pub struct StreamDecoder {
    phase: Phase,
    sync_run: usize,
    header: [u8; HEADER_SIZE],
    header_len: usize,
    address: u16,
    remaining: usize,
    payload: BytesMut,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self {
            phase: Phase::SeekSync,
            sync_run: 0,
            header: [0; HEADER_SIZE],
            header_len: 0,
            address: 0,
            remaining: 0,
            payload: BytesMut::new(),
        }
    }

    /// Feed one received chunk into the decoder.
    ///
    /// `emit` is invoked synchronously for every frame that completes
    /// within this chunk; it must not block for long, or it will stall
    /// the receive path.
    pub fn feed<F>(&mut self, chunk: &[u8], emit: &mut F)
    where
        F: FnMut(ControlUpdate),
    {
        let mut i = 0;
        while i < chunk.len() {
            match self.phase {
                Phase::SeekSync => {
                    let byte = chunk[i];
                    if byte == SYNC_BYTE {
                        self.sync_run += 1;
                        i += 1;
                    } else if self.sync_run >= SYNC_RUN {
                        // First non-sync byte after a complete marker is the
                        // first header byte; the header phase consumes it.
                        self.sync_run = 0;
                        self.header_len = 0;
                        self.phase = Phase::Header;
                    } else {
                        self.sync_run = 0;
                        i += 1;
                    }
                }
                Phase::Header => {
                    self.header[self.header_len] = chunk[i];
                    self.header_len += 1;
                    i += 1;
                    if self.header_len == HEADER_SIZE {
                        self.address = u16::from_le_bytes([self.header[0], self.header[1]]);
                        self.remaining =
                            u16::from_le_bytes([self.header[2], self.header[3]]) as usize;
                        trace!(
                            address = self.address,
                            length = self.remaining,
                            "frame header"
                        );
                        if self.remaining == 0 {
                            emit(ControlUpdate {
                                address: self.address,
                                data: Bytes::new(),
                            });
                            self.phase = Phase::SeekSync;
                        } else {
                            self.payload.clear();
                            self.payload.reserve(self.remaining);
                            self.phase = Phase::Payload;
                        }
                    }
                }
                Phase::Payload => {
                    let take = self.remaining.min(chunk.len() - i);
                    self.payload.extend_from_slice(&chunk[i..i + take]);
                    self.remaining -= take;
                    i += take;
                    if self.remaining == 0 {
                        emit(ControlUpdate {
                            address: self.address,
                            data: self.payload.split().freeze(),
                        });
                        self.phase = Phase::SeekSync;
                    }
                }
            }
        }
    }

}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}
