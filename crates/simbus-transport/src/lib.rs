//! UDP socket construction for the cockpit export stream.
//!
//! Two sockets per session: a multicast receive socket joined to the
//! simulator's export group, and a broadcast-capable send socket aimed at
//! the simulator's command port. Socket option plumbing goes through
//! `socket2`; the sockets themselves are plain `std::net::UdpSocket`s.

pub mod error;
pub mod udp;

pub use error::{Result, TransportError};
pub use udp::{UdpReceiveSocket, UdpSendSocket, RECEIVE_TIMEOUT};
