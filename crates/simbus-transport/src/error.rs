use std::net::{Ipv4Addr, SocketAddrV4};

/// Errors that can occur constructing or using the UDP sockets.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind the receive socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddrV4,
        source: std::io::Error,
    },

    /// Failed to join the export multicast group.
    #[error("failed to join multicast group {group}: {source}")]
    JoinMulticast {
        group: Ipv4Addr,
        source: std::io::Error,
    },

    /// Failed to send a datagram to the command target.
    #[error("failed to send to {target}: {source}")]
    Send {
        target: SocketAddrV4,
        source: std::io::Error,
    },

    /// An I/O error occurred on a socket.
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
