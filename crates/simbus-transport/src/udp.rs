use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Receive timeout on the export stream socket.
///
/// The receive loop uses this as its polling granularity when idle; it
/// also bounds how long `shutdown` waits for the loop to notice the flag.
pub const RECEIVE_TIMEOUT: Duration = Duration::from_millis(200);

/// The multicast receive socket for the export stream.
///
/// Bound to `0.0.0.0:port` with `SO_REUSEADDR` so multiple clients on one
/// host can listen to the same export stream, and joined to the export
/// group. A non-multicast group address skips the join — the socket then
/// receives whatever unicast traffic is aimed at the port, which is how
/// loopback test feeds work.
pub struct UdpReceiveSocket {
    socket: UdpSocket,
    group: Ipv4Addr,
    port: u16,
}

impl UdpReceiveSocket {
    /// Bind the receive socket and join `group` if it is a multicast address.
    pub fn bind(group: Ipv4Addr, port: u16) -> Result<Self> {
        let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);

        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_read_timeout(Some(RECEIVE_TIMEOUT))?;
        socket
            .bind(&SocketAddr::V4(bind_addr).into())
            .map_err(|source| TransportError::Bind {
                addr: bind_addr,
                source,
            })?;

        if group.is_multicast() {
            socket
                .join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)
                .map_err(|source| TransportError::JoinMulticast { group, source })?;
        } else {
            debug!(%group, "group is not multicast, skipping join");
        }

        // Resolve the concrete port in case the caller asked for 0.
        let port = socket
            .local_addr()?
            .as_socket()
            .map(|addr| addr.port())
            .unwrap_or(port);

        info!(%group, port, "listening for export stream");

        Ok(Self {
            socket: socket.into(),
            group,
            port,
        })
    }

    /// Receive one datagram (blocking, bounded by [`RECEIVE_TIMEOUT`]).
    ///
    /// Returns the raw `io::Result` so the caller can distinguish a
    /// timeout (`WouldBlock`/`TimedOut`) from a real failure.
    pub fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.socket.recv_from(buf).map(|(len, _addr)| len)
    }

    /// The group this socket listens to.
    pub fn group(&self) -> Ipv4Addr {
        self.group
    }

    /// The local port this socket is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// The command send socket.
///
/// Bound to an ephemeral port with broadcast enabled; every `send` is one
/// datagram to the fixed command target.
pub struct UdpSendSocket {
    socket: UdpSocket,
    target: SocketAddrV4,
}

impl UdpSendSocket {
    /// Open a send socket aimed at `target`.
    pub fn open(target: SocketAddrV4) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_broadcast(true)?;

        let local = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0);
        socket
            .bind(&SocketAddr::V4(local).into())
            .map_err(|source| TransportError::Bind {
                addr: local,
                source,
            })?;

        debug!(%target, "command send socket open");

        Ok(Self {
            socket: socket.into(),
            target,
        })
    }

    /// Send one datagram to the command target.
    pub fn send(&self, payload: &[u8]) -> Result<usize> {
        self.socket
            .send_to(payload, SocketAddr::V4(self.target))
            .map_err(|source| TransportError::Send {
                target: self.target,
                source,
            })
    }

    /// The configured command target.
    pub fn target(&self) -> SocketAddrV4 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_unicast_group_skips_join() {
        let socket = UdpReceiveSocket::bind(Ipv4Addr::LOCALHOST, 0).expect("bind should succeed");
        assert_eq!(socket.group(), Ipv4Addr::LOCALHOST);
    }

    #[test]
    fn recv_times_out_when_idle() {
        let socket = UdpReceiveSocket::bind(Ipv4Addr::LOCALHOST, 0).expect("bind should succeed");
        let mut buf = [0u8; 16];
        let err = socket.recv(&mut buf).expect_err("idle recv should time out");
        assert!(matches!(
            err.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        ));
    }

    #[test]
    fn send_reaches_loopback_listener() {
        let listener = UdpSocket::bind("127.0.0.1:0").expect("listener should bind");
        let target = match listener.local_addr().expect("local addr") {
            SocketAddr::V4(addr) => addr,
            SocketAddr::V6(_) => unreachable!("bound v4"),
        };

        let sender = UdpSendSocket::open(target).expect("send socket should open");
        assert_eq!(sender.target(), target);
        sender.send(b"PING 1\n").expect("send should succeed");

        let mut buf = [0u8; 32];
        let (len, _) = listener.recv_from(&mut buf).expect("datagram should arrive");
        assert_eq!(&buf[..len], b"PING 1\n");
    }

    #[test]
    fn two_receive_sockets_share_a_port() {
        let first = UdpReceiveSocket::bind(Ipv4Addr::LOCALHOST, 0).expect("first bind");
        let second = UdpReceiveSocket::bind(Ipv4Addr::LOCALHOST, first.port());
        assert!(second.is_ok(), "SO_REUSEADDR should allow a shared port");
    }
}
