use std::net::{Ipv4Addr, SocketAddrV4};

use tracing::warn;

/// Default export multicast group.
pub const DEFAULT_RECEIVE_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 50, 10);

/// Default export stream port.
pub const DEFAULT_RECEIVE_PORT: u16 = 5010;

/// Default command target.
pub const DEFAULT_SEND_TARGET: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 7778);

/// Which notifications a session delivers.
///
/// The two capabilities are independent: `decode` feeds received bytes to
/// the stream decoder, `pass_through` emits them verbatim as bulk data.
/// Either, both, or (degenerate) neither may be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyMode {
    pub decode: bool,
    pub pass_through: bool,
}

impl NotifyMode {
    pub const DECODE: Self = Self {
        decode: true,
        pass_through: false,
    };

    pub const PASS_THROUGH: Self = Self {
        decode: false,
        pass_through: true,
    };

    pub const BOTH: Self = Self {
        decode: true,
        pass_through: true,
    };
}

impl Default for NotifyMode {
    fn default() -> Self {
        Self::DECODE
    }
}

/// Addresses and mode for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Multicast group (or unicast address) the export stream arrives on.
    pub receive_group: Ipv4Addr,
    /// Local port the receive socket binds to.
    pub receive_port: u16,
    /// Destination for outbound command datagrams.
    pub send_target: SocketAddrV4,
    /// Active notification capabilities.
    pub mode: NotifyMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            receive_group: DEFAULT_RECEIVE_GROUP,
            receive_port: DEFAULT_RECEIVE_PORT,
            send_target: DEFAULT_SEND_TARGET,
            mode: NotifyMode::default(),
        }
    }
}

impl SessionConfig {
    /// Build a config from caller-supplied strings and ports.
    ///
    /// Any empty or unparsable address falls back to its default, as does
    /// a port of zero. Invalid input is never an error here — the caller
    /// gets a working default session instead.
    pub fn from_parts(
        receive_ip: &str,
        send_ip: &str,
        receive_port: u16,
        send_port: u16,
        mode: NotifyMode,
    ) -> Self {
        let receive_group = parse_or_default(receive_ip, DEFAULT_RECEIVE_GROUP, "receive");
        let send_ip = parse_or_default(send_ip, *DEFAULT_SEND_TARGET.ip(), "send");

        let receive_port = if receive_port > 0 {
            receive_port
        } else {
            DEFAULT_RECEIVE_PORT
        };
        let send_port = if send_port > 0 {
            send_port
        } else {
            DEFAULT_SEND_TARGET.port()
        };

        Self {
            receive_group,
            receive_port,
            send_target: SocketAddrV4::new(send_ip, send_port),
            mode,
        }
    }
}

fn parse_or_default(value: &str, default: Ipv4Addr, which: &str) -> Ipv4Addr {
    if value.is_empty() {
        return default;
    }
    match value.parse() {
        Ok(addr) => addr,
        Err(_) => {
            warn!(value, which, "unparsable address, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_parts_are_kept() {
        let config = SessionConfig::from_parts(
            "224.0.0.99",
            "192.168.1.5",
            6010,
            8778,
            NotifyMode::BOTH,
        );
        assert_eq!(config.receive_group, Ipv4Addr::new(224, 0, 0, 99));
        assert_eq!(config.receive_port, 6010);
        assert_eq!(
            config.send_target,
            SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 5), 8778)
        );
        assert_eq!(config.mode, NotifyMode::BOTH);
    }

    #[test]
    fn empty_and_garbage_fall_back_to_defaults() {
        let config = SessionConfig::from_parts("", "not-an-ip", 0, 0, NotifyMode::DECODE);
        assert_eq!(config.receive_group, DEFAULT_RECEIVE_GROUP);
        assert_eq!(config.receive_port, DEFAULT_RECEIVE_PORT);
        assert_eq!(config.send_target, DEFAULT_SEND_TARGET);
    }

    #[test]
    fn fields_fall_back_independently() {
        let config = SessionConfig::from_parts("bogus", "10.0.0.1", 0, 9999, NotifyMode::DECODE);
        assert_eq!(config.receive_group, DEFAULT_RECEIVE_GROUP);
        assert_eq!(config.receive_port, DEFAULT_RECEIVE_PORT);
        assert_eq!(
            config.send_target,
            SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 9999)
        );
    }

    #[test]
    fn default_mode_is_decode_only() {
        let mode = NotifyMode::default();
        assert!(mode.decode);
        assert!(!mode.pass_through);
    }
}
