use simbus_codec::ControlUpdate;

/// Fan-out of session events to an external collaborator.
///
/// All methods default to no-ops, so implementors subscribe only to what
/// they need. Delivery is synchronous from the session's own threads:
/// `connection_active`, `control_update` and `bulk_data` fire on the
/// receive thread, `command_sent` on the dispatcher thread. Long blocking
/// work in a handler stalls that thread.
pub trait SessionEvents: Send + Sync {
    /// A datagram was received; the connection is alive.
    fn connection_active(&self) {}

    /// Raw datagram bytes, emitted only when pass-through is enabled.
    fn bulk_data(&self, _bytes: &[u8]) {}

    /// One decoded control update, emitted only when decode is enabled.
    fn control_update(&self, _update: &ControlUpdate) {}

    /// A queued command left the socket.
    fn command_sent(&self, _sender: Option<&str>, _text: &str) {}
}

/// Subscriber that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEvents;

impl SessionEvents for NullEvents {}
