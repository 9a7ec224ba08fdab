use simbus_transport::TransportError;

/// Errors surfaced by session startup.
///
/// Everything past startup is reported out-of-band through the
/// [`FaultTracker`](crate::FaultTracker) — nothing is thrown across
/// thread boundaries.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Socket construction failed during startup.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
