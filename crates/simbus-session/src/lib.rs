//! Session management for the cockpit export transport.
//!
//! A [`Session`] owns both UDP sockets and the three threads of a running
//! connection: the receive loop, the idle-throttle timer and the command
//! dispatcher. Decoded control updates, raw bulk data, connection liveness
//! and command acknowledgements fan out through [`SessionEvents`].
//!
//! One session per simulator connection; construct it explicitly and share
//! it by reference — there is no process-wide instance.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod fault;
pub mod session;

pub use config::{
    NotifyMode, SessionConfig, DEFAULT_RECEIVE_GROUP, DEFAULT_RECEIVE_PORT, DEFAULT_SEND_TARGET,
};
pub use dispatcher::OutboundCommand;
pub use error::{Result, SessionError};
pub use events::{NullEvents, SessionEvents};
pub use fault::{Fault, FaultTracker};
pub use session::Session;
