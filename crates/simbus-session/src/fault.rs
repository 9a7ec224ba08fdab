use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One recorded fault: which component failed and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Component that recorded the fault (e.g. `"receive"`, `"dispatcher"`).
    pub origin: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.origin, self.message)
    }
}

/// Single-slot, thread-safe last-fault holder.
///
/// Every component reports faults here instead of throwing across thread
/// boundaries. A new fault overwrites the previous one; there is no
/// history. The tracker itself never fails — a poisoned lock is absorbed.
#[derive(Debug, Default)]
pub struct FaultTracker {
    slot: Mutex<Option<Fault>>,
}

impl FaultTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fault, overwriting any previous one.
    pub fn record(&self, origin: &'static str, message: impl Into<String>) {
        *self.slot() = Some(Fault {
            origin,
            message: message.into(),
        });
    }

    /// Return and clear the current fault (destructive read).
    pub fn take(&self) -> Option<Fault> {
        self.slot().take()
    }

    /// Inspect the current fault without clearing it.
    pub fn peek(&self) -> Option<Fault> {
        self.slot().clone()
    }

    /// True if a fault is currently stored.
    pub fn has_fault(&self) -> bool {
        self.slot().is_some()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Fault>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
