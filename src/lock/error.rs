use std::fmt;

/// Error type for lock operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The underlying primitive was poisoned by a panicking holder.
    Poisoned(String),
    /// Failed to acquire the lock of a target.
    AcquireFailed(String),
    /// Failed to release the lock of a target.
    ReleaseFailed(String),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Poisoned(msg) => write!(f, "lock poisoned: {}", msg),
            LockError::AcquireFailed(key) => write!(f, "could not lock [{}]", key),
            LockError::ReleaseFailed(key) => write!(f, "could not unlock [{}]", key),
        }
    }
}

impl std::error::Error for LockError {}
