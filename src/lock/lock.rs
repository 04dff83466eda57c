use std::sync::Arc;

use tracing::warn;

use super::LockError;

/// A single lock instance.
///
/// In-memory locks use `Mutex` + `Condvar`; other implementations could rely
/// on an external lock service.
pub trait Lock: Send + Sync {
    /// Acquire the lock, blocking until it becomes available.
    fn lock(&self) -> Result<(), LockError>;

    /// Try to acquire the lock without blocking.
    /// Returns `Ok(true)` if acquired, `Ok(false)` if already held.
    fn try_lock(&self) -> Result<bool, LockError>;

    /// Release the lock.
    fn unlock(&self) -> Result<(), LockError>;
}

/// Holds a lock until dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<L: Lock> {
    lock: Arc<L>,
    key: String,
}

impl<L: Lock> LockGuard<L> {
    /// Block until `lock` is acquired.
    pub fn acquire(lock: Arc<L>, key: impl Into<String>) -> Result<Self, LockError> {
        lock.lock()?;
        Ok(Self {
            lock,
            key: key.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<L: Lock> Drop for LockGuard<L> {
    fn drop(&mut self) {
        if let Err(err) = self.lock.unlock() {
            warn!(key = %self.key, error = %err, "failed to release ranking lock");
        }
    }
}
