use std::sync::Arc;

use super::{Lock, LockError};
use crate::reference::EntityReference;

/// Factory for per-key locks.
///
/// Repeated calls with the same key must return the same logical lock
/// (the same `Arc` in memory, the same key in a distributed lock service).
pub trait LockManager: Send + Sync {
    /// The concrete lock type returned by this manager.
    type Lock: Lock;

    /// Get (or create) the lock for `key`.
    fn get_lock(&self, key: &str) -> Result<Arc<Self::Lock>, LockError>;
}

/// Lock key of the votes and the average rank of a target under a manager.
pub fn target_key(manager_id: &str, target: &EntityReference) -> String {
    format!(
        "{}:{}:{}",
        manager_id,
        target.entity_type(),
        target.serialized()
    )
}
