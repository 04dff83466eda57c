//! Per-target locking of the read-modify-write sequences of a ranking manager.
//!
//! A manager takes the lock of `(manager id, entity type, target)` before it
//! looks up a vote and the average rank, and releases it once both are
//! written. This serialises concurrent votes on one target inside a process;
//! it does not protect against other processes writing to the same store.

mod error;
mod in_memory;
mod lock;
mod lock_manager;

pub use error::LockError;
pub use in_memory::{InMemoryLock, InMemoryLockManager};
pub use lock::{Lock, LockGuard};
pub use lock_manager::{target_key, LockManager};
