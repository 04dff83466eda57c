use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, Weak};

use super::{Lock, LockError, LockManager};

/// Blocking in-process lock backed by `Mutex<bool>` + `Condvar`.
///
/// Unlike a `MutexGuard`, holding it does not borrow anything, so it can be
/// kept across store round-trips by a [`LockGuard`](super::LockGuard).
pub struct InMemoryLock {
    state: Mutex<bool>,
    wake: Condvar,
}

impl InMemoryLock {
    pub fn new() -> Self {
        InMemoryLock {
            state: Mutex::new(false),
            wake: Condvar::new(),
        }
    }
}

impl Default for InMemoryLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Lock for InMemoryLock {
    fn lock(&self) -> Result<(), LockError> {
        let mut locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        while *locked {
            locked = self
                .wake
                .wait(locked)
                .map_err(|e| LockError::Poisoned(e.to_string()))?;
        }
        *locked = true;
        Ok(())
    }

    fn try_lock(&self) -> Result<bool, LockError> {
        let mut locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        if *locked {
            Ok(false)
        } else {
            *locked = true;
            Ok(true)
        }
    }

    fn unlock(&self) -> Result<(), LockError> {
        let mut locked = self
            .state
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        if *locked {
            *locked = false;
            self.wake.notify_one();
        }
        Ok(())
    }
}

/// Lazily creates one [`InMemoryLock`] per target key.
///
/// The map only keeps weak references: a lock lives as long as some caller
/// holds its `Arc` (a [`LockGuard`](super::LockGuard) does for its whole
/// scope), and dead entries are pruned whenever a new lock is created. Every
/// caller of the same key gets the same lock while any of them holds it.
pub struct InMemoryLockManager {
    locks: Mutex<HashMap<String, Weak<InMemoryLock>>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        InMemoryLockManager {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Number of keys whose lock is currently referenced.
    pub fn len(&self) -> Result<usize, LockError> {
        let locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("ranking lock map poisoned".into()))?;
        Ok(locks.values().filter(|lock| lock.strong_count() > 0).count())
    }

    pub fn is_empty(&self) -> Result<bool, LockError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryLockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LockManager for InMemoryLockManager {
    type Lock = InMemoryLock;

    fn get_lock(&self, key: &str) -> Result<Arc<InMemoryLock>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("ranking lock map poisoned".into()))?;
        if let Some(lock) = locks.get(key).and_then(Weak::upgrade) {
            return Ok(lock);
        }

        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(InMemoryLock::new());
        locks.insert(key.to_string(), Arc::downgrade(&lock));
        Ok(lock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::{target_key, LockGuard};
    use crate::reference::{EntityReference, EntityType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn try_lock_fails_while_held() {
        let lock = InMemoryLock::new();
        assert!(lock.try_lock().unwrap());
        assert!(!lock.try_lock().unwrap());
        lock.unlock().unwrap();
        assert!(lock.try_lock().unwrap());
        lock.unlock().unwrap();
    }

    #[test]
    fn guard_releases_on_drop() {
        let lock = Arc::new(InMemoryLock::new());
        {
            let guard = LockGuard::acquire(lock.clone(), "stars:DOCUMENT:Main.WebHome").unwrap();
            assert_eq!(guard.key(), "stars:DOCUMENT:Main.WebHome");
            assert!(!lock.try_lock().unwrap());
        }
        assert!(lock.try_lock().unwrap());
        lock.unlock().unwrap();
    }

    #[test]
    fn same_target_shares_a_lock() {
        let manager = InMemoryLockManager::new();
        let target = EntityReference::document("xwiki:Main.WebHome");
        let key = target_key("stars", &target);

        let first = manager.get_lock(&key).unwrap();
        let second = manager.get_lock(&key).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.len().unwrap(), 1);
    }

    #[test]
    fn released_locks_are_evicted() {
        let manager = InMemoryLockManager::new();
        let home = target_key("stars", &EntityReference::document("xwiki:Main.WebHome"));
        {
            let lock = manager.get_lock(&home).unwrap();
            let _guard = LockGuard::acquire(lock, home.clone()).unwrap();
            assert_eq!(manager.len().unwrap(), 1);
        }
        assert!(manager.is_empty().unwrap());

        for i in 0..100 {
            let key = format!("stars:DOCUMENT:Page{}", i);
            let lock = manager.get_lock(&key).unwrap();
            drop(LockGuard::acquire(lock, key).unwrap());
        }
        assert!(manager.is_empty().unwrap());
        assert!(manager.locks.lock().unwrap().len() <= 1);
    }

    #[test]
    fn keys_distinguish_manager_and_entity_type() {
        let doc = EntityReference::document("xwiki:Main.WebHome");
        let page = EntityReference::new(EntityType::Page, "xwiki:Main.WebHome");

        assert_ne!(target_key("stars", &doc), target_key("likes", &doc));
        assert_ne!(target_key("stars", &doc), target_key("stars", &page));
    }

    #[test]
    fn guarded_sections_do_not_interleave() {
        let manager = Arc::new(InMemoryLockManager::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                let inside = inside.clone();
                let overlaps = overlaps.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let lock = manager.get_lock("stars:DOCUMENT:x").unwrap();
                        let _guard = LockGuard::acquire(lock, "stars:DOCUMENT:x").unwrap();
                        if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }
}
