//! Per-path exclusive locks shared by every handle of a store.
//!
//! Two tiers: a short-lived registry lock guards lookup-or-insert into the
//! path map, and the per-path lock it hands out guards the actual write or
//! delete. The registry lock is never held across I/O, so writers to
//! different paths only contend on the map operation itself.
//!
//! Entries are created on first use and never evicted. Each distinct path
//! keeps the same lock for the life of the registry, at the cost of one
//! small allocation per path ever written or deleted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of per-path locks.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the lock for `path`, creating it on first reference.
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        // The map holds no invariant a panicking holder could break.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }

    /// Run `f` while holding the exclusive lock for `path`.
    ///
    /// The lock is released when `f` returns, whether it succeeded or not.
    pub fn with_lock<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of distinct paths that have been locked so far.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no path has been locked yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
