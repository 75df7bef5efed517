//! Concurrent key/value storage behind the correlation managers.

use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

type DuplicateHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Thread-safe map with last-write-wins semantics and duplicate-write diagnostics
pub struct ObjectStore<T> {
    entries: DashMap<String, T>,
    duplicate_writes: AtomicU64,
    on_duplicate: RwLock<Option<DuplicateHook>>,
}

impl<T: Clone> ObjectStore<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            duplicate_writes: AtomicU64::new(0),
            on_duplicate: RwLock::new(None),
        }
    }

    /// Insert, returning the overwritten value if there was one
    pub fn add(&self, key: &str, value: T) -> Option<T> {
        let previous = self.entries.insert(key.to_string(), value);
        if previous.is_some() {
            self.duplicate_writes.fetch_add(1, Ordering::Relaxed);
            warn!(correlation_key = %key, "⚠️ Overwriting existing correlation entry");
            let hook = self.on_duplicate.read().clone();
            if let Some(hook) = hook {
                hook(key);
            }
        } else {
            debug!(correlation_key = %key, "Stored correlation entry");
        }
        previous
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of writes that replaced an existing entry
    pub fn duplicate_writes(&self) -> u64 {
        self.duplicate_writes.load(Ordering::Relaxed)
    }

    /// Register a callback invoked with the key on every overwrite
    pub fn on_duplicate<F>(&self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *self.on_duplicate.write() = Some(Arc::new(hook));
    }
}

impl<T: Clone> Default for ObjectStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObjectStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("entries", &self.entries.len())
            .field("duplicate_writes", &self.duplicate_writes.load(Ordering::Relaxed))
            .finish()
    }
}
