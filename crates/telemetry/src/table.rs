use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

/// Namespace the pose keys are published under
pub const DEFAULT_NAMESPACE: &str = "Pose";

/// Key names inside the pose namespace
pub mod keys {
    pub const X: &str = "X";
    pub const Y: &str = "Y";
    pub const THETA: &str = "Theta";
    pub const VX: &str = "VX";
    pub const VY: &str = "VY";
    pub const OMEGA: &str = "Omega";
}

/// Full table key for `name` inside `namespace`
pub fn qualified_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

/// One published value and when it was written
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub value: f64,
    pub updated: Instant,
}

#[derive(Debug)]
struct Inner {
    entries: RwLock<HashMap<String, Entry>>,
    connected: AtomicBool,
}

/// Shared table of named numbers.
///
/// Clones share storage. Producers write whole publications under one lock
/// so readers never observe half of an update.
#[derive(Debug, Clone)]
pub struct TelemetryTable {
    inner: Arc<Inner>,
}

impl TelemetryTable {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
                connected: AtomicBool::new(true),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.inner.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.inner.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn put_number(&self, key: &str, value: f64) {
        self.put_number_at(key, value, Instant::now());
    }

    pub fn put_number_at(&self, key: &str, value: f64, updated: Instant) {
        self.write().insert(key.to_string(), Entry { value, updated });
    }

    /// Write several values as one publication
    pub fn put_many<K: AsRef<str>>(&self, values: &[(K, f64)], updated: Instant) {
        let mut entries = self.write();
        for (key, value) in values {
            entries.insert(key.as_ref().to_string(), Entry { value: *value, updated });
        }
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.entry(key).map(|e| e.value)
    }

    pub fn entry(&self, key: &str) -> Option<Entry> {
        self.read().get(key).copied()
    }

    /// Consistent snapshot of several keys taken under one lock
    pub fn entries<K: AsRef<str>>(&self, keys: &[K]) -> Vec<Option<Entry>> {
        let entries = self.read();
        keys.iter().map(|k| entries.get(k.as_ref()).copied()).collect()
    }

    pub fn remove(&self, key: &str) -> Option<Entry> {
        self.write().remove(key)
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Whether the producer feeding this table is currently live
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    pub fn set_connected(&self, connected: bool) {
        self.inner.connected.store(connected, Ordering::Release);
    }
}

impl Default for TelemetryTable {
    fn default() -> Self {
        Self::new()
    }
}
