// src/cache.rs
//! Small TTL cache for aggregation results. Purely a performance layer to
//! spare redundant upstream calls; correctness never depends on a hit.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct TtlCache<V> {
    ttl: Duration,
    slots: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    /// A zero TTL disables the cache entirely.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        if self.ttl.is_zero() {
            return None;
        }
        let guard = self.slots.lock().expect("cache lock poisoned");
        guard
            .get(key)
            .filter(|(stored, _)| stored.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub fn put(&self, key: String, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        let mut guard = self.slots.lock().expect("cache lock poisoned");
        guard.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        guard.insert(key, (Instant::now(), value));
    }
}
