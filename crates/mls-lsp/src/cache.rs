// Dweve MLS - MATLAB Code Intelligence
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generic keyed result cache with LRU eviction and TTL expiry.
//!
//! Keys are content hashes of the exact text an expensive computation ran
//! on, never file identities — so the cache stays correct under renames,
//! duplicated content, and external edits. The server keeps one instance
//! per result kind (parse outlines, analyzer findings); the instance is the
//! "parse vs diagnostics" discriminator and its name tags the trace logs.
//!
//! Entries are immutable once stored: a changed input hashes to a new key,
//! it never mutates an existing entry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

/// Cache performance counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub current_size: usize,
    pub capacity: usize,
}

struct Slot<V> {
    value: V,
    inserted: Instant,
    /// Logical access clock for LRU ordering.
    stamp: u64,
}

struct Inner<V> {
    slots: HashMap<u64, Slot<V>>,
    clock: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Capacity- and time-bounded store keyed by content hash.
pub struct ResultCache<V> {
    name: &'static str,
    capacity: usize,
    ttl: Duration,
    inner: Mutex<Inner<V>>,
}

impl<V: Clone> ResultCache<V> {
    /// `name` labels this instance in logs (e.g. `"parse"`, `"mlint"`).
    /// Capacity 0 is clamped to 1.
    pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            ttl,
            inner: Mutex::new(Inner {
                slots: HashMap::new(),
                clock: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    /// Look up a value. An entry past its TTL is evicted and counts as a
    /// miss.
    pub fn get(&self, key: u64) -> Option<V> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.clock += 1;
        let clock = inner.clock;

        let expired = match inner.slots.get_mut(&key) {
            Some(slot) if slot.inserted.elapsed() < self.ttl => {
                slot.stamp = clock;
                inner.hits += 1;
                trace!("{} cache hit for {:#x}", self.name, key);
                return Some(slot.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.slots.remove(&key);
            inner.evictions += 1;
            trace!("{} cache entry {:#x} expired", self.name, key);
        } else {
            trace!("{} cache miss for {:#x}", self.name, key);
        }
        inner.misses += 1;
        None
    }

    /// Store a value, evicting the least-recently-used entry when at
    /// capacity.
    pub fn put(&self, key: u64, value: V) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.clock += 1;
        let clock = inner.clock;

        if !inner.slots.contains_key(&key) && inner.slots.len() >= self.capacity {
            let lru_key = inner
                .slots
                .iter()
                .min_by_key(|(_, slot)| slot.stamp)
                .map(|(k, _)| *k);
            if let Some(lru_key) = lru_key {
                inner.slots.remove(&lru_key);
                inner.evictions += 1;
                debug!(
                    "{} cache evicted {:#x} at capacity {}",
                    self.name, lru_key, self.capacity
                );
            }
        }

        inner.slots.insert(
            key,
            Slot {
                value,
                inserted: Instant::now(),
                stamp: clock,
            },
        );
    }

    pub fn invalidate(&self, key: u64) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.slots.remove(&key).is_some();
        if removed {
            inner.evictions += 1;
        }
        removed
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let count = inner.slots.len();
        inner.slots.clear();
        debug!("{} cache cleared ({} entries)", self.name, count);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn statistics(&self) -> CacheStatistics {
        let inner = self.inner.lock();
        CacheStatistics {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            current_size: inner.slots.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> ResultCache<String> {
        ResultCache::new("test", capacity, Duration::from_secs(60))
    }

    #[test]
    fn get_after_put_returns_value() {
        let c = cache(10);
        c.put(1, "one".into());
        assert_eq!(c.get(1), Some("one".into()));
        let stats = c.statistics();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn miss_on_absent_key() {
        let c = cache(10);
        assert_eq!(c.get(42), None);
        assert_eq!(c.statistics().misses, 1);
    }

    #[test]
    fn capacity_bound_holds_and_lru_is_evicted() {
        let c = cache(3);
        c.put(1, "a".into());
        c.put(2, "b".into());
        c.put(3, "c".into());

        // Touch 1 and 3 so 2 becomes least recently used.
        c.get(1);
        c.get(3);

        c.put(4, "d".into());
        assert_eq!(c.len(), 3);
        assert_eq!(c.get(2), None);
        assert_eq!(c.get(1), Some("a".into()));
        assert_eq!(c.get(4), Some("d".into()));
        assert_eq!(c.statistics().evictions, 1);
    }

    #[test]
    fn overwriting_existing_key_does_not_evict() {
        let c = cache(2);
        c.put(1, "a".into());
        c.put(2, "b".into());
        c.put(1, "a2".into());
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(1), Some("a2".into()));
        assert_eq!(c.get(2), Some("b".into()));
        assert_eq!(c.statistics().evictions, 0);
    }

    #[test]
    fn zero_ttl_expires_everything() {
        let c = ResultCache::new("test", 10, Duration::ZERO);
        c.put(1, "gone".to_string());
        assert_eq!(c.get(1), None);
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn invalidate_and_clear() {
        let c = cache(10);
        c.put(1, "a".into());
        c.put(2, "b".into());
        assert!(c.invalidate(1));
        assert!(!c.invalidate(1));
        assert_eq!(c.get(1), None);

        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.get(2), None);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let c = ResultCache::new("test", 0, Duration::from_secs(60));
        c.put(1, "a".to_string());
        assert_eq!(c.get(1), Some("a".to_string()));
        c.put(2, "b".to_string());
        assert_eq!(c.len(), 1);
    }
}
