//! TTL-only cache, generalized from the `DashMap`-backed maps
//! `synapsed_promise::trust::TrustModel` keeps for reputations and
//! transitive-trust scores.
//!
//! Per spec.md §4.2/§4.3/§9: caches are invalidated by TTL only, never by
//! write notification — a deliberate trade the source makes to avoid a
//! cross-component invalidation hazard.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub struct TtlCache<K, V> {
    entries: DashMap<K, (Instant, V)>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Returns a live value for `key`, evicting it first if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            let (inserted_at, value) = entry.value().clone();
            if inserted_at.elapsed() < self.ttl {
                return Some(value);
            }
        }
        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, (Instant::now(), value));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn expires_after_ttl() {
        let cache: TtlCache<String, i32> = TtlCache::new(0);
        cache.insert("a".to_string(), 1);
        sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[test]
    fn returns_live_value() {
        let cache: TtlCache<String, i32> = TtlCache::new(3600);
        cache.insert("a".to_string(), 42);
        assert_eq!(cache.get(&"a".to_string()), Some(42));
    }
}
