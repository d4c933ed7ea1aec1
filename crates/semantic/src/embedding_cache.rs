//! Content-addressed (SHA-256) cache of text -> vector with TTL.
//!
//! A cache hit must return exactly the vector that `set` stored (no lossy
//! compression); a cache miss, including one caused by an internal error, is
//! always treated the same as a genuine miss by callers — the cache can
//! never cause a correctness regression, only a recomputation.

use std::time::{Duration, Instant};

use canonical::hash_text;
use dashmap::DashMap;

struct Entry {
    vector: Vec<f32>,
    expires_at: Instant,
}

/// In-process TTL'd embedding cache keyed by `sha256(utf8(text))`.
pub struct EmbeddingCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl EmbeddingCache {
    pub fn new(ttl: Duration) -> Self {
        EmbeddingCache {
            entries: DashMap::new(),
            ttl,
        }
    }

    fn key_for(text: &str) -> String {
        hash_text(text)
    }

    /// Returns `Some(vector)` on a live hit, `None` on a miss or expiry.
    /// Lazily evicts the entry on read if it has expired.
    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        let key = Self::key_for(text);
        let now = Instant::now();
        let hit = self.entries.get(&key).and_then(|entry| {
            if entry.expires_at > now {
                Some(entry.vector.clone())
            } else {
                None
            }
        });
        if hit.is_none() {
            self.entries.remove(&key);
        }
        hit
    }

    pub fn set(&self, text: &str, vector: Vec<f32>) {
        let key = Self::key_for(text);
        self.entries.insert(
            key,
            Entry {
                vector,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn delete(&self, text: &str) {
        self.entries.remove(&Self::key_for(text));
    }

    /// Drop every entry. `pattern`, when given, is matched as a literal
    /// substring against the original cache key's *source text* is not
    /// retained (only its hash is), so clearing by pattern operates over
    /// raw keys (hex digests) rather than original text.
    pub fn clear(&self, pattern: Option<&str>) {
        match pattern {
            None => self.entries.clear(),
            Some(p) => self.entries.retain(|k, _| !k.contains(p)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        EmbeddingCache::new(Duration::from_secs(3600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_returns_exact_vector() {
        let cache = EmbeddingCache::new(Duration::from_secs(60));
        let v = vec![0.1, 0.2, 0.3];
        cache.set("hello", v.clone());
        assert_eq!(cache.get("hello"), Some(v));
    }

    #[test]
    fn miss_on_unknown_text() {
        let cache = EmbeddingCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("never set"), None);
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = EmbeddingCache::new(Duration::from_millis(1));
        cache.set("soon gone", vec![1.0]);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("soon gone"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn delete_removes_entry() {
        let cache = EmbeddingCache::new(Duration::from_secs(60));
        cache.set("x", vec![1.0]);
        cache.delete("x");
        assert_eq!(cache.get("x"), None);
    }

    #[test]
    fn clear_without_pattern_drops_everything() {
        let cache = EmbeddingCache::new(Duration::from_secs(60));
        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);
        cache.clear(None);
        assert!(cache.is_empty());
    }

    #[test]
    fn identical_text_never_yields_different_vectors() {
        let cache = EmbeddingCache::new(Duration::from_secs(60));
        cache.set("stable", vec![9.0, 9.0]);
        for _ in 0..5 {
            assert_eq!(cache.get("stable"), Some(vec![9.0, 9.0]));
        }
    }
}
