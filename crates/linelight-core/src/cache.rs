//! Bounded result cache with FIFO eviction.
//!
//! ## Invariants
//!
//! - `order` holds exactly the keys of `entries`, oldest insert first.
//! - `entries.len() <= capacity` at every point a lock is released.
//! - `get` never reorders; only a fresh insert moves a key to the back.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::request::HighlightResponse;

/// Default number of cached responses.
pub const DEFAULT_CAPACITY: usize = 500;

/// Cache key derived from a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    filename: String,
    language: String,
    code_hash: u64,
}

impl Fingerprint {
    /// Builds the key for `(filename, language, code)`.
    ///
    /// Absent or empty values are replaced by `"unknown"` / `"auto"`.
    pub fn new(filename: Option<&str>, language: Option<&str>, code: &str) -> Self {
        Self {
            filename: non_empty(filename).unwrap_or("unknown").to_string(),
            language: non_empty(language).unwrap_or("auto").to_string(),
            code_hash: code_hash(code),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.language, self.code_hash)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Rolling multiplicative hash over the characters of `code`.
///
/// Deterministic for a given input and covers every character.
pub fn code_hash(code: &str) -> u64 {
    code.chars()
        .fold(0u64, |hash, c| hash.wrapping_mul(31).wrapping_add(u64::from(c)))
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Fingerprint, Arc<HighlightResponse>>,
    order: VecDeque<Fingerprint>,
}

/// Thread-safe, fixed-capacity response cache.
///
/// Eviction is strictly by insertion order: the entry that has been in the
/// cache longest goes first, no matter how recently it was read.
#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl ResultCache {
    /// Creates a cache holding at most `capacity` responses.
    ///
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity,
        }
    }

    /// Returns the cached response for `key`.
    pub fn get(&self, key: &Fingerprint) -> Option<Arc<HighlightResponse>> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Stores `response` under `key`.
    ///
    /// Overwriting an existing key keeps its place in the eviction order.
    /// Inserting a new key into a full cache first evicts the oldest entry.
    pub fn put(&self, key: Fingerprint, response: Arc<HighlightResponse>) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.inner.lock();
        if let Some(existing) = inner.entries.get_mut(&key) {
            *existing = response;
            return;
        }

        while inner.entries.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            tracing::trace!("Evicted cache entry {}", oldest);
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(key, response);
    }

    /// Number of cached responses.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached responses.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn response(text: &str) -> Arc<HighlightResponse> {
        Arc::new(HighlightResponse {
            highlighted: text.to_string(),
            detected_language: "plaintext".to_string(),
        })
    }

    fn key(n: usize) -> Fingerprint {
        Fingerprint::new(None, None, &format!("code {n}"))
    }

    #[test]
    fn test_fingerprint_defaults() {
        let a = Fingerprint::new(None, None, "x");
        let b = Fingerprint::new(Some(""), Some(""), "x");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), format!("unknown:auto:{}", code_hash("x")));
    }

    #[test]
    fn test_fingerprint_distinguishes_fields() {
        let base = Fingerprint::new(Some("a.py"), Some("python"), "x");
        assert_ne!(base, Fingerprint::new(Some("b.py"), Some("python"), "x"));
        assert_ne!(base, Fingerprint::new(Some("a.py"), Some("go"), "x"));
        assert_ne!(base, Fingerprint::new(Some("a.py"), Some("python"), "y"));
    }

    #[test]
    fn test_code_hash_is_deterministic() {
        assert_eq!(code_hash("fn main() {}"), code_hash("fn main() {}"));
        assert_ne!(code_hash("ab"), code_hash("ba"));
        assert_eq!(code_hash(""), 0);
    }

    #[test]
    fn test_get_and_put() {
        let cache = ResultCache::new(2);
        assert!(cache.get(&key(1)).is_none());

        cache.put(key(1), response("one"));
        assert_eq!(cache.get(&key(1)).unwrap().highlighted, "one");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fifo_eviction() {
        let cache = ResultCache::new(3);
        for n in 0..3 {
            cache.put(key(n), response("x"));
        }

        // Reading the oldest entry must not save it.
        assert!(cache.get(&key(0)).is_some());

        cache.put(key(3), response("x"));
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&key(0)).is_none());
        assert!(cache.get(&key(1)).is_some());
        assert!(cache.get(&key(3)).is_some());
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let cache = ResultCache::new(2);
        cache.put(key(0), response("old"));
        cache.put(key(1), response("x"));
        cache.put(key(0), response("new"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key(0)).unwrap().highlighted, "new");

        cache.put(key(2), response("x"));
        assert!(cache.get(&key(0)).is_none());
        assert!(cache.get(&key(1)).is_some());
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = ResultCache::new(0);
        cache.put(key(0), response("x"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_puts_respect_capacity() {
        let cache = Arc::new(ResultCache::new(16));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for n in 0..200 {
                        cache.put(key(t * 1000 + n), response("x"));
                        assert!(cache.len() <= 16);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 16);
    }
}
