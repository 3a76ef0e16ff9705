use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Short-lived memo of listing responses for one filesystem
pub struct ListingCache {
    /// LRU cache mapping repository paths to (fetched at, listing text)
    cache: Arc<RwLock<LruCache<String, (Instant, Arc<str>)>>>,
    ttl: Duration,
}

impl ListingCache {
    /// Create a cache holding at most `capacity` listings for `ttl` each
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        ListingCache {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl,
        }
    }

    /// Get a listing if it is still fresh; stale entries are evicted
    pub fn get(&self, repo_path: &str) -> Option<Arc<str>> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let (fetched_at, text) = cache.get(repo_path)?;
        if fetched_at.elapsed() < self.ttl {
            return Some(Arc::clone(text));
        }
        cache.pop(repo_path);
        None
    }

    /// Put a listing into the cache
    pub fn put(&self, repo_path: String, text: Arc<str>) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.put(repo_path, (Instant::now(), text));
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of memoized listings, fresh or not
    pub fn len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for ListingCache {
    fn clone(&self) -> Self {
        ListingCache {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_clear() {
        let cache = ListingCache::new(4, Duration::from_secs(60));
        assert!(cache.is_empty());

        cache.put("/src".to_string(), Arc::from("[]"));
        assert_eq!(cache.get("/src").as_deref(), Some("[]"));
        assert_eq!(cache.get("/docs"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let cache = ListingCache::new(4, Duration::ZERO);
        cache.put("/src".to_string(), Arc::from("[]"));
        assert_eq!(cache.get("/src"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = ListingCache::new(2, Duration::from_secs(60));
        cache.put("/a".to_string(), Arc::from("a"));
        cache.put("/b".to_string(), Arc::from("b"));
        cache.put("/c".to_string(), Arc::from("c"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("/a"), None);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = ListingCache::new(2, Duration::from_secs(60));
        let other = cache.clone();
        cache.put("/a".to_string(), Arc::from("a"));
        assert_eq!(other.get("/a").as_deref(), Some("a"));
    }
}
