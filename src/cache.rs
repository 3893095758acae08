//! In-memory response cache for SRU requests.
//!
//! Sits transparently in front of the remote fetch, keyed by the full request
//! URL. The search pipeline has no awareness of hits or misses.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared URL-keyed cache of raw response bodies.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl ResponseCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached body for a request URL.
    pub async fn get(&self, url: &str) -> Option<String> {
        self.inner.lock().await.get(url).cloned()
    }

    /// Store a response body under its request URL.
    pub async fn put(&self, url: String, body: String) {
        self.inner.lock().await.insert(url, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_roundtrip() {
        let cache = ResponseCache::new();
        assert_eq!(cache.get("http://example.org/a").await, None);

        cache
            .put("http://example.org/a".to_string(), "<xml/>".to_string())
            .await;
        assert_eq!(
            cache.get("http://example.org/a").await.as_deref(),
            Some("<xml/>")
        );
        assert_eq!(cache.get("http://example.org/b").await, None);
    }

    #[tokio::test]
    async fn test_cache_shared_between_clones() {
        let cache = ResponseCache::new();
        let clone = cache.clone();
        cache.put("k".to_string(), "v".to_string()).await;
        assert_eq!(clone.get("k").await.as_deref(), Some("v"));
    }
}
