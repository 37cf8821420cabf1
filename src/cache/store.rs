//! Response cache storage.
//!
//! # Responsibilities
//! - Store captured responses by key
//! - Expire entries after a fixed lifetime
//! - Bound the number of stored entries
//!
//! # Design Decisions
//! - `CacheStore` is a trait so the backing store can be replaced
//! - The in-memory store uses DashMap's internal sharded locking
//! - Eviction drops expired entries first, then the oldest one

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Response, StatusCode};
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// A response as it was stored.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CachedResponse {
    /// Rebuild the stored response.
    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Storage backend for the cache policy.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedResponse>;
    fn put(&self, key: String, response: CachedResponse);
    fn len(&self) -> usize;
    fn clear(&self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct Entry {
    response: CachedResponse,
    stored_at: Instant,
}

/// Bounded in-memory store with a fixed entry lifetime.
#[derive(Debug)]
pub struct MemoryCacheStore {
    inner: DashMap<String, Entry>,
    ttl: Duration,
    max_entries: usize,
}

impl MemoryCacheStore {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        entry.stored_at.elapsed() >= self.ttl
    }

    fn make_room(&self) {
        self.inner.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        while self.inner.len() >= self.max_entries {
            let oldest = self
                .inner
                .iter()
                .min_by_key(|entry| entry.stored_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.inner.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<CachedResponse> {
        let (expired, response) = {
            let entry = self.inner.get(key)?;
            (self.is_expired(&entry), entry.response.clone())
        };
        if expired {
            self.inner.remove(key);
            return None;
        }
        Some(response)
    }

    fn put(&self, key: String, response: CachedResponse) {
        if !self.inner.contains_key(&key) && self.inner.len() >= self.max_entries {
            self.make_room();
        }
        self.inner.insert(
            key,
            Entry {
                response,
                stored_at: Instant::now(),
            },
        );
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn clear(&self) {
        self.inner.clear();
    }
}
