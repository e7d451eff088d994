//! Single-flight payload cache.
//!
//! At most one upstream fetch is in flight at a time. The lock is held across
//! the fetch; callers that arrive meanwhile wait, then read the payload the
//! first caller stored. Raw text is cached, not snapshots, so one fetch serves
//! both output modes. Statistics live in atomics and never wait on the lock.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::trace;
use upsbridge_devices::FetchError;

#[derive(Debug, Clone)]
struct CacheEntry {
    body: Arc<str>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// No payload stored.
const EMPTY: u64 = u64::MAX;

/// TTL cache in front of the upstream fetch.
#[derive(Debug)]
pub struct PayloadCache {
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
    fetches: AtomicU64,
    hits: AtomicU64,
    /// Reference point for `stored_at_ms`.
    created: Instant,
    /// When the current entry was stored, in ms since `created`, or `EMPTY`.
    stored_at_ms: AtomicU64,
}

impl PayloadCache {
    /// Create a cache. A zero TTL disables caching but keeps single-flight.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
            fetches: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            created: Instant::now(),
            stored_at_ms: AtomicU64::new(EMPTY),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached payload, or run `fetch` and cache its result.
    ///
    /// Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Arc<str>, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, FetchError>>,
    {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(self.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(age_ms = cached.fetched_at.elapsed().as_millis() as u64, "Payload cache hit");
                return Ok(Arc::clone(&cached.body));
            }
        }

        self.fetches.fetch_add(1, Ordering::Relaxed);
        let body: Arc<str> = Arc::from(fetch().await?);

        *entry = if self.ttl.is_zero() {
            self.stored_at_ms.store(EMPTY, Ordering::Relaxed);
            None
        } else {
            let fetched_at = Instant::now();
            self.stored_at_ms
                .store(self.millis_since_created(fetched_at), Ordering::Relaxed);
            Some(CacheEntry {
                body: Arc::clone(&body),
                fetched_at,
            })
        };
        Ok(body)
    }

    /// Drop the cached payload.
    pub async fn invalidate(&self) {
        let mut entry = self.entry.lock().await;
        *entry = None;
        self.stored_at_ms.store(EMPTY, Ordering::Relaxed);
    }

    fn millis_since_created(&self, at: Instant) -> u64 {
        at.duration_since(self.created).as_millis() as u64
    }

    /// Get cache statistics. Does not wait for an in-flight fetch.
    pub fn stats(&self) -> CacheStats {
        let stored_at = self.stored_at_ms.load(Ordering::Relaxed);
        let cached = stored_at != EMPTY
            && self.millis_since_created(Instant::now()).saturating_sub(stored_at)
                < self.ttl.as_millis() as u64;

        CacheStats {
            fetches: self.fetches.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            ttl_ms: self.ttl.as_millis() as u64,
            cached,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Upstream fetches started.
    pub fetches: u64,
    /// Requests served from the cache.
    pub hits: u64,
    pub ttl_ms: u64,
    /// Whether a fresh payload is currently held.
    pub cached: bool,
}
