//! Explicit wrappers around report computations.
//!
//! Cross-cutting behavior is composed at the call site:
//! `with_logging("forecast", with_cache(&cache, key, compute()))`.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// Log start, duration and outcome of a report computation.
pub async fn with_logging<T, E, F>(report: &'static str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let started = Instant::now();
    debug!(report, "report started");

    let result = fut.await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => info!(report, elapsed_ms, "report completed"),
        Err(e) => warn!(report, elapsed_ms, error = %e, "report failed"),
    }
    result
}

/// Caller-owned TTL cache for report results.
///
/// Nothing is cached implicitly: a cache only exists where a caller creates
/// one and passes it to [`with_cache`].
#[derive(Debug)]
pub struct ReportCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, T)>>,
}

impl<T: Clone> ReportCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh cached value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: T) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), (Instant::now(), value));
        }
    }

    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Drop entries older than the TTL.
    pub fn purge_expired(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            let ttl = self.ttl;
            entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serve `key` from `cache` while fresh; otherwise await `fut` and cache a
/// successful result. Errors are never cached.
pub async fn with_cache<T, E, F>(cache: &ReportCache<T>, key: impl Into<String>, fut: F) -> Result<T, E>
where
    T: Clone,
    F: Future<Output = Result<T, E>>,
{
    let key = key.into();
    if let Some(hit) = cache.get(&key) {
        debug!(key = %key, "report cache hit");
        return Ok(hit);
    }

    let value = fut.await?;
    cache.purge_expired();
    cache.insert(key, value.clone());
    Ok(value)
}
