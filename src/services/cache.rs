//! Read-through TTL cache at the record-source boundary.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use missed_stops_ops::records::MissRecord;

use super::record_source::{FetchError, RecordSource, Window};

/// Wraps a [`RecordSource`], serving repeated window fetches from memory
/// until the entry ages out. Errors are never cached.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<Window, (Instant, Vec<MissRecord>)>>,
}

impl<S> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: RecordSource> RecordSource for CachedSource<S> {
    async fn fetch_records(&self, window: Window) -> Result<Vec<MissRecord>, FetchError> {
        if let Some((stored_at, records)) = self.entries.lock().unwrap().get(&window) {
            if stored_at.elapsed() < self.ttl {
                debug!(?window, "Serving records from cache");
                return Ok(records.clone());
            }
        }

        let records = self.inner.fetch_records(window).await?;
        self.entries
            .lock()
            .unwrap()
            .insert(window, (Instant::now(), records.clone()));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordSource for CountingSource {
        async fn fetch_records(&self, _window: Window) -> Result<Vec<MissRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![MissRecord {
                address: "1 Main".to_string(),
                ..Default::default()
            }])
        }
    }

    #[tokio::test]
    async fn test_second_fetch_within_ttl_hits_cache() {
        let source = CachedSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            Duration::from_secs(300),
        );

        let first = source.fetch_records(Window::Today).await.unwrap();
        let second = source.fetch_records(Window::Today).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_windows_cache_independently() {
        let source = CachedSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            Duration::from_secs(300),
        );

        source.fetch_records(Window::Today).await.unwrap();
        source.fetch_records(Window::Yesterday).await.unwrap();

        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_refetches() {
        let source = CachedSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            Duration::ZERO,
        );

        source.fetch_records(Window::Today).await.unwrap();
        source.fetch_records(Window::Today).await.unwrap();

        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 2);
    }
}
