use crate::error::FetchError;
use crate::fetchers::Fetcher;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory fetcher serving fixed pages and counting calls per URL
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
    failing: HashMap<String, u16>,
    hanging: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// Decrements the in-flight count when a fetch ends or is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl StaticFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub(crate) fn with_failure(mut self, url: &str, status: u16) -> Self {
        self.failing.insert(url.to_string(), status);
        self
    }

    /// Fetches of `url` never complete
    pub(crate) fn with_hang(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    /// Every fetch sleeps for `delay` before answering
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Highest number of fetches that were running at the same time
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if self.hanging.contains(url) {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(status) = self.failing.get(url) {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: *status,
            });
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Connection {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
    }
}
