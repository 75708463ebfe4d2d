#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod engine;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod input;
pub mod normalize;
pub mod parsers;
pub mod results;

// Re-export commonly used types for convenience
pub use config::{FetcherConfig, FinderConfig};
pub use engine::{BatchStream, PageOutcome, Progress};
pub use error::{FetchError, FetchErrorKind, FinderError, Result};
pub use fetchers::Fetcher;
pub use filter::KeywordTarget;
pub use normalize::normalize_url;
pub use results::{BatchReport, MatchRecord, OpportunityRow, PageResult, Summary, write_csv};

use engine::EngineOptions;
use std::path::Path;
use std::sync::Arc;

/// Builder for an unlinked-keyword search over a batch of pages
pub struct Finder {
    config: FinderConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl Default for Finder {
    fn default() -> Self {
        Self::new()
    }
}

impl Finder {
    /// Create a finder with the default configuration
    pub fn new() -> Self {
        Self {
            config: FinderConfig::default(),
            fetcher: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: FinderConfig) -> Self {
        self.config = config.clamped();
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let config = FinderConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(self, config_str: &str) -> Result<Self> {
        let config = FinderConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    /// Set the number of pages evaluated at once, limited to `1..=20`
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self.config = self.config.clamped();
        self
    }

    /// Set how many leading words of each page are never reported
    pub fn with_exclusion_threshold(mut self, words: usize) -> Self {
        self.config.exclusion_word_threshold = words;
        self
    }

    /// Set the per-request fetch timeout
    pub fn with_fetch_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.fetch_timeout_seconds = timeout_seconds;
        self
    }

    /// Render pages through a WebDriver server instead of plain HTTP
    pub fn with_webdriver(mut self, webdriver_url: &str) -> Self {
        self.config.fetcher = FetcherConfig::WebDriver {
            webdriver_url: webdriver_url.to_string(),
            fallback_urls: config::default_webdriver_fallbacks(),
        };
        self
    }

    /// Use a caller-supplied fetcher instead of building one from the config
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    fn fetcher(&self) -> Result<Arc<dyn Fetcher>> {
        match &self.fetcher {
            Some(fetcher) => Ok(Arc::clone(fetcher)),
            None => fetchers::build_fetcher(&self.config),
        }
    }

    /// Evaluate a single page against every pair.
    ///
    /// The URL is checked like a batch source, so `www.` URLs are accepted.
    pub async fn evaluate(&self, url: &str, pairs: &[KeywordTarget]) -> Result<Option<PageResult>> {
        let url = filter::standardize_source_url(url)?;
        let fetcher = self.fetcher()?;
        let result =
            engine::evaluate(fetcher.as_ref(), &url, pairs, &EngineOptions::from(&self.config))
                .await;
        fetcher.shutdown().await;
        Ok(result)
    }

    /// Start the search and get a stream of page outcomes as they complete
    pub fn spawn<S: AsRef<str>>(
        &self,
        sources: &[S],
        pairs: Vec<KeywordTarget>,
    ) -> Result<BatchStream> {
        engine::spawn_batch(
            self.fetcher()?,
            sources,
            pairs,
            EngineOptions::from(&self.config),
            self.config.concurrency,
        )
    }

    /// Run the search to completion, logging progress
    pub async fn run<S: AsRef<str>>(
        &self,
        sources: &[S],
        pairs: Vec<KeywordTarget>,
    ) -> Result<BatchReport> {
        self.run_with_progress(sources, pairs, |progress| {
            ::log::info!(
                "Processed {}/{}: {}",
                progress.completed,
                progress.total,
                progress.url
            );
        })
        .await
    }

    /// Run the search to completion, calling `on_progress` after every page
    pub async fn run_with_progress<S, F>(
        &self,
        sources: &[S],
        pairs: Vec<KeywordTarget>,
        on_progress: F,
    ) -> Result<BatchReport>
    where
        S: AsRef<str>,
        F: FnMut(&Progress),
    {
        engine::run_batch(
            self.fetcher()?,
            sources,
            pairs,
            EngineOptions::from(&self.config),
            self.config.concurrency,
            on_progress,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::mock::StaticFetcher;

    #[test]
    fn test_builder_clamps_concurrency() {
        assert_eq!(Finder::new().with_concurrency(0).config().concurrency, 1);
        assert_eq!(Finder::new().with_concurrency(100).config().concurrency, 20);
        assert_eq!(Finder::new().config().concurrency, 15);
    }

    #[test]
    fn test_builder_from_config_str() {
        let finder = Finder::new()
            .with_config_str(r#"{"exclusion_word_threshold": 10, "concurrency": 50}"#)
            .unwrap()
            .with_fetch_timeout(3);
        assert_eq!(finder.config().exclusion_word_threshold, 10);
        assert_eq!(finder.config().concurrency, 20);
        assert_eq!(finder.config().fetch_timeout_seconds, 3);
    }

    #[test]
    fn test_builder_with_webdriver() {
        let finder = Finder::new().with_webdriver("http://localhost:9515");
        assert_eq!(
            finder.config().fetcher,
            FetcherConfig::WebDriver {
                webdriver_url: "http://localhost:9515".to_string(),
                fallback_urls: config::default_webdriver_fallbacks(),
            }
        );
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let filler = vec!["lorem"; 60].join(" ");
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(
                    "https://blog.com/post",
                    &format!("<body><p>{} Our new CRM Pro tool helps sales teams.</p></body>", filler),
                )
                .with_failure("https://blog.com/down", 500),
        );
        let pairs = vec![KeywordTarget::new("CRM Pro", "https://x.com/crm").unwrap()];

        let report = Finder::new()
            .with_fetcher(fetcher)
            .run(&["https://blog.com/post", "https://blog.com/down"], pairs)
            .await
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.summary.opportunities, 1);
        assert_eq!(report.summary.pages_failed, 1);
        let rows = report.rows();
        assert_eq!(rows[0].source_url, "https://blog.com/post");
        assert!(rows[0].context.contains("CRM Pro tool"));
    }

    #[tokio::test]
    async fn test_evaluate_single_page() {
        let fetcher = Arc::new(StaticFetcher::new().with_page("https://a.com", "<p>A widget.</p>"));
        let pairs = vec![KeywordTarget::new("widget", "https://a.com/widgets").unwrap()];

        let result = Finder::new()
            .with_exclusion_threshold(0)
            .with_fetcher(fetcher)
            .evaluate("https://a.com", &pairs)
            .await
            .unwrap();
        assert_eq!(result.unwrap().unlinked_matches.len(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_accepts_www_source() {
        let fetcher = Arc::new(
            StaticFetcher::new().with_page("https://www.a.com/p", "<p>A widget.</p>"),
        );
        let pairs = vec![KeywordTarget::new("widget", "https://a.com/widgets").unwrap()];
        let finder = Finder::new()
            .with_exclusion_threshold(0)
            .with_fetcher(fetcher.clone());

        let single = finder.evaluate("www.a.com/p", &pairs).await.unwrap();
        let batch = finder.run(&["www.a.com/p"], pairs).await.unwrap();

        assert_eq!(single.unwrap().url, "https://www.a.com/p");
        assert_eq!(batch.results.len(), 1);
        assert_eq!(fetcher.calls("https://www.a.com/p"), 2);
    }

    #[tokio::test]
    async fn test_evaluate_rejects_invalid_source() {
        let fetcher = Arc::new(StaticFetcher::new());
        let pairs = vec![KeywordTarget::new("widget", "https://a.com/widgets").unwrap()];

        let err = Finder::new()
            .with_fetcher(fetcher.clone())
            .evaluate("ftp://a.com/p", &pairs)
            .await
            .unwrap_err();
        assert!(matches!(err, FinderError::InvalidSourceUrl(_)));
        assert_eq!(fetcher.total_calls(), 0);
    }
}
