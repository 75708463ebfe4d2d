//! Retrieval of raw page HTML.
//!
//! The engine only sees the [`Fetcher`] trait, so a plain HTTP client and a
//! WebDriver-rendered browser are interchangeable.

pub mod http;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod mock;

use crate::config::{FetcherConfig, FinderConfig};
use crate::error::{FetchError, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub use http::HttpFetcher;
pub use webdriver::WebDriverFetcher;

/// Source of page HTML
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the HTML body of `url` in a single attempt
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;

    /// Release any held resources once a batch is finished
    async fn shutdown(&self) {}
}

/// Build the fetcher selected by `config.fetcher`
pub fn build_fetcher(config: &FinderConfig) -> Result<Arc<dyn Fetcher>> {
    match &config.fetcher {
        FetcherConfig::Http => Ok(Arc::new(HttpFetcher::new(config)?)),
        FetcherConfig::WebDriver {
            webdriver_url,
            fallback_urls,
        } => Ok(Arc::new(
            WebDriverFetcher::new(webdriver_url).with_fallbacks(fallback_urls.clone()),
        )),
    }
}
