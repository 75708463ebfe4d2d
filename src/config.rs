use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Upper bound for the worker pool
pub const MAX_CONCURRENCY: usize = 20;

/// Configuration for an opportunity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Number of pages evaluated concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Words at the top of each page that are never reported
    #[serde(default = "default_exclusion_word_threshold")]
    pub exclusion_word_threshold: usize,

    /// Generic words that disqualify a match when they directly follow the keyword
    #[serde(default = "default_forbidden_suffixes")]
    pub forbidden_suffixes: Vec<String>,

    /// CSS classes of site boilerplate blocks removed before scanning.
    /// An entry containing spaces must equal the full class attribute.
    #[serde(default = "default_boilerplate_css_classes")]
    pub boilerplate_css_classes: Vec<String>,

    /// Per-page fetch timeout
    #[serde(default = "default_fetch_timeout_seconds")]
    pub fetch_timeout_seconds: u64,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Skip TLS certificate verification
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// How page HTML is retrieved
    #[serde(default)]
    pub fetcher: FetcherConfig,
}

/// Strategy used to retrieve page HTML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FetcherConfig {
    /// Plain HTTP GET
    #[default]
    Http,

    /// Render through a WebDriver server
    WebDriver {
        #[serde(default = "default_webdriver_url")]
        webdriver_url: String,

        /// Endpoints tried when `webdriver_url` is unreachable
        #[serde(default = "default_webdriver_fallbacks")]
        fallback_urls: Vec<String>,
    },
}

impl FinderConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.clamped())
    }

    /// Concurrency limited to `1..=MAX_CONCURRENCY`
    pub fn clamped(mut self) -> Self {
        self.concurrency = self.concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            exclusion_word_threshold: default_exclusion_word_threshold(),
            forbidden_suffixes: default_forbidden_suffixes(),
            boilerplate_css_classes: default_boilerplate_css_classes(),
            fetch_timeout_seconds: default_fetch_timeout_seconds(),
            user_agent: default_user_agent(),
            accept_invalid_certs: default_accept_invalid_certs(),
            fetcher: FetcherConfig::default(),
        }
    }
}

fn default_concurrency() -> usize {
    15
}

fn default_exclusion_word_threshold() -> usize {
    50
}

fn default_forbidden_suffixes() -> Vec<String> {
    [
        "solution",
        "solutions",
        "service",
        "services",
        "software",
        "softwares",
        "app",
        "apps",
        "platform",
        "platforms",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_boilerplate_css_classes() -> Vec<String> {
    [
        "position-relative mt-5 related-blog-post__swiper-container",
        "row left-zero__without-shape position-relative z-1 mt-4 mt-md-5 px-0",
        "css-xzv94c e108hv3e5",
        "nav-red",
        "nav-label",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_fetch_timeout_seconds() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_accept_invalid_certs() -> bool {
    true
}

/// Default value for webdriver_url
pub fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Common local WebDriver endpoints
pub fn default_webdriver_fallbacks() -> Vec<String> {
    [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4723", // Appium default
        "http://localhost:9222", // Chrome debug port default
        "http://127.0.0.1:4444",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
