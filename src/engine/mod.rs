//! Unlinked-keyword detection.
//!
//! A page is fetched and cleaned once, then every keyword/target pair is
//! checked against it: pairs the page already links are skipped, the rest
//! are searched for unlinked mentions.

pub mod batch;
pub mod evaluate;
pub mod links;
pub mod occurrences;
pub mod pattern;

use crate::config::FinderConfig;
use crate::parsers::html::CleanerOptions;
use std::time::Duration;

pub use batch::{BatchStream, PageOutcome, Progress, run_batch, spawn_batch};
pub use evaluate::{evaluate, evaluate_page};
pub use links::has_existing_link;
pub use occurrences::{MatchOptions, find_unlinked};
pub use pattern::KeywordPattern;

/// Extra time granted on top of the fetcher's own timeout before a page is abandoned
const FETCH_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Everything a worker needs to evaluate one page
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub cleaner: CleanerOptions,
    pub matching: MatchOptions,
    /// Hard cap on a single page fetch
    pub fetch_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions::from(&FinderConfig::default())
    }
}

impl From<&FinderConfig> for EngineOptions {
    fn from(config: &FinderConfig) -> Self {
        Self {
            cleaner: CleanerOptions::new(config.boilerplate_css_classes.clone()),
            matching: MatchOptions::from(config),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_seconds) + FETCH_TIMEOUT_GRACE,
        }
    }
}
