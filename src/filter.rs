use crate::error::{FinderError, Result};
use crate::normalize::normalize_url;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Accepted shape of a source URL
static SOURCE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(https?://|www\.)[^\s<>"]+"#).expect("source url pattern is valid")
});

/// A keyword and the URL its mentions should link to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeywordTarget {
    pub keyword: String,
    pub target_url: String,
}

impl KeywordTarget {
    /// Validate and trim a keyword/target pair
    pub fn new(keyword: &str, target_url: &str) -> Result<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(FinderError::EmptyKeyword);
        }

        let target_url = target_url.trim();
        if target_url.is_empty() || target_url.chars().any(char::is_whitespace) {
            return Err(FinderError::InvalidTargetUrl(target_url.to_string()));
        }

        Ok(Self {
            keyword: keyword.to_string(),
            target_url: target_url.to_string(),
        })
    }
}

/// Check a source URL and return it in standard form.
///
/// `www.` URLs get an `https://` scheme; anything else must start with
/// `http://` or `https://`.
pub fn standardize_source_url(raw: &str) -> Result<String> {
    let url = raw.trim();
    if !SOURCE_URL_REGEX.is_match(url) {
        return Err(FinderError::InvalidSourceUrl(url.to_string()));
    }
    if url.starts_with("www.") {
        Ok(format!("https://{}", url))
    } else {
        Ok(url.to_string())
    }
}

/// Source URLs that are ready to be scheduled
#[derive(Debug, Clone, Default)]
pub struct PreparedSources {
    pub urls: Vec<String>,
    /// Inputs that are not http(s) or www URLs
    pub invalid: usize,
    /// Duplicates and URLs that are link targets themselves
    pub skipped: usize,
}

impl PreparedSources {
    /// Inputs dropped for any reason
    pub fn dropped(&self) -> usize {
        self.invalid + self.skipped
    }
}

/// Validate, deduplicate and drop source URLs that are link targets themselves.
///
/// Duplicates are detected on the normalized form and the first spelling is
/// kept. Input order is preserved.
pub fn prepare_sources<S: AsRef<str>>(sources: &[S], pairs: &[KeywordTarget]) -> PreparedSources {
    let targets: HashSet<String> = pairs.iter().map(|p| normalize_url(&p.target_url)).collect();
    let mut seen = HashSet::new();
    let mut prepared = PreparedSources::default();

    for raw in sources {
        let url = match standardize_source_url(raw.as_ref()) {
            Ok(url) => url,
            Err(e) => {
                ::log::warn!("Skipping source: {}", e);
                prepared.invalid += 1;
                continue;
            }
        };

        let normalized = normalize_url(&url);
        if !seen.insert(normalized.clone()) {
            ::log::debug!("Skipping duplicate source: {}", url);
            prepared.skipped += 1;
            continue;
        }
        if targets.contains(&normalized) {
            ::log::debug!("Skipping source that is a link target: {}", url);
            prepared.skipped += 1;
            continue;
        }

        prepared.urls.push(url);
    }

    prepared
}
