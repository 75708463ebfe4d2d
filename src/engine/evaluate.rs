use crate::engine::EngineOptions;
use crate::engine::links::anchors_link_keyword;
use crate::engine::occurrences::{eligible_sentences, find_in_sentences};
use crate::engine::pattern::KeywordPattern;
use crate::error::FetchError;
use crate::fetchers::Fetcher;
use crate::filter::KeywordTarget;
use crate::normalize::normalize_url;
use crate::parsers::html;
use crate::results::{MatchRecord, PageResult};
use tokio::time::timeout;

/// Evaluates one source page against every keyword/target pair.
///
/// Fetch failures are logged and reported as `None`, like a page without
/// opportunities.
pub async fn evaluate(
    fetcher: &dyn Fetcher,
    url: &str,
    pairs: &[KeywordTarget],
    options: &EngineOptions,
) -> Option<PageResult> {
    match evaluate_page(fetcher, url, pairs, options).await {
        Ok(result) => result,
        Err(e) => {
            ::log::error!("Error processing {}: {}", url, e);
            None
        }
    }
}

/// Like [`evaluate`] but hands fetch failures back to the caller.
///
/// The page is fetched at most once regardless of how many pairs are given,
/// and not at all when every pair targets the page itself.
pub async fn evaluate_page(
    fetcher: &dyn Fetcher,
    url: &str,
    pairs: &[KeywordTarget],
    options: &EngineOptions,
) -> Result<Option<PageResult>, FetchError> {
    let source = normalize_url(url);
    let active: Vec<&KeywordTarget> = pairs
        .iter()
        .filter(|pair| {
            let self_link = normalize_url(&pair.target_url) == source;
            if self_link {
                ::log::debug!("Skipping {:?} on {}: page is its own target", pair.keyword, url);
            }
            !self_link
        })
        .collect();

    if active.is_empty() {
        return Ok(None);
    }

    let start = std::time::Instant::now();
    let body = match timeout(options.fetch_timeout, fetcher.fetch(url)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(FetchError::Timeout {
                url: url.to_string(),
            });
        }
    };

    let matches = scan_page(&body, url, &active, options);
    ::log::debug!(
        "Evaluated {} against {} pairs in {:.2} seconds: {} matches",
        url,
        active.len(),
        start.elapsed().as_secs_f64(),
        matches.len()
    );

    Ok(PageResult::from_matches(url.to_string(), matches))
}

/// Cleans fetched HTML once and runs every pair against it
pub fn scan_page(
    body: &str,
    url: &str,
    pairs: &[&KeywordTarget],
    options: &EngineOptions,
) -> Vec<MatchRecord> {
    let doc = html::clean(body, &options.cleaner);
    let anchors = doc.anchors();
    let sentences = eligible_sentences(
        &doc.text_blocks(),
        options.matching.exclusion_word_threshold,
    );

    let mut records = Vec::new();
    for pair in pairs {
        let Some(pattern) = KeywordPattern::new(&pair.keyword) else {
            ::log::debug!("Keyword {:?} has no matchable words", pair.keyword);
            continue;
        };

        // Must run first: a page that already links the keyword is not an opportunity.
        if anchors_link_keyword(&anchors, &pattern, url, &normalize_url(&pair.target_url)) {
            ::log::debug!(
                "{} already links {:?} to {}",
                url,
                pair.keyword,
                pair.target_url
            );
            continue;
        }

        records.extend(find_in_sentences(
            &sentences,
            &pattern,
            url,
            pair,
            &options.matching,
        ));
    }

    records
}
