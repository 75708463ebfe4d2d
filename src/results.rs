use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::time::Duration;

/// One unlinked mention of a keyword on a source page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Page the mention was found on
    pub source_url: String,

    /// Keyword as supplied by the caller
    pub keyword: String,

    /// URL the mention should link to
    pub target_url: String,

    /// Sentence the mention appears in, as written on the page
    pub context: String,
}

/// All unlinked mentions found on a single page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub unlinked_matches: Vec<MatchRecord>,
}

/// Flat export row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityRow {
    pub source_url: String,
    pub keyword: String,
    pub target_url: String,
    pub context: String,
}

impl PageResult {
    /// Build a result, or `None` when there is nothing to report
    pub fn from_matches(url: String, unlinked_matches: Vec<MatchRecord>) -> Option<Self> {
        if unlinked_matches.is_empty() {
            None
        } else {
            Some(Self {
                url,
                unlinked_matches,
            })
        }
    }

    /// Flatten into one export row per match
    pub fn rows(&self) -> impl Iterator<Item = OpportunityRow> + '_ {
        self.unlinked_matches.iter().map(|m| OpportunityRow {
            source_url: self.url.clone(),
            keyword: m.keyword.clone(),
            target_url: m.target_url.clone(),
            context: m.context.clone(),
        })
    }
}

/// Counters describing a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Source URLs supplied by the caller
    pub sources_total: usize,

    /// Inputs that are not http(s) or www URLs
    pub sources_invalid: usize,

    /// Duplicates and URLs that are themselves link targets
    pub sources_skipped: usize,

    /// Pages that were scheduled for evaluation
    pub pages_evaluated: usize,

    /// Pages that could not be fetched
    pub pages_failed: usize,

    /// Pages with at least one unlinked mention
    pub pages_with_matches: usize,

    /// Total number of unlinked mentions
    pub opportunities: usize,

    pub elapsed: Duration,
}

/// Results of a batch run together with its summary
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: Vec<PageResult>,
    pub summary: Summary,
}

impl BatchReport {
    /// All export rows across every page
    pub fn rows(&self) -> Vec<OpportunityRow> {
        self.results.iter().flat_map(|r| r.rows()).collect()
    }

    /// Number of distinct source pages with opportunities
    pub fn matched_urls(&self) -> usize {
        self.results
            .iter()
            .map(|r| r.url.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Write results as CSV with `source_url,keyword,target_url,context` columns
pub fn write_csv<W: Write>(writer: W, results: &[PageResult]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["source_url", "keyword", "target_url", "context"])?;
    for row in results.iter().flat_map(|r| r.rows()) {
        wtr.write_record([&row.source_url, &row.keyword, &row.target_url, &row.context])?;
    }
    wtr.flush()?;
    Ok(())
}
