use crate::config::FinderConfig;
use crate::engine::pattern::KeywordPattern;
use crate::filter::KeywordTarget;
use crate::parsers::html::CleanedDocument;
use crate::parsers::text::{clean_text, skip_words, split_sentences, word_count};
use crate::results::MatchRecord;
use std::collections::HashSet;

/// Positional and suffix rules applied while looking for mentions
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Words at the top of the page that are never reported
    pub exclusion_word_threshold: usize,
    /// Normalized suffix words that make a match too generic
    pub forbidden_suffixes: HashSet<String>,
}

impl MatchOptions {
    pub fn new<S: AsRef<str>>(exclusion_word_threshold: usize, forbidden_suffixes: &[S]) -> Self {
        Self {
            exclusion_word_threshold,
            forbidden_suffixes: forbidden_suffixes
                .iter()
                .map(|s| clean_text(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    fn is_forbidden(&self, word: &str) -> bool {
        self.forbidden_suffixes.contains(word)
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions::from(&FinderConfig::default())
    }
}

impl From<&FinderConfig> for MatchOptions {
    fn from(config: &FinderConfig) -> Self {
        Self::new(config.exclusion_word_threshold, &config.forbidden_suffixes)
    }
}

/// Finds sentences in the content view that mention the keyword without a link.
///
/// Returns one record per matching sentence, in document order.
pub fn find_unlinked(
    doc: &CleanedDocument,
    source_url: &str,
    pair: &KeywordTarget,
    options: &MatchOptions,
) -> Vec<MatchRecord> {
    let sentences = eligible_sentences(&doc.text_blocks(), options.exclusion_word_threshold);
    match KeywordPattern::new(&pair.keyword) {
        Some(pattern) => find_in_sentences(&sentences, &pattern, source_url, pair, options),
        None => Vec::new(),
    }
}

/// Sentences past the first `threshold` words of the page.
///
/// Words are counted cumulatively across blocks. The sentence that crosses
/// the threshold keeps only the words after it.
pub(crate) fn eligible_sentences(blocks: &[String], threshold: usize) -> Vec<String> {
    let mut seen = 0;
    let mut eligible = Vec::new();

    for block in blocks {
        for sentence in split_sentences(block) {
            let words = word_count(sentence);
            if seen >= threshold {
                eligible.push(sentence.to_string());
            } else if seen + words > threshold {
                eligible.push(skip_words(sentence, threshold - seen).to_string());
            }
            seen += words;
        }
    }

    eligible
}

pub(crate) fn find_in_sentences(
    sentences: &[String],
    pattern: &KeywordPattern,
    source_url: &str,
    pair: &KeywordTarget,
    options: &MatchOptions,
) -> Vec<MatchRecord> {
    // Nothing to tell apart when the keyword is itself "... software".
    let check_suffix = !options.is_forbidden(pattern.last_term());

    sentences
        .iter()
        .filter(|sentence| {
            let cleaned = clean_text(sentence);
            pattern.find_iter(&cleaned).any(|m| {
                !check_suffix || !followed_by_forbidden(&cleaned[m.end()..], options)
            })
        })
        .map(|sentence| MatchRecord {
            source_url: source_url.to_string(),
            keyword: pair.keyword.clone(),
            target_url: pair.target_url.clone(),
            context: sentence.clone(),
        })
        .collect()
}

fn followed_by_forbidden(rest: &str, options: &MatchOptions) -> bool {
    rest.split_whitespace()
        .next()
        .is_some_and(|word| options.is_forbidden(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{CleanerOptions, clean};

    const SOURCE: &str = "https://example.com/post";

    fn filler(n: usize) -> String {
        (0..n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
    }

    fn find(html: &str, keyword: &str, threshold: usize) -> Vec<MatchRecord> {
        let doc = clean(html, &CleanerOptions::default());
        let pair = KeywordTarget::new(keyword, "https://x.com/crm").unwrap();
        let options = MatchOptions::new(threshold, &FinderConfig::default().forbidden_suffixes);
        find_unlinked(&doc, SOURCE, &pair, &options)
    }

    #[test]
    fn test_end_to_end_crm_pro() {
        let html = format!(
            "<body><p>{} Our new CRM Pro tool helps sales teams.</p></body>",
            filler(60)
        );
        let records = find(&html, "CRM Pro", 50);
        assert_eq!(records.len(), 1);
        assert!(records[0].context.contains("CRM Pro tool"));
        assert_eq!(records[0].keyword, "CRM Pro");
        assert_eq!(records[0].target_url, "https://x.com/crm");
        assert_eq!(records[0].source_url, SOURCE);
    }

    #[test]
    fn test_threshold_excludes_early_mention() {
        // Keyword at word 10 and word 70.
        let html = format!(
            "<body><p>{} widget {}. {} widget again.</p></body>",
            filler(9),
            filler(50),
            filler(9)
        );
        let records = find(&html, "widget", 50);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context, format!("{} widget again.", filler(9)));
    }

    #[test]
    fn test_threshold_trims_straddling_sentence() {
        let html = format!(
            "<body><p>{} widget early and widget late.</p></body>",
            filler(3)
        );
        // Threshold ends after "widget early".
        let records = find(&html, "widget", 5);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context, "and widget late.");

        // Threshold ends after the last mention.
        let records = find(&html, "widget", 7);
        assert!(records.is_empty());
    }

    #[test]
    fn test_threshold_counts_across_blocks() {
        let html = format!(
            "<body><p>{}</p><p>widget one.</p><p>{}</p><p>widget two.</p></body>",
            filler(45),
            filler(10)
        );
        let records = find(&html, "widget", 50);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context, "widget two.");
    }

    #[test]
    fn test_zero_threshold_reports_everything() {
        let records = find("<p>Widget first. Widget second.</p>", "widget", 0);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_forbidden_suffix_suppresses_match() {
        let records = find("<p>The best CRM software for teams.</p>", "CRM", 0);
        assert!(records.is_empty());

        let records = find("<p>The best CRM Solutions here.</p>", "CRM", 0);
        assert!(records.is_empty());
    }

    #[test]
    fn test_keyword_ending_in_suffix_skips_policy() {
        let records = find("<p>The best CRM software software today.</p>", "CRM Software", 0);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_suffix_only_blocks_the_generic_mention() {
        let records = find("<p>CRM software is common, but a CRM helps.</p>", "CRM", 0);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_linked_and_heading_mentions_ignored() {
        let records = find(
            "<h2>Widget guide</h2><p>See <a href=\"/w\">widget</a> here. \
             A <strong>widget</strong> is bold.</p>",
            "widget",
            0,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_one_record_per_sentence() {
        let records = find(
            "<p>Widget and widget again. Nothing here. Last widget!</p>",
            "widget",
            0,
        );
        let contexts: Vec<_> = records.iter().map(|r| r.context.as_str()).collect();
        assert_eq!(contexts, vec!["Widget and widget again.", "Last widget!"]);
    }

    #[test]
    fn test_punctuation_and_case_insensitive() {
        let records = find("<p>We love crm-pro, really.</p>", "CRM Pro", 0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context, "We love crm-pro, really.");
    }

    #[test]
    fn test_empty_keyword_after_cleaning() {
        let doc = clean("<p>Some text.</p>", &CleanerOptions::default());
        let pair = KeywordTarget {
            keyword: "!!".to_string(),
            target_url: "https://x.com".to_string(),
        };
        assert!(find_unlinked(&doc, SOURCE, &pair, &MatchOptions::default()).is_empty());
    }

    #[test]
    fn test_eligible_sentences() {
        let blocks = vec!["a b c. d e".to_string(), "f g h.".to_string()];
        assert_eq!(eligible_sentences(&blocks, 0), vec!["a b c.", "d e", "f g h."]);
        assert_eq!(eligible_sentences(&blocks, 4), vec!["e", "f g h."]);
        assert_eq!(eligible_sentences(&blocks, 5), vec!["f g h."]);
        assert!(eligible_sentences(&blocks, 8).is_empty());
    }
}
