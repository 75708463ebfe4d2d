use crate::parsers::text::clean_text;
use regex::{Match, Regex};

/// Case-insensitive, word-bounded matcher for a keyword phrase.
///
/// The keyword is normalized with [`clean_text`] and its terms are joined by
/// `\s+`, so it must be matched against text normalized the same way.
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    terms: Vec<String>,
    regex: Regex,
}

impl KeywordPattern {
    /// Returns `None` when the keyword has no word characters
    pub fn new(keyword: &str) -> Option<Self> {
        let terms: Vec<String> = clean_text(keyword)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return None;
        }

        let escaped: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
        let pattern = format!(r"(?i)\b{}\b", escaped.join(r"\s+"));
        match Regex::new(&pattern) {
            Ok(regex) => Some(Self { terms, regex }),
            Err(e) => {
                ::log::warn!("Cannot build pattern for keyword {:?}: {}", keyword, e);
                None
            }
        }
    }

    pub fn is_match(&self, cleaned: &str) -> bool {
        self.regex.is_match(cleaned)
    }

    pub fn find_iter<'t>(&self, cleaned: &'t str) -> impl Iterator<Item = Match<'t>> {
        self.regex.find_iter(cleaned)
    }

    /// Final normalized term of the keyword
    pub fn last_term(&self) -> &str {
        self.terms.last().map(String::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_keyword_has_no_pattern() {
        assert!(KeywordPattern::new("").is_none());
        assert!(KeywordPattern::new("  ?! ").is_none());
    }

    #[test]
    fn test_multi_word_matches_across_whitespace() {
        let pattern = KeywordPattern::new("CRM  Pro").unwrap();
        assert!(pattern.is_match("our crm pro tool"));
        assert!(pattern.is_match("our crm   pro tool"));
        assert!(!pattern.is_match("our crmpro tool"));
    }

    #[test]
    fn test_word_boundaries() {
        let pattern = KeywordPattern::new("app").unwrap();
        assert!(pattern.is_match("the app works"));
        assert!(!pattern.is_match("the application works"));
        assert!(!pattern.is_match("whatsapp"));
    }

    #[test]
    fn test_metacharacters_are_escaped() {
        let pattern = KeywordPattern::new("C++ (beta)").unwrap();
        assert_eq!(pattern.last_term(), "beta");
        assert!(pattern.is_match(&clean_text("Try C++ (beta) today")));
    }

    #[test]
    fn test_find_iter_returns_each_match() {
        let pattern = KeywordPattern::new("crm").unwrap();
        let ends: Vec<usize> = pattern.find_iter("crm and crm").map(|m| m.end()).collect();
        assert_eq!(ends, vec![3, 11]);
    }
}
