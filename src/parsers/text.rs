use regex::Regex;
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

static NON_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]+").expect("non-word pattern is valid"));

/// Normalizes text for matching.
///
/// This function:
/// - Replaces HTML tags with spaces
/// - Replaces punctuation and other non-word characters with spaces
/// - Collapses runs of whitespace into single spaces
/// - Lower-cases and trims the result
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let without_tags = TAG_REGEX.replace_all(text, " ");
    let words_only = NON_WORD_REGEX.replace_all(&without_tags, " ");
    normalize_whitespace_in_segment(&words_only).to_lowercase()
}

/// Splits text into sentences after `.`, `!` or `?` followed by whitespace
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next_idx, next)) = chars.peek() {
            if next.is_whitespace() {
                push_trimmed(&mut sentences, &text[start..next_idx]);
                start = next_idx;
            }
        }
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, sentence: &'a str) {
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns the text that follows the first `n` words
pub fn skip_words(text: &str, n: usize) -> &str {
    if n == 0 {
        return text.trim();
    }

    let mut words = 0;
    let mut in_word = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if in_word {
                in_word = false;
                words += 1;
                if words == n {
                    return text[i..].trim();
                }
            }
        } else {
            in_word = true;
        }
    }

    ""
}

/// Normalizes whitespace within a single line or paragraph
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}
