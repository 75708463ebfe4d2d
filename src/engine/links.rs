use crate::engine::pattern::KeywordPattern;
use crate::normalize::normalize_url;
use crate::parsers::html::{Anchor, CleanedDocument};
use crate::parsers::text::clean_text;
use url::Url;

/// Whether the page already links `keyword` to `target_url`.
///
/// An anchor counts when its visible text contains the keyword and its
/// `href`, resolved against `source_url`, normalizes to the same URL as the
/// target.
pub fn has_existing_link(
    doc: &CleanedDocument,
    keyword: &str,
    source_url: &str,
    target_url: &str,
) -> bool {
    match KeywordPattern::new(keyword) {
        Some(pattern) => {
            anchors_link_keyword(&doc.anchors(), &pattern, source_url, &normalize_url(target_url))
        }
        None => false,
    }
}

/// Anchor scan against a prebuilt pattern and normalized target
pub(crate) fn anchors_link_keyword(
    anchors: &[Anchor],
    pattern: &KeywordPattern,
    source_url: &str,
    normalized_target: &str,
) -> bool {
    let base = Url::parse(source_url).ok();

    anchors.iter().any(|anchor| {
        if !pattern.is_match(&clean_text(&anchor.text)) {
            return false;
        }
        let resolved = resolve_href(base.as_ref(), &anchor.href);
        let linked = normalize_url(&resolved) == normalized_target;
        if linked {
            ::log::trace!("Existing link {:?} -> {}", anchor.text, resolved);
        }
        linked
    })
}

/// Absolute form of `href`, or `href` itself when it cannot be resolved
fn resolve_href(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    match base.map(|b| b.join(href)) {
        Some(Ok(url)) => url.to_string(),
        _ => href.to_string(),
    }
}
