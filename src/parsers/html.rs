use crate::parsers::text::normalize_whitespace_in_segment;
use ego_tree::iter::Edge;
use scraper::node::Element;
use scraper::{Html, Node, Selector};
use std::sync::LazyLock;

/// Elements that never carry page prose
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "meta", "link", "iframe", "noscript",
];

/// Elements that are not body prose for the purpose of finding new links
const NON_PROSE_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "strong", "a"];

/// Elements whose boundaries separate text blocks
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "details", "div", "dl",
    "dt", "figcaption", "figure", "form", "hr", "li", "main", "ol", "p", "pre", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// Options controlling which parts of a page are removed
#[derive(Debug, Clone, Default)]
pub struct CleanerOptions {
    /// Class deny-list; entries with spaces must equal the whole class attribute
    pub boilerplate_css_classes: Vec<String>,
}

impl CleanerOptions {
    pub fn new(boilerplate_css_classes: Vec<String>) -> Self {
        Self {
            boilerplate_css_classes,
        }
    }

    fn is_boilerplate(&self, element: &Element) -> bool {
        let Some(class_attr) = element.attr("class") else {
            return false;
        };
        let full_class = normalize_whitespace_in_segment(class_attr);

        self.boilerplate_css_classes.iter().any(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                false
            } else if entry.contains(char::is_whitespace) {
                full_class == normalize_whitespace_in_segment(entry)
            } else {
                element.classes().any(|class| class == entry)
            }
        })
    }
}

/// A link on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Visible text, whitespace-collapsed
    pub text: String,
    /// Raw `href` attribute
    pub href: String,
}

/// A parsed page with boilerplate removed.
///
/// Holds two views of the same page: the full document, which keeps anchors
/// for existing-link checks, and the content view, which also drops
/// headings, `strong` and anchors and is used to look for new mentions.
pub struct CleanedDocument {
    full: Html,
    content: Html,
}

impl CleanedDocument {
    /// Full view, anchors intact
    pub fn full(&self) -> &Html {
        &self.full
    }

    /// Prose-only view
    pub fn content(&self) -> &Html {
        &self.content
    }

    /// Every anchor with an `href` in the full view
    pub fn anchors(&self) -> Vec<Anchor> {
        self.full
            .select(&ANCHOR_SELECTOR)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some(Anchor {
                    text: normalize_whitespace_in_segment(&a.text().collect::<String>()),
                    href: href.to_string(),
                })
            })
            .collect()
    }

    /// Block-level prose from the content view, in document order
    pub fn text_blocks(&self) -> Vec<String> {
        text_blocks(self.content())
    }

    /// All prose from the content view joined into one string
    pub fn text(&self) -> String {
        self.text_blocks().join(" ")
    }
}

/// Parses HTML and removes non-content elements
pub fn clean(html: &str, options: &CleanerOptions) -> CleanedDocument {
    let mut full = Html::parse_document(html);
    remove_elements(&mut full, |el| {
        NON_CONTENT_TAGS.contains(&el.name()) || options.is_boilerplate(el)
    });

    let mut content = full.clone();
    remove_elements(&mut content, |el| NON_PROSE_TAGS.contains(&el.name()));

    ::log::trace!(
        "Cleaned document: {} anchors, {} text blocks",
        full.select(&ANCHOR_SELECTOR).count(),
        text_blocks(&content).len()
    );

    CleanedDocument { full, content }
}

/// Detaches every element matching `predicate` together with its subtree
fn remove_elements<F>(doc: &mut Html, predicate: F)
where
    F: Fn(&Element) -> bool,
{
    let ids: Vec<_> = doc
        .tree
        .nodes()
        .filter(|node| node.value().as_element().is_some_and(&predicate))
        .map(|node| node.id())
        .collect();

    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Collects text grouped by block-level element, skipping anything inside `<a>`
pub fn text_blocks(doc: &Html) -> Vec<String> {
    let root = doc
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| doc.root_element());

    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut anchor_depth = 0usize;

    for edge in root.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Text(text) if anchor_depth == 0 => current.push_str(text),
                Node::Element(el) if el.name() == "a" => anchor_depth += 1,
                Node::Element(el) if BLOCK_TAGS.contains(&el.name()) => {
                    flush_block(&mut blocks, &mut current)
                }
                _ => {}
            },
            Edge::Close(node) => {
                if let Some(el) = node.value().as_element() {
                    if el.name() == "a" {
                        anchor_depth = anchor_depth.saturating_sub(1);
                    } else if BLOCK_TAGS.contains(&el.name()) {
                        flush_block(&mut blocks, &mut current);
                    }
                }
            }
        }
    }
    flush_block(&mut blocks, &mut current);

    blocks
}

fn flush_block(blocks: &mut Vec<String>, current: &mut String) {
    let block = normalize_whitespace_in_segment(current);
    if !block.is_empty() {
        blocks.push(block);
    }
    current.clear();
}
