//! HTML cleaning and text normalization used by the matching engine.

pub mod html;
pub mod text;


pub use html::{Anchor, CleanedDocument, CleanerOptions, clean};
pub use text::clean_text;
