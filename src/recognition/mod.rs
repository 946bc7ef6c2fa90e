//! Template-based character recognition.
//!
//! [`templates`] loads reference bitmaps from disk into a
//! [`TemplateLibrary`]; [`matching`] scores segmented glyphs against it
//! with normalized cross-correlation.

pub mod matching;
pub mod templates;

pub use matching::{best_match, classify_glyphs, normalized_correlation};
pub use templates::{TemplateEntry, TemplateLibrary, prepare_template};
