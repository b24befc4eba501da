//! Character-level layout model.
//!
//! This module provides the page character stream and the statistics derived
//! from it:
//! - [`TextChar`]: one glyph with its box and size
//! - [`extract_words`]: pdfplumber-style word assembly (used by noise detection)
//! - [`PageBaseline`]: dominant size and `top` of a character set

pub mod baseline;
pub mod text_char;
pub mod words;

// Re-export main types
pub use baseline::{most_frequent_rounded, round1, PageBaseline};
pub use text_char::TextChar;
pub use words::{extract_words, Word, WordConfig};
