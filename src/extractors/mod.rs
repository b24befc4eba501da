//! Extraction of non-text page content.
//!
//! Currently reaction arrows drawn as vector line segments.

pub mod arrows;

pub use arrows::{Arrow, ArrowConfig, ArrowDirection, ArrowExtractor, LineSegment};
