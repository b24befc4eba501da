//! Error types for the extraction library.
//!
//! This module defines all error types that can occur while loading page dumps,
//! building exclusion zones and reconstructing page text.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during extraction.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// Bounding box with the wrong number of coordinates or non-finite values
    #[error("Invalid bounding box: expected 4 finite coordinates, found {found:?}")]
    InvalidBBox {
        /// Coordinates that were supplied
        found: Vec<f32>,
    },

    /// Document could not be opened or is structurally unusable
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Page index outside the document
    #[error("Page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange {
        /// Zero-based page index that was requested
        page: usize,
        /// Number of pages in the document
        page_count: usize,
    },

    /// Character with unusable geometry (NaN or infinite coordinates)
    #[error("Invalid character {text:?}: {reason}")]
    InvalidCharacter {
        /// Glyph text
        text: String,
        /// What was wrong with it
        reason: String,
    },

    /// Configuration value out of its valid range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
