//! Character representation for layout analysis.
//!
//! A [`TextChar`] is one entry of a page's raw character stream: a glyph (or a
//! short run such as a ligature or a `(cid:12)` escape) with its box and font
//! size, in PDF points with a top-left origin.

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A single character with its position and size.
///
/// Serialized as the flat record emitted by pdfplumber-style extractors:
/// `{"text", "x0", "top", "x1", "bottom", "size", "fontname"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CharRecord", into = "CharRecord")]
pub struct TextChar {
    /// Rendered text (usually a single glyph)
    pub text: String,
    /// Bounding box of the glyph
    pub bbox: Rect,
    /// Font size in points
    pub font_size: f32,
    /// Font name/family
    pub font_name: String,
}

impl TextChar {
    /// Create a character from its text, `[x0, top, x1, bottom]` box and size.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::layout::TextChar;
    ///
    /// let c = TextChar::new("H", 100.0, 100.0, 107.0, 110.0, 10.0);
    /// assert_eq!(c.x1(), 107.0);
    /// assert_eq!(c.top(), 100.0);
    /// ```
    pub fn new(text: impl Into<String>, x0: f32, top: f32, x1: f32, bottom: f32, size: f32) -> Self {
        Self {
            text: text.into(),
            bbox: Rect::from_points(x0, top, x1, bottom),
            font_size: size,
            font_name: String::new(),
        }
    }

    /// Left edge.
    #[inline]
    pub fn x0(&self) -> f32 {
        self.bbox.left()
    }

    /// Right edge.
    #[inline]
    pub fn x1(&self) -> f32 {
        self.bbox.right()
    }

    /// Top edge (distance from the top of the page).
    #[inline]
    pub fn top(&self) -> f32 {
        self.bbox.top()
    }

    /// Bottom edge (distance from the top of the page).
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.bbox.bottom()
    }

    /// The point used for zone containment tests: `(x0, top)`.
    pub fn anchor(&self) -> Point {
        Point::new(self.x0(), self.top())
    }

    /// True for space glyphs (empty after trimming).
    pub fn is_whitespace(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Reject characters whose geometry cannot be ordered or compared.
    pub fn validate(&self) -> Result<()> {
        let finite = self.bbox.to_array().iter().all(|v| v.is_finite()) && self.font_size.is_finite();
        if finite {
            Ok(())
        } else {
            Err(Error::InvalidCharacter {
                text: self.text.clone(),
                reason: format!(
                    "non-finite geometry (bbox {:?}, size {})",
                    self.bbox.to_array(),
                    self.font_size
                ),
            })
        }
    }
}

/// Wire shape of a character record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CharRecord {
    text: String,
    x0: f32,
    top: f32,
    x1: f32,
    bottom: f32,
    size: f32,
    #[serde(default)]
    fontname: String,
}

impl From<CharRecord> for TextChar {
    fn from(r: CharRecord) -> Self {
        Self {
            text: r.text,
            bbox: Rect::from_points(r.x0, r.top, r.x1, r.bottom),
            font_size: r.size,
            font_name: r.fontname,
        }
    }
}

impl From<TextChar> for CharRecord {
    fn from(c: TextChar) -> Self {
        Self {
            x0: c.x0(),
            top: c.top(),
            x1: c.x1(),
            bottom: c.bottom(),
            size: c.font_size,
            text: c.text,
            fontname: c.font_name,
        }
    }
}
