//! Reaction arrow detection from vector line primitives.
//!
//! Chemistry exam papers often draw reaction arrows as short strokes instead
//! of glyphs, so they are missing from the character stream. This module
//! finds them among a page's line segments:
//!
//! 1. Keep near-horizontal segments of arrow length inside the content band
//!    (the top and bottom 10% of the page hold headers and footers).
//! 2. Fuse two opposite-direction segments at nearly the same place into one
//!    equilibrium arrow (`<=>`). Matching is greedy: the first compatible
//!    partner wins.
//! 3. Every other segment becomes a single `->` or `<-` arrow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A straight line primitive, drawn from `(x0, y0)` to `(x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    /// Start x
    pub x0: f32,
    /// Start y (top-left origin)
    pub y0: f32,
    /// End x
    pub x1: f32,
    /// End y (top-left origin)
    pub y1: f32,
}

impl LineSegment {
    /// Create a segment from its start and end points.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Horizontal extent.
    pub fn length(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    /// Horizontal midpoint.
    pub fn mid_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

/// Direction token emitted into reconstructed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowDirection {
    /// Drawn left to right
    #[serde(rename = "->")]
    Right,
    /// Drawn right to left
    #[serde(rename = "<-")]
    Left,
    /// Two opposite arrows on top of each other
    #[serde(rename = "<=>")]
    Equilibrium,
}

impl ArrowDirection {
    /// The text token for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrowDirection::Right => "->",
            ArrowDirection::Left => "<-",
            ArrowDirection::Equilibrium => "<=>",
        }
    }
}

impl fmt::Display for ArrowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected arrow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    /// Left end
    pub x_start: f32,
    /// Right end
    pub x_end: f32,
    /// Vertical position
    pub y: f32,
    /// Direction token
    pub direction: ArrowDirection,
    /// Length of the (longest) stroke
    pub length: f32,
}

/// Thresholds for arrow detection, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    /// Maximum |y1 - y0| of a horizontal stroke
    pub max_vertical_delta: f32,
    /// Shortest stroke considered an arrow
    pub min_length: f32,
    /// Longest stroke considered an arrow
    pub max_length: f32,
    /// Fraction of page height excluded at the top and at the bottom
    pub content_margin_ratio: f32,
    /// Maximum vertical distance between the two strokes of an equilibrium arrow
    pub pair_vertical_tolerance: f32,
    /// Maximum midpoint distance between the two strokes of an equilibrium arrow
    pub pair_midpoint_tolerance: f32,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            max_vertical_delta: 2.0,
            min_length: 8.0,
            max_length: 30.0,
            content_margin_ratio: 0.1,
            pair_vertical_tolerance: 5.0,
            pair_midpoint_tolerance: 10.0,
        }
    }
}

/// A stroke that passed the shape filter.
#[derive(Debug, Clone, Copy)]
struct Stroke {
    x_start: f32,
    x_end: f32,
    mid_x: f32,
    y: f32,
    rightward: bool,
    length: f32,
}

/// Arrow extractor for one page at a time.
#[derive(Debug, Clone, Default)]
pub struct ArrowExtractor {
    config: ArrowConfig,
}

impl ArrowExtractor {
    /// Create an extractor with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with custom thresholds.
    pub fn with_config(config: ArrowConfig) -> Self {
        Self { config }
    }

    /// Detect arrows among a page's line segments.
    ///
    /// # Arguments
    ///
    /// * `segments` - Line primitives of the page
    /// * `page_height` - Page height in points (for the content band)
    ///
    /// # Returns
    ///
    /// Arrows in the order of their first stroke.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::extractors::{ArrowDirection, ArrowExtractor, LineSegment};
    ///
    /// let segments = vec![
    ///     LineSegment::new(100.0, 400.0, 115.0, 400.0),
    ///     LineSegment::new(115.0, 402.0, 100.0, 402.0),
    /// ];
    /// let arrows = ArrowExtractor::new().extract(&segments, 842.0);
    /// assert_eq!(arrows.len(), 1);
    /// assert_eq!(arrows[0].direction, ArrowDirection::Equilibrium);
    /// ```
    pub fn extract(&self, segments: &[LineSegment], page_height: f32) -> Vec<Arrow> {
        let strokes = self.candidate_strokes(segments, page_height);
        let arrows = self.pair_strokes(&strokes);
        if !arrows.is_empty() {
            log::debug!(
                "Detected {} arrows from {} candidate strokes ({} segments)",
                arrows.len(),
                strokes.len(),
                segments.len()
            );
        }
        arrows
    }

    fn candidate_strokes(&self, segments: &[LineSegment], page_height: f32) -> Vec<Stroke> {
        let cfg = &self.config;
        let content_top = page_height * cfg.content_margin_ratio;
        let content_bottom = page_height * (1.0 - cfg.content_margin_ratio);

        segments
            .iter()
            .filter(|s| {
                let length = s.length();
                (cfg.min_length..=cfg.max_length).contains(&length)
                    && (s.y0 - s.y1).abs() < cfg.max_vertical_delta
                    && (content_top..=content_bottom).contains(&s.y0)
            })
            .map(|s| Stroke {
                x_start: s.x0.min(s.x1),
                x_end: s.x0.max(s.x1),
                mid_x: s.mid_x(),
                y: s.y0,
                rightward: s.x1 > s.x0,
                length: s.length(),
            })
            .collect()
    }

    fn pair_strokes(&self, strokes: &[Stroke]) -> Vec<Arrow> {
        let cfg = &self.config;
        let mut consumed = vec![false; strokes.len()];
        let mut arrows = Vec::new();

        for i in 0..strokes.len() {
            if consumed[i] {
                continue;
            }
            let a = &strokes[i];
            consumed[i] = true;

            let partner = (0..strokes.len()).find(|&j| {
                let b = &strokes[j];
                !consumed[j]
                    && (a.y - b.y).abs() < cfg.pair_vertical_tolerance
                    && (a.mid_x - b.mid_x).abs() < cfg.pair_midpoint_tolerance
                    && a.rightward != b.rightward
            });

            let arrow = match partner {
                Some(j) => {
                    consumed[j] = true;
                    let b = &strokes[j];
                    Arrow {
                        x_start: a.x_start.min(b.x_start),
                        x_end: a.x_end.max(b.x_end),
                        y: (a.y + b.y) / 2.0,
                        direction: ArrowDirection::Equilibrium,
                        length: a.length.max(b.length),
                    }
                },
                None => Arrow {
                    x_start: a.x_start,
                    x_end: a.x_end,
                    y: a.y,
                    direction: if a.rightward {
                        ArrowDirection::Right
                    } else {
                        ArrowDirection::Left
                    },
                    length: a.length,
                },
            };
            arrows.push(arrow);
        }

        arrows
    }
}
