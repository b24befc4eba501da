//! Dominant size and vertical position of a character set.
//!
//! The page baseline is the reference every sub/superscript decision is made
//! against before per-line baselines exist. Values are rounded to 0.1pt before
//! counting, and ties go to the value seen first.

use crate::layout::TextChar;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Fallback size when a page has no characters.
pub const DEFAULT_BASELINE_SIZE: f32 = 10.0;

/// Page-level "normal text" reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBaseline {
    /// Most frequent font size (rounded to 0.1pt)
    pub size: f32,
    /// Most frequent `top` coordinate (rounded to 0.1pt)
    pub top: f32,
}

impl Default for PageBaseline {
    fn default() -> Self {
        Self {
            size: DEFAULT_BASELINE_SIZE,
            top: 0.0,
        }
    }
}

impl PageBaseline {
    /// Compute the baseline of a (filtered) character set.
    ///
    /// Must be recomputed whenever the set changes, e.g. after exclusion
    /// filtering.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::layout::{PageBaseline, TextChar};
    ///
    /// let chars = vec![
    ///     TextChar::new("H", 100.0, 100.0, 107.0, 110.0, 10.0),
    ///     TextChar::new("2", 107.0, 103.0, 111.0, 110.0, 7.0),
    ///     TextChar::new("O", 111.0, 100.0, 118.0, 110.0, 10.0),
    /// ];
    /// let baseline = PageBaseline::from_chars(&chars);
    /// assert_eq!(baseline.size, 10.0);
    /// assert_eq!(baseline.top, 100.0);
    /// ```
    pub fn from_chars(chars: &[TextChar]) -> Self {
        let defaults = Self::default();
        Self {
            size: most_frequent_rounded(chars.iter().map(|c| c.font_size)).unwrap_or(defaults.size),
            top: most_frequent_rounded(chars.iter().map(|c| c.top())).unwrap_or(defaults.top),
        }
    }
}

/// Round to one decimal place.
#[inline]
pub fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Most frequent value after rounding to 0.1, first-seen wins ties.
///
/// Returns `None` for an empty input. Non-finite values are ignored.
pub fn most_frequent_rounded(values: impl IntoIterator<Item = f32>) -> Option<f32> {
    let mut counts: IndexMap<i64, usize> = IndexMap::new();
    for v in values.into_iter().filter(|v| v.is_finite()) {
        *counts.entry((v * 10.0).round() as i64).or_insert(0) += 1;
    }

    let mut best: Option<(i64, usize)> = None;
    for (&key, &count) in &counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key as f32 / 10.0)
}
