//! Plain-text reconstruction.
//!
//! The simple sibling of [`crate::reconstruct::FormulaReconstructor`]: no
//! script detection and no arrows, just reading order with line breaks and
//! word spaces derived from fixed gaps between consecutive characters.

use crate::layout::TextChar;
use serde::{Deserialize, Serialize};

/// Gap thresholds of plain-text reconstruction, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainTextConfig {
    /// Vertical distance to the previous character that starts a new line
    pub new_line_gap: f32,
    /// Horizontal gap to the previous character that inserts a space
    pub space_gap: f32,
}

impl Default for PlainTextConfig {
    fn default() -> Self {
        Self {
            new_line_gap: 8.0,
            space_gap: 2.0,
        }
    }
}

/// Reconstruct plain text from characters in any order.
///
/// # Examples
///
/// ```
/// use exam_chemtext::layout::TextChar;
/// use exam_chemtext::reconstruct::{reconstruct_plain, PlainTextConfig};
///
/// let chars = vec![
///     TextChar::new("n", 106.0, 100.0, 112.0, 110.0, 10.0),
///     TextChar::new("i", 100.0, 100.0, 106.0, 110.0, 10.0),
///     TextChar::new("2", 100.0, 120.0, 106.0, 130.0, 10.0),
/// ];
/// assert_eq!(reconstruct_plain(&chars, &PlainTextConfig::default()), "in\n2");
/// ```
pub fn reconstruct_plain(chars: &[TextChar], config: &PlainTextConfig) -> String {
    let mut sorted: Vec<&TextChar> = chars.iter().collect();
    sorted.sort_by(|a, b| a.top().total_cmp(&b.top()).then(a.x0().total_cmp(&b.x0())));

    let mut out = String::new();
    let mut prev: Option<&TextChar> = None;

    for c in sorted {
        if let Some(p) = prev {
            if (c.top() - p.top()).abs() > config.new_line_gap {
                out.push('\n');
            } else if c.x0() - p.x1() > config.space_gap {
                out.push(' ');
            }
        }
        out.push_str(&c.text);
        prev = Some(c);
    }

    out
}
