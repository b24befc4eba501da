//! Grouping characters into words.
//!
//! Mirrors the default behaviour of pdfplumber's `extract_words`: characters
//! whose tops are within `y_tolerance` form a line, and a line is split into
//! words at whitespace glyphs or at horizontal gaps wider than `x_tolerance`.

use crate::layout::TextChar;
use serde::{Deserialize, Serialize};

/// A word assembled from adjacent characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Concatenated character text
    pub text: String,
    /// Left edge of the first character
    pub x0: f32,
    /// Smallest top of the member characters
    pub top: f32,
    /// Right edge of the last character
    pub x1: f32,
    /// Largest bottom of the member characters
    pub bottom: f32,
}

/// Tolerances for word assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordConfig {
    /// Maximum horizontal gap between characters of one word
    pub x_tolerance: f32,
    /// Maximum difference in `top` between characters of one line
    pub y_tolerance: f32,
}

impl Default for WordConfig {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
        }
    }
}

/// Assemble words from a page's characters.
///
/// # Arguments
///
/// * `chars` - Characters in any order
/// * `config` - Gap tolerances
///
/// # Returns
///
/// Words in reading order (top to bottom, then left to right).
///
/// # Examples
///
/// ```
/// use exam_chemtext::layout::{extract_words, TextChar, WordConfig};
///
/// let chars = vec![
///     TextChar::new("U", 10.0, 20.0, 16.0, 30.0, 10.0),
///     TextChar::new("C", 16.0, 20.0, 22.0, 30.0, 10.0),
///     TextChar::new(" ", 22.0, 20.0, 25.0, 30.0, 10.0),
///     TextChar::new("X", 25.0, 20.0, 31.0, 30.0, 10.0),
/// ];
/// let words = extract_words(&chars, WordConfig::default());
/// assert_eq!(words.len(), 2);
/// assert_eq!(words[0].text, "UC");
/// assert_eq!(words[1].text, "X");
/// ```
pub fn extract_words(chars: &[TextChar], config: WordConfig) -> Vec<Word> {
    let mut sorted: Vec<&TextChar> = chars.iter().collect();
    sorted.sort_by(|a, b| a.top().total_cmp(&b.top()).then(a.x0().total_cmp(&b.x0())));

    // Cluster into lines by top.
    let mut lines: Vec<Vec<&TextChar>> = Vec::new();
    let mut line_top = f32::NEG_INFINITY;
    for c in sorted {
        match lines.last_mut() {
            Some(line) if (c.top() - line_top).abs() <= config.y_tolerance => line.push(c),
            _ => {
                line_top = c.top();
                lines.push(vec![c]);
            },
        }
    }

    let mut words = Vec::new();
    for mut line in lines {
        line.sort_by(|a, b| a.x0().total_cmp(&b.x0()));

        let mut current: Option<Word> = None;
        for c in line {
            if c.is_whitespace() {
                words.extend(current.take());
                continue;
            }
            match current.as_mut() {
                Some(word) if c.x0() - word.x1 <= config.x_tolerance => {
                    word.text.push_str(&c.text);
                    word.x1 = word.x1.max(c.x1());
                    word.top = word.top.min(c.top());
                    word.bottom = word.bottom.max(c.bottom());
                },
                _ => {
                    words.extend(current.take());
                    current = Some(Word {
                        text: c.text.clone(),
                        x0: c.x0(),
                        top: c.top(),
                        x1: c.x1(),
                        bottom: c.bottom(),
                    });
                },
            }
        }
        words.extend(current);
    }

    words
}
