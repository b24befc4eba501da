//! LaTeX-marked text reconstruction.
//!
//! Turns a page's character stream into text where subscript and
//! superscript runs are wrapped in `_{...}` and `^{...}` groups, so
//! `H`, `2` (smaller, lower) and `O` become `H_{2}O`. Reaction arrows drawn
//! as graphics replace the space characters printed underneath them.
//!
//! # Algorithm
//!
//! 1. **Line grouping.** Characters sorted by `(top, x0)` are walked in
//!    order and compared with the previous character:
//!    - a vertical gap under 3pt stays on the line
//!    - a small glyph (under 80% of the baseline size) less than 80% of the
//!      baseline size away stays on the line: it is a script, not a new line
//!    - a normal glyph more than 8pt away starts a new line
//!    - anything else stays while the gap is under 1.5 × the baseline size
//! 2. **Line baseline.** The most frequent rounded `top` of the line's
//!    normal-sized glyphs, or the page baseline when there are none.
//! 3. **Classification.** A small glyph more than 0.5pt below the line
//!    baseline is a subscript, more than 0.5pt above it a superscript.
//! 4. **Spacing.** A gap wider than 25% of the baseline size before a normal
//!    glyph closes any open group and emits a space. Scripts always attach
//!    to the preceding glyph, and a space glyph right before a script is
//!    dropped.
//! 5. **Arrows.** A space glyph within 10pt vertically of an arrow and
//!    within its horizontal span (±5pt) is replaced by ` -> ` (or `<-`,
//!    `<=>`) once; later space glyphs over the same arrow vanish.
//! 6. Open groups are closed at line end and lines joined with `\n`.

use crate::error::{Error, Result};
use crate::extractors::Arrow;
use crate::layout::{most_frequent_rounded, PageBaseline, TextChar};
use serde::{Deserialize, Serialize};

/// Thresholds of formula reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Glyphs smaller than this fraction of the baseline size may be scripts
    pub script_size_ratio: f32,
    /// Minimum vertical offset from the line baseline of a script glyph
    pub script_offset: f32,
    /// Vertical gaps below this always stay on the current line
    pub same_line_gap: f32,
    /// Normal glyphs further away than this start a new line
    pub new_line_gap: f32,
    /// Small glyphs within this fraction of the baseline size stay on the line
    pub script_line_offset_ratio: f32,
    /// Remaining gaps below this fraction of the baseline size stay on the line
    pub continuation_gap_ratio: f32,
    /// Horizontal gaps above this fraction of the baseline size become spaces
    pub word_space_ratio: f32,
    /// Vertical reach of an arrow over a space glyph
    pub arrow_vertical_tolerance: f32,
    /// Horizontal slack around an arrow's span
    pub arrow_horizontal_tolerance: f32,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            script_size_ratio: 0.8,
            script_offset: 0.5,
            same_line_gap: 3.0,
            new_line_gap: 8.0,
            script_line_offset_ratio: 0.8,
            continuation_gap_ratio: 1.5,
            word_space_ratio: 0.25,
            arrow_vertical_tolerance: 10.0,
            arrow_horizontal_tolerance: 5.0,
        }
    }
}

impl ReconstructionConfig {
    /// Check that every threshold is a finite, non-negative number.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("script_size_ratio", self.script_size_ratio),
            ("script_offset", self.script_offset),
            ("same_line_gap", self.same_line_gap),
            ("new_line_gap", self.new_line_gap),
            ("script_line_offset_ratio", self.script_line_offset_ratio),
            ("continuation_gap_ratio", self.continuation_gap_ratio),
            ("word_space_ratio", self.word_space_ratio),
            ("arrow_vertical_tolerance", self.arrow_vertical_tolerance),
            ("arrow_horizontal_tolerance", self.arrow_horizontal_tolerance),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Typographic role of a glyph within its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Regular text
    Normal,
    /// Smaller and lowered
    Subscript,
    /// Smaller and raised
    Superscript,
}

/// Reconstructs LaTeX-marked text from a page's characters.
#[derive(Debug, Clone, Default)]
pub struct FormulaReconstructor {
    config: ReconstructionConfig,
}

impl FormulaReconstructor {
    /// Create a reconstructor with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reconstructor with custom thresholds.
    pub fn with_config(config: ReconstructionConfig) -> Self {
        Self { config }
    }

    /// Access the configuration.
    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Reconstruct a page.
    ///
    /// # Arguments
    ///
    /// * `chars` - Filtered characters of the page, in any order
    /// * `baseline` - Page baseline computed from the same characters
    /// * `arrows` - Arrows detected on the page
    ///
    /// # Returns
    ///
    /// The LaTeX-marked text; empty for an empty page.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCharacter`] when a character has non-finite geometry.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::layout::{PageBaseline, TextChar};
    /// use exam_chemtext::reconstruct::FormulaReconstructor;
    ///
    /// let chars = vec![
    ///     TextChar::new("H", 100.0, 100.0, 107.0, 110.0, 10.0),
    ///     TextChar::new("2", 107.0, 103.0, 111.0, 110.0, 7.0),
    ///     TextChar::new("O", 111.0, 100.0, 118.0, 110.0, 10.0),
    /// ];
    /// let baseline = PageBaseline::from_chars(&chars);
    /// let text = FormulaReconstructor::new().reconstruct(&chars, &baseline, &[]).unwrap();
    /// assert_eq!(text, "H_{2}O");
    /// ```
    pub fn reconstruct(
        &self,
        chars: &[TextChar],
        baseline: &PageBaseline,
        arrows: &[Arrow],
    ) -> Result<String> {
        if chars.is_empty() {
            return Ok(String::new());
        }
        for c in chars {
            c.validate()?;
        }

        let size_threshold = baseline.size * self.config.script_size_ratio;
        let lines = self.group_lines(chars, baseline, size_threshold);

        let mut out = String::new();
        // Arrows are emitted at most once per page.
        let mut inserted = vec![false; arrows.len()];

        for (line_idx, mut line) in lines.into_iter().enumerate() {
            if line_idx > 0 {
                out.push('\n');
            }
            line.sort_by(|a, b| a.x0().total_cmp(&b.x0()));
            let line_top = self.line_baseline(&line, baseline, size_threshold);
            self.emit_line(&line, line_top, baseline, size_threshold, arrows, &mut inserted, &mut out);
        }

        Ok(out)
    }

    /// Classify a glyph against its line baseline.
    pub fn classify(&self, c: &TextChar, line_top: f32, size_threshold: f32) -> CharClass {
        if c.font_size >= size_threshold {
            return CharClass::Normal;
        }
        if c.top() > line_top + self.config.script_offset {
            CharClass::Subscript
        } else if c.top() < line_top - self.config.script_offset {
            CharClass::Superscript
        } else {
            CharClass::Normal
        }
    }

    fn group_lines<'a>(
        &self,
        chars: &'a [TextChar],
        baseline: &PageBaseline,
        size_threshold: f32,
    ) -> Vec<Vec<&'a TextChar>> {
        let cfg = &self.config;
        let mut sorted: Vec<&TextChar> = chars.iter().collect();
        sorted.sort_by(|a, b| a.top().total_cmp(&b.top()).then(a.x0().total_cmp(&b.x0())));

        let mut lines: Vec<Vec<&TextChar>> = Vec::new();
        let mut current: Vec<&TextChar> = Vec::new();
        let mut prev: Option<&TextChar> = None;

        for c in sorted {
            let same_line = match prev {
                None => true,
                Some(p) => {
                    let gap = (c.top() - p.top()).abs();
                    let is_small = c.font_size < size_threshold;
                    if gap < cfg.same_line_gap {
                        true
                    } else if is_small && gap < baseline.size * cfg.script_line_offset_ratio {
                        true
                    } else if gap > cfg.new_line_gap && !is_small {
                        false
                    } else {
                        gap < baseline.size * cfg.continuation_gap_ratio
                    }
                },
            };
            if !same_line && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push(c);
            prev = Some(c);
        }
        if !current.is_empty() {
            lines.push(current);
        }

        lines
    }

    fn line_baseline(&self, line: &[&TextChar], baseline: &PageBaseline, size_threshold: f32) -> f32 {
        most_frequent_rounded(
            line.iter()
                .filter(|c| c.font_size >= size_threshold)
                .map(|c| c.top()),
        )
        .unwrap_or(baseline.top)
    }

    fn find_arrow(&self, c: &TextChar, arrows: &[Arrow]) -> Option<usize> {
        let cfg = &self.config;
        arrows.iter().position(|a| {
            (c.top() - a.y).abs() < cfg.arrow_vertical_tolerance
                && c.x0() >= a.x_start - cfg.arrow_horizontal_tolerance
                && c.x0() <= a.x_end + cfg.arrow_horizontal_tolerance
        })
    }

    fn emit_line(
        &self,
        line: &[&TextChar],
        line_top: f32,
        baseline: &PageBaseline,
        size_threshold: f32,
        arrows: &[Arrow],
        inserted: &mut [bool],
        out: &mut String,
    ) {
        let word_gap = baseline.size * self.config.word_space_ratio;
        let mut mode = CharClass::Normal;
        let mut prev_x1: Option<f32> = None;

        for (i, c) in line.iter().enumerate() {
            let class = self.classify(c, line_top, size_threshold);

            if class == CharClass::Normal {
                if let Some(x1) = prev_x1 {
                    if c.x0() - x1 > word_gap {
                        close_group(out, &mut mode);
                        out.push(' ');
                    }
                }
            }

            if c.is_whitespace() {
                if let Some(idx) = self.find_arrow(c, arrows) {
                    if !inserted[idx] {
                        close_group(out, &mut mode);
                        out.push(' ');
                        out.push_str(arrows[idx].direction.as_str());
                        out.push(' ');
                        inserted[idx] = true;
                    }
                    prev_x1 = Some(c.x1());
                    continue;
                }
                let before_script = line
                    .get(i + 1)
                    .is_some_and(|next| self.classify(next, line_top, size_threshold) != CharClass::Normal);
                if before_script {
                    continue;
                }
            }

            match class {
                CharClass::Subscript if mode != CharClass::Subscript => {
                    close_group(out, &mut mode);
                    out.push_str("_{");
                    mode = CharClass::Subscript;
                },
                CharClass::Superscript if mode != CharClass::Superscript => {
                    close_group(out, &mut mode);
                    out.push_str("^{");
                    mode = CharClass::Superscript;
                },
                CharClass::Normal => close_group(out, &mut mode),
                _ => {},
            }

            out.push_str(&c.text);
            prev_x1 = Some(c.x1());
        }

        close_group(out, &mut mode);
    }
}

fn close_group(out: &mut String, mode: &mut CharClass) {
    if *mode != CharClass::Normal {
        out.push('}');
        *mode = CharClass::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ArrowDirection;

    fn ch(text: &str, x0: f32, x1: f32, top: f32, size: f32) -> TextChar {
        TextChar::new(text, x0, top, x1, top + size, size)
    }

    fn arrow(x_start: f32, x_end: f32, y: f32, direction: ArrowDirection) -> Arrow {
        Arrow {
            x_start,
            x_end,
            y,
            direction,
            length: x_end - x_start,
        }
    }

    fn reconstruct(chars: &[TextChar], arrows: &[Arrow]) -> String {
        let baseline = PageBaseline::from_chars(chars);
        FormulaReconstructor::new().reconstruct(chars, &baseline, arrows).unwrap()
    }

    // ========================================================================
    // Scripts
    // ========================================================================

    #[test]
    fn test_water() {
        let chars = vec![
            ch("H", 100.0, 107.0, 100.0, 10.0),
            ch("2", 107.0, 111.0, 103.0, 7.0),
            ch("O", 111.0, 118.0, 100.0, 10.0),
        ];
        let baseline = PageBaseline { size: 10.0, top: 100.0 };
        let text = FormulaReconstructor::new().reconstruct(&chars, &baseline, &[]).unwrap();
        assert_eq!(text, "H_{2}O");
    }

    #[test]
    fn test_superscript_charge() {
        let chars = vec![
            ch("C", 100.0, 107.0, 100.0, 10.0),
            ch("a", 107.0, 113.0, 100.0, 10.0),
            ch("2", 113.0, 117.0, 97.0, 7.0),
            ch("+", 117.0, 121.0, 97.0, 7.0),
        ];
        assert_eq!(reconstruct(&chars, &[]), "Ca^{2+}");
    }

    #[test]
    fn test_script_kinds_switch_groups() {
        // Nuclide-style: mass number up, atomic number down, then the symbol.
        let chars = vec![
            ch("3", 100.0, 104.0, 96.0, 7.0),
            ch("7", 104.0, 108.0, 104.0, 7.0),
            ch("C", 108.0, 115.0, 100.0, 10.0),
            ch("l", 115.0, 118.0, 100.0, 10.0),
            ch("x", 200.0, 205.0, 100.0, 10.0),
        ];
        assert_eq!(reconstruct(&chars, &[]), "^{3}_{7}Cl x");
    }

    #[test]
    fn test_small_glyph_near_baseline_is_normal() {
        let chars = vec![
            ch("a", 100.0, 106.0, 100.0, 10.0),
            ch("b", 106.0, 110.0, 100.3, 7.0),
        ];
        assert_eq!(reconstruct(&chars, &[]), "ab");
    }

    #[test]
    fn test_script_gap_does_not_insert_space() {
        // Kerned subscript well away from its base glyph.
        let chars = vec![
            ch("O", 100.0, 107.0, 100.0, 10.0),
            ch("2", 112.0, 116.0, 103.0, 7.0),
        ];
        assert_eq!(reconstruct(&chars, &[]), "O_{2}");
    }

    #[test]
    fn test_space_glyph_before_script_is_dropped() {
        let chars = vec![
            ch("O", 100.0, 107.0, 100.0, 10.0),
            ch(" ", 107.0, 109.0, 100.0, 10.0),
            ch("2", 109.0, 113.0, 103.0, 7.0),
        ];
        assert_eq!(reconstruct(&chars, &[]), "O_{2}");
    }

    // ========================================================================
    // Spacing and lines
    // ========================================================================

    #[test]
    fn test_word_gap_closes_group_and_spaces() {
        let chars = vec![
            ch("C", 100.0, 107.0, 100.0, 10.0),
            ch("O", 107.0, 114.0, 100.0, 10.0),
            ch("2", 114.0, 118.0, 103.0, 7.0),
            ch("i", 125.0, 128.0, 100.0, 10.0),
            ch("s", 128.0, 133.0, 100.0, 10.0),
        ];
        assert_eq!(reconstruct(&chars, &[]), "CO_{2} is");
    }

    #[test]
    fn test_lines_split_on_large_gap() {
        let chars = vec![
            ch("a", 100.0, 106.0, 100.0, 10.0),
            ch("b", 100.0, 106.0, 120.0, 10.0),
            ch("c", 106.0, 112.0, 120.0, 10.0),
        ];
        assert_eq!(reconstruct(&chars, &[]), "a\nbc");
    }

    #[test]
    fn test_subscript_below_line_is_folded_into_it() {
        // 5pt below the line: more than the same-line gap, but a small glyph.
        let chars = vec![
            ch("X", 100.0, 107.0, 100.0, 10.0),
            ch("n", 107.0, 111.0, 105.0, 6.0),
        ];
        assert_eq!(reconstruct(&chars, &[]), "X_{n}");
    }

    #[test]
    fn test_moderate_gap_continues_line() {
        // 6pt gap with a normal glyph: not "> 8", and below 1.5 × baseline.
        let chars = vec![
            ch("a", 100.0, 106.0, 100.0, 10.0),
            ch("b", 106.0, 112.0, 100.0, 10.0),
            ch("c", 112.0, 118.0, 106.0, 10.0),
        ];
        assert_eq!(reconstruct(&chars, &[]).lines().count(), 1);
    }

    #[test]
    fn test_empty_page() {
        let text = FormulaReconstructor::new()
            .reconstruct(&[], &PageBaseline::default(), &[])
            .unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_all_script_line_uses_page_baseline() {
        let chars = vec![ch("2", 100.0, 104.0, 103.0, 7.0)];
        let baseline = PageBaseline { size: 10.0, top: 100.0 };
        let text = FormulaReconstructor::new().reconstruct(&chars, &baseline, &[]).unwrap();
        assert_eq!(text, "_{2}");
    }

    #[test]
    fn test_non_finite_char_is_an_error() {
        let chars = vec![ch("a", f32::NAN, 106.0, 100.0, 10.0)];
        let result = FormulaReconstructor::new().reconstruct(&chars, &PageBaseline::default(), &[]);
        assert!(matches!(result, Err(Error::InvalidCharacter { .. })));
    }

    // ========================================================================
    // Arrows
    // ========================================================================

    fn co2_to_h2o() -> Vec<TextChar> {
        vec![
            ch("C", 100.0, 107.0, 100.0, 10.0),
            ch("O", 107.0, 114.0, 100.0, 10.0),
            ch("2", 114.0, 118.0, 103.0, 7.0),
            ch(" ", 118.0, 140.0, 100.0, 10.0),
            ch("H", 140.0, 147.0, 100.0, 10.0),
            ch("2", 147.0, 151.0, 103.0, 7.0),
            ch("O", 151.0, 158.0, 100.0, 10.0),
        ]
    }

    #[test]
    fn test_arrow_replaces_space() {
        let arrows = [arrow(120.0, 135.0, 105.0, ArrowDirection::Right)];
        assert_eq!(reconstruct(&co2_to_h2o(), &arrows), "CO_{2} -> H_{2}O");
    }

    #[test]
    fn test_equilibrium_arrow() {
        let arrows = [arrow(120.0, 135.0, 105.0, ArrowDirection::Equilibrium)];
        assert_eq!(reconstruct(&co2_to_h2o(), &arrows), "CO_{2} <=> H_{2}O");
    }

    #[test]
    fn test_arrow_emitted_once_for_several_spaces() {
        let chars = vec![
            ch("A", 100.0, 107.0, 100.0, 10.0),
            ch(" ", 107.0, 118.0, 100.0, 10.0),
            ch(" ", 118.0, 129.0, 100.0, 10.0),
            ch(" ", 129.0, 140.0, 100.0, 10.0),
            ch("B", 140.0, 147.0, 100.0, 10.0),
        ];
        let arrows = [arrow(110.0, 135.0, 104.0, ArrowDirection::Right)];
        assert_eq!(reconstruct(&chars, &arrows), "A -> B");
    }

    #[test]
    fn test_space_without_arrow_is_kept() {
        let chars = vec![
            ch("A", 100.0, 107.0, 100.0, 10.0),
            ch(" ", 107.0, 110.0, 100.0, 10.0),
            ch("B", 110.0, 117.0, 100.0, 10.0),
        ];
        let far_arrow = [arrow(110.0, 135.0, 300.0, ArrowDirection::Right)];
        assert_eq!(reconstruct(&chars, &far_arrow), "A B");
    }

    #[test]
    fn test_validate_config() {
        assert!(ReconstructionConfig::default().validate().is_ok());
        let bad = ReconstructionConfig {
            word_space_ratio: f32::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
