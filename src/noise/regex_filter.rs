//! Line-level cleanup of reconstructed text.
//!
//! Runs after geometric filtering and catches what survives it: page
//! numbers and page codes, exam-board boilerplate, mirrored anti-copy
//! watermarks, `(cid:N)` escapes, dot leaders and the pipeline's own page
//! separators. [`RegexNoiseFilter::filter_text`] is idempotent.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

lazy_static! {
    static ref RE_ONLY_NUMBER: Regex = Regex::new(r"^\s*\d+\s*$").unwrap();
    static ref RE_PAGE_CODE_BETWEEN_STARS: Regex = Regex::new(r"^\s*\*\s*\d{6,}\s*\*\s*$").unwrap();
    static ref RE_CID_GARBAGE: Regex = Regex::new(r"\(cid:\d+\)").unwrap();
    static ref RE_DOTS_LINE: Regex = Regex::new(r"^[\s\.]{6,}$").unwrap();
    static ref RE_COPYRIGHT_LINE: Regex =
        Regex::new(r"(?i)UCLES|Cambridge|\b\d{4}/\d{2}/[A-Z]/[A-Z]/\d{2}\b").unwrap();
    static ref RE_ONLY_PUNCT: Regex = Regex::new(r"^[\W_]{5,}$").unwrap();
    static ref RE_TURN_OVER: Regex = Regex::new(r"(?i)\[?\s*TURN\s+OVER\s*\]?").unwrap();
    static ref RE_PAGE_METADATA: Regex = Regex::new(
        r"(?i)^(PAGE\s+\d+|Exclusion zones:\s*\d+|Characters:\s*\d+\s*/\s*\d+|={10,}|=+\s*CLEANED\s+PAGE\s+\d+\s*=+)\s*$"
    )
    .unwrap();
    static ref RE_LATEX_PAGE_CODE: Regex = Regex::new(r"\^\{\*\d{6,}\*\}").unwrap();
    static ref RE_EMPTY_GROUP: Regex = Regex::new(r"[\^_]\{\}").unwrap();
    static ref RE_DOT_RUN: Regex = Regex::new(r"\.{6,}").unwrap();
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Reversed words of the "DO NOT WRITE IN THIS MARGIN" style watermarks.
pub const DEFAULT_MIRRORED_TOKENS: &[&str] = &[
    "NIGRAM", "SIHT", "NI", "ETIRW", "TON", "OD", "KCALB", "EGAP", "DNA", "KNALB",
];

/// Short printer codes seen alone on a line.
pub const DEFAULT_NOISE_CODES: &[&str] = &["DFD", "DC", "WW", "CGW"];

/// Toggles and token lists of the line filter.
///
/// The token lists are data observed on one family of exam papers; other
/// sources will need their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexFilterConfig {
    /// Standalone numbers and `* 000080… *` page codes
    pub filter_page_numbers: bool,
    /// Copyright and exam-code lines
    pub filter_copyright: bool,
    /// Mirrored watermark lines, mirrored tokens and noise codes
    pub filter_mirrored: bool,
    /// "[Turn over" markers
    pub filter_turn_over: bool,
    /// Inline `(cid:N)` escapes
    pub filter_cid_garbage: bool,
    /// Dot-only and punctuation-only lines
    pub filter_dots_punct: bool,
    /// Page separators and statistics lines written by the pipeline
    pub filter_page_metadata: bool,
    /// Upper-case mirrored watermark tokens
    pub mirrored_tokens: Vec<String>,
    /// Upper-case noise codes
    pub noise_codes: Vec<String>,
}

impl Default for RegexFilterConfig {
    fn default() -> Self {
        Self {
            filter_page_numbers: true,
            filter_copyright: true,
            filter_mirrored: true,
            filter_turn_over: true,
            filter_cid_garbage: true,
            filter_dots_punct: true,
            filter_page_metadata: true,
            mirrored_tokens: DEFAULT_MIRRORED_TOKENS.iter().map(|s| s.to_string()).collect(),
            noise_codes: DEFAULT_NOISE_CODES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RegexFilterConfig {
    /// Every predicate switched off; [`RegexNoiseFilter::filter_text`] then
    /// only cleans lines and collapses blank runs.
    pub fn disabled() -> Self {
        Self {
            filter_page_numbers: false,
            filter_copyright: false,
            filter_mirrored: false,
            filter_turn_over: false,
            filter_cid_garbage: false,
            filter_dots_punct: false,
            filter_page_metadata: false,
            ..Default::default()
        }
    }
}

/// Before/after figures of one filtering run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterStatistics {
    /// Lines before filtering
    pub original_lines: usize,
    /// Lines after filtering
    pub filtered_lines: usize,
    /// Difference in line count
    pub lines_removed: i64,
    /// Characters before filtering
    pub original_chars: usize,
    /// Characters after filtering
    pub filtered_chars: usize,
    /// Difference in character count
    pub chars_removed: i64,
    /// `chars_removed` as a percentage of `original_chars` (0 for empty input)
    pub removal_percentage: f64,
}

/// Regex-driven line filter.
#[derive(Debug, Clone)]
pub struct RegexNoiseFilter {
    config: RegexFilterConfig,
    mirrored: HashSet<String>,
    codes: HashSet<String>,
}

impl Default for RegexNoiseFilter {
    fn default() -> Self {
        Self::new(RegexFilterConfig::default())
    }
}

impl RegexNoiseFilter {
    /// Create a filter.
    pub fn new(config: RegexFilterConfig) -> Self {
        let upper = |v: &[String]| v.iter().map(|s| s.trim().to_uppercase()).collect();
        Self {
            mirrored: upper(&config.mirrored_tokens),
            codes: upper(&config.noise_codes),
            config,
        }
    }

    /// Access the configuration.
    pub fn config(&self) -> &RegexFilterConfig {
        &self.config
    }

    /// Whether a whole line is noise. Blank lines are never noise.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::noise::RegexNoiseFilter;
    ///
    /// let f = RegexNoiseFilter::default();
    /// assert!(f.should_filter_line("  12 "));
    /// assert!(f.should_filter_line("* 0000800000001 *"));
    /// assert!(f.should_filter_line("NIGRAM SIHT NI ETIRW TON OD"));
    /// assert!(f.should_filter_line("[Turn over"));
    /// assert!(!f.should_filter_line("The reaction of CO_{2} with water"));
    /// assert!(!f.should_filter_line(""));
    /// ```
    pub fn should_filter_line(&self, line: &str) -> bool {
        let cfg = &self.config;
        if line.trim().is_empty() {
            return false;
        }

        if cfg.filter_page_numbers
            && (RE_ONLY_NUMBER.is_match(line) || RE_PAGE_CODE_BETWEEN_STARS.is_match(line))
        {
            return true;
        }
        if cfg.filter_dots_punct && (RE_DOTS_LINE.is_match(line) || RE_ONLY_PUNCT.is_match(line)) {
            return true;
        }
        if cfg.filter_copyright && RE_COPYRIGHT_LINE.is_match(line) {
            return true;
        }
        if cfg.filter_turn_over && RE_TURN_OVER.is_match(line) {
            return true;
        }
        if cfg.filter_page_metadata && RE_PAGE_METADATA.is_match(line) {
            return true;
        }
        if cfg.filter_mirrored {
            if self.looks_like_mirrored_warning(line) {
                return true;
            }
            let token = line.trim().to_uppercase();
            if self.mirrored.contains(&token) || self.codes.contains(&token) {
                return true;
            }
        }

        false
    }

    /// Strip inline noise from a line and normalize its whitespace.
    ///
    /// Removes `(cid:N)` escapes, superscripted page codes and empty
    /// `^{}`/`_{}` groups, and shortens dot leaders to `...`. Repeated until
    /// nothing changes, so nested artifacts disappear too.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::noise::RegexNoiseFilter;
    ///
    /// let f = RegexNoiseFilter::default();
    /// assert_eq!(f.clean_line("H(cid:3)_{2}O  ^{}.........."), "H_{2}O ...");
    /// ```
    pub fn clean_line(&self, line: &str) -> String {
        let mut current = line.to_string();
        loop {
            let next = self.clean_once(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn clean_once(&self, line: &str) -> String {
        let mut line = if self.config.filter_cid_garbage {
            RE_CID_GARBAGE.replace_all(line, "").into_owned()
        } else {
            line.to_string()
        };
        line = RE_LATEX_PAGE_CODE.replace_all(&line, "").into_owned();
        line = RE_EMPTY_GROUP.replace_all(&line, "").into_owned();
        line = RE_DOT_RUN.replace_all(&line, "...").into_owned();
        RE_WHITESPACE.replace_all(&line, " ").trim().to_string()
    }

    /// Filter and clean a block of text.
    ///
    /// Noise lines are removed, the rest cleaned; lines that end up empty or
    /// become noise after cleaning are removed too. Runs of blank lines are
    /// collapsed to one after removal, and the result is trimmed.
    pub fn filter_text(&self, text: &str) -> String {
        let mut kept: Vec<String> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                kept.push(String::new());
                continue;
            }
            if self.should_filter_line(line) {
                continue;
            }
            let cleaned = self.clean_line(line);
            if cleaned.is_empty() || self.should_filter_line(&cleaned) {
                continue;
            }
            kept.push(cleaned);
        }

        let mut collapsed: Vec<String> = Vec::with_capacity(kept.len());
        let mut previous_blank = false;
        for line in kept {
            let blank = line.is_empty();
            if !(blank && previous_blank) {
                collapsed.push(line);
            }
            previous_blank = blank;
        }

        collapsed.join("\n").trim().to_string()
    }

    /// Compare text before and after filtering.
    pub fn statistics(&self, original: &str, filtered: &str) -> FilterStatistics {
        let original_lines = original.lines().count();
        let filtered_lines = filtered.lines().count();
        let original_chars = original.chars().count();
        let filtered_chars = filtered.chars().count();
        let chars_removed = original_chars as i64 - filtered_chars as i64;

        FilterStatistics {
            original_lines,
            filtered_lines,
            lines_removed: original_lines as i64 - filtered_lines as i64,
            original_chars,
            filtered_chars,
            chars_removed,
            removal_percentage: if original_chars > 0 {
                chars_removed as f64 / original_chars as f64 * 100.0
            } else {
                0.0
            },
        }
    }

    /// At least half the tokens (and at least two) are mirrored words.
    fn looks_like_mirrored_warning(&self, line: &str) -> bool {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return false;
        }
        let mirrored = tokens
            .iter()
            .filter(|t| self.mirrored.contains(&t.to_uppercase()))
            .count();
        mirrored >= (tokens.len() / 2).max(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Line predicates
    // ========================================================================

    #[test]
    fn test_page_numbers_and_codes() {
        let f = RegexNoiseFilter::default();
        assert!(f.should_filter_line("7"));
        assert!(f.should_filter_line(" * 0000800000002 * "));
        assert!(!f.should_filter_line("* 123 *"));
        assert!(!f.should_filter_line("7 marks"));
    }

    #[test]
    fn test_dots_and_punctuation() {
        let f = RegexNoiseFilter::default();
        assert!(f.should_filter_line(". . . . . ."));
        assert!(f.should_filter_line("-----"));
        assert!(!f.should_filter_line("...."));
    }

    #[test]
    fn test_copyright_and_turn_over() {
        let f = RegexNoiseFilter::default();
        assert!(f.should_filter_line("© UCLES 2024"));
        assert!(f.should_filter_line("0620/42/M/J/24"));
        assert!(f.should_filter_line("[Turn over"));
        assert!(f.should_filter_line("turn   over ]"));
    }

    #[test]
    fn test_pipeline_metadata() {
        let f = RegexNoiseFilter::default();
        assert!(f.should_filter_line("PAGE 3"));
        assert!(f.should_filter_line("Exclusion zones: 2"));
        assert!(f.should_filter_line("Characters: 120 / 340"));
        assert!(f.should_filter_line("=========="));
        assert!(f.should_filter_line("==================== CLEANED PAGE 4 ===================="));
        assert!(!f.should_filter_line("Page 3 shows the apparatus"));
    }

    #[test]
    fn test_mirrored_warning() {
        let f = RegexNoiseFilter::default();
        assert!(f.should_filter_line("NIGRAM SIHT"));
        assert!(f.should_filter_line("ETIRW TON OD NI SIHT NIGRAM"));
        // One mirrored token among words is not enough.
        assert!(!f.should_filter_line("Write in the box NI"));
        // Single tokens and noise codes.
        assert!(f.should_filter_line("egap"));
        assert!(f.should_filter_line(" CGW "));
    }

    #[test]
    fn test_custom_token_lists() {
        let f = RegexNoiseFilter::new(RegexFilterConfig {
            mirrored_tokens: vec!["GNIRAEW".into(), "SSALG".into()],
            noise_codes: vec!["xq".into()],
            ..Default::default()
        });
        assert!(f.should_filter_line("GNIRAEW SSALG"));
        assert!(f.should_filter_line("XQ"));
        assert!(!f.should_filter_line("NIGRAM"));
    }

    #[test]
    fn test_toggles_disable_predicates() {
        let f = RegexNoiseFilter::new(RegexFilterConfig::disabled());
        for line in ["12", "UCLES", "[Turn over", "NIGRAM", "PAGE 2", "------"] {
            assert!(!f.should_filter_line(line), "{line}");
        }
        assert_eq!(f.clean_line("a(cid:1)b"), "a(cid:1)b");
    }

    #[test]
    fn test_blank_lines_are_kept_by_predicate() {
        let f = RegexNoiseFilter::default();
        assert!(!f.should_filter_line("   "));
    }

    // ========================================================================
    // Cleaning
    // ========================================================================

    #[test]
    fn test_clean_line() {
        let f = RegexNoiseFilter::default();
        assert_eq!(f.clean_line("x^{*0000800000002*} y"), "x y");
        assert_eq!(f.clean_line("  a   b  "), "a b");
        assert_eq!(f.clean_line("_{}^{}"), "");
        assert_eq!(f.clean_line("Answer ..............."), "Answer ...");
    }

    #[test]
    fn test_clean_line_reaches_fixed_point() {
        let f = RegexNoiseFilter::default();
        // Removing the inner group exposes an outer empty group.
        assert_eq!(f.clean_line("H^{_{}}O"), "HO");
        // The cid escape splits a dot run.
        assert_eq!(f.clean_line("....(cid:5)...."), "...");
    }

    // ========================================================================
    // Whole-text filtering
    // ========================================================================

    #[test]
    fn test_filter_text() {
        let f = RegexNoiseFilter::default();
        let text = "\n\n1 Methane burns in oxygen.\n\n12\n\n\n* 0000800000003 *\n\nNIGRAM SIHT NI\n(a) Balance CH_{4} + O_{2} -> CO_{2} + H_{2}O\n© UCLES 2024\n\n";
        let out = f.filter_text(text);
        assert_eq!(
            out,
            "1 Methane burns in oxygen.\n\n(a) Balance CH_{4} + O_{2} -> CO_{2} + H_{2}O"
        );
    }

    #[test]
    fn test_blank_runs_collapse_after_removal() {
        let f = RegexNoiseFilter::default();
        let out = f.filter_text("a\n\n12\n\n13\n\nb");
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn test_line_that_cleans_to_noise_is_dropped() {
        let f = RegexNoiseFilter::default();
        // Only becomes a page number once the escape is stripped.
        assert_eq!(f.filter_text("a\n(cid:3)12\nb"), "a\nb");
        assert_eq!(f.filter_text("(cid:1)(cid:2)"), "");
    }

    #[test]
    fn test_filter_own_output_separator() {
        let f = RegexNoiseFilter::default();
        let text = "==================== CLEANED PAGE 2 ====================\nQuestion text";
        assert_eq!(f.filter_text(text), "Question text");
    }

    #[test]
    fn test_statistics() {
        let f = RegexNoiseFilter::default();
        let original = "abc\n12\ndef";
        let filtered = f.filter_text(original);
        let stats = f.statistics(original, &filtered);
        assert_eq!(stats.original_lines, 3);
        assert_eq!(stats.filtered_lines, 2);
        assert_eq!(stats.lines_removed, 1);
        assert_eq!(stats.chars_removed, 3);
        assert!((stats.removal_percentage - 30.0).abs() < 1e-9);

        let empty = f.statistics("", "");
        assert_eq!(empty.removal_percentage, 0.0);
    }

    proptest! {
        #[test]
        fn prop_filter_text_is_idempotent(
            lines in prop::collection::vec(
                prop_oneof![
                    "[ a-zA-Z0-9_^{}().*=:/\\[\\]-]{0,30}",
                    Just(String::new()),
                    Just("12".to_string()),
                    Just("NIGRAM SIHT".to_string()),
                    Just("(cid:7)".to_string()),
                    Just("H_{2}O ^{} ........".to_string()),
                    Just("==================== CLEANED PAGE 1 ====================".to_string()),
                ],
                0..12,
            )
        ) {
            let f = RegexNoiseFilter::default();
            let text = lines.join("\n");
            let once = f.filter_text(&text);
            let twice = f.filter_text(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
