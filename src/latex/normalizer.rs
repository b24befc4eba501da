//! Repair of nuclide notation in reconstructed LaTeX.
//!
//! Glyph-level reconstruction splits two-digit mass and atomic numbers into
//! alternating script groups: `^{3}_{1}^{5}_{7}Cl` is chlorine-35 printed
//! as two stacked digit pairs. [`LatexNormalizer`] merges such quadruples
//! into `^{35}_{17}Cl` (string concatenation of the digit runs, not
//! addition) and then wraps the element symbol in `\mathrm{}`.
//!
//! Normalization is idempotent.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

lazy_static! {
    /// `^{A1}_{Z1}^{A2}_{Z2}El`
    static ref RE_NUCLIDE_SPLIT: Regex =
        Regex::new(r"\^\{(\d+)\}_\{(\d+)\}\^\{(\d+)\}_\{(\d+)\}([A-Z][a-z]?)").unwrap();
    /// `^{A}_{Z}El` or `^{A}_{Z}\mathrm{El`
    static ref RE_NUCLIDE_NORMALIZED: Regex =
        Regex::new(r"\^\{(\d+)\}_\{(\d+)\}(\\mathrm\{)?([A-Z][a-z]?)").unwrap();
}

/// Counts describing one normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerStats {
    /// Split nuclides in the input
    pub original_split_nuclides: usize,
    /// Split nuclides left in the output
    pub remaining_split_nuclides: usize,
    /// Nuclides in normalized form in the output
    pub normalized_nuclides: usize,
    /// Split nuclides that were merged
    pub nuclides_repaired: usize,
    /// Whether the text changed at all
    pub text_changed: bool,
}

/// Nuclide notation normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatexNormalizer {
    /// Merge split mass/atomic number groups
    pub normalize_nuclides: bool,
    /// Wrap nuclide element symbols in `\mathrm{}`
    pub wrap_elements: bool,
}

impl Default for LatexNormalizer {
    fn default() -> Self {
        Self {
            normalize_nuclides: true,
            wrap_elements: true,
        }
    }
}

impl LatexNormalizer {
    /// Create a normalizer with both passes enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a block of LaTeX-marked text.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::latex::LatexNormalizer;
    ///
    /// let n = LatexNormalizer::new();
    /// let once = n.normalize("^{3}_{1}^{5}_{7}Cl");
    /// assert_eq!(once, r"^{35}_{17}\mathrm{Cl}");
    /// assert_eq!(n.normalize(&once), once);
    /// ```
    pub fn normalize(&self, text: &str) -> String {
        let mut text = text.to_string();
        if self.normalize_nuclides {
            text = merge_split_nuclides(&text);
        }
        if self.wrap_elements {
            text = wrap_nuclide_elements(&text);
        }
        text
    }

    /// Normalize several texts.
    pub fn normalize_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        texts.iter().map(|t| self.normalize(t.as_ref())).collect()
    }

    /// Compare text before and after normalization.
    pub fn statistics(&self, original: &str, normalized: &str) -> NormalizerStats {
        let original_split = RE_NUCLIDE_SPLIT.find_iter(original).count();
        let remaining_split = RE_NUCLIDE_SPLIT.find_iter(normalized).count();
        NormalizerStats {
            original_split_nuclides: original_split,
            remaining_split_nuclides: remaining_split,
            normalized_nuclides: RE_NUCLIDE_NORMALIZED.find_iter(normalized).count(),
            nuclides_repaired: original_split.saturating_sub(remaining_split),
            text_changed: original != normalized,
        }
    }
}

/// Normalize with both passes enabled.
pub fn normalize_latex(text: &str) -> String {
    LatexNormalizer::default().normalize(text)
}

fn merge_split_nuclides(text: &str) -> String {
    RE_NUCLIDE_SPLIT
        .replace_all(text, |caps: &Captures| {
            format!(
                "^{{{}{}}}_{{{}{}}}{}",
                &caps[1], &caps[3], &caps[2], &caps[4], &caps[5]
            )
        })
        .into_owned()
}

fn wrap_nuclide_elements(text: &str) -> String {
    RE_NUCLIDE_NORMALIZED
        .replace_all(text, |caps: &Captures| {
            if caps.get(3).is_some() {
                caps[0].to_string()
            } else {
                format!("^{{{}}}_{{{}}}\\mathrm{{{}}}", &caps[1], &caps[2], &caps[4])
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_concatenates_digits() {
        let n = LatexNormalizer::new();
        assert_eq!(n.normalize("^{3}_{1}^{5}_{7}Cl"), r"^{35}_{17}\mathrm{Cl}");
        assert_eq!(n.normalize("^{3}_{1}^{9}_{9}K"), r"^{39}_{19}\mathrm{K}");
        assert_eq!(n.normalize("^{2}_{9}^{38}_{2}U"), r"^{238}_{92}\mathrm{U}");
    }

    #[test]
    fn test_merge_inside_text() {
        let n = LatexNormalizer::new();
        assert_eq!(
            n.normalize("Multiple: ^{3}_{1}^{5}_{7}Cl and ^{3}_{1}^{9}_{9}K"),
            r"Multiple: ^{35}_{17}\mathrm{Cl} and ^{39}_{19}\mathrm{K}"
        );
    }

    #[test]
    fn test_idempotent() {
        let n = LatexNormalizer::new();
        for input in [
            "^{3}_{1}^{5}_{7}Cl",
            r"^{14}_{6}C decays",
            "H_{2}O + CO_{2}",
            r"^{35}_{17}\mathrm{Cl}",
            "",
        ] {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "{input}");
        }
    }

    #[test]
    fn test_ordinary_formulas_untouched() {
        assert_eq!(normalize_latex("H_{2}SO_{4} and Ca^{2+}"), "H_{2}SO_{4} and Ca^{2+}");
    }

    #[test]
    fn test_passes_can_be_disabled() {
        let merge_only = LatexNormalizer {
            wrap_elements: false,
            ..Default::default()
        };
        assert_eq!(merge_only.normalize("^{3}_{1}^{5}_{7}Cl"), "^{35}_{17}Cl");

        let wrap_only = LatexNormalizer {
            normalize_nuclides: false,
            ..Default::default()
        };
        assert_eq!(wrap_only.normalize("^{14}_{6}C"), r"^{14}_{6}\mathrm{C}");
    }

    #[test]
    fn test_statistics() {
        let n = LatexNormalizer::new();
        let original = "^{3}_{1}^{5}_{7}Cl and ^{3}_{1}^{9}_{9}K";
        let normalized = n.normalize(original);
        let stats = n.statistics(original, &normalized);
        assert_eq!(stats.original_split_nuclides, 2);
        assert_eq!(stats.remaining_split_nuclides, 0);
        assert_eq!(stats.nuclides_repaired, 2);
        assert_eq!(stats.normalized_nuclides, 2);
        assert!(stats.text_changed);
    }

    #[test]
    fn test_batch() {
        let out = LatexNormalizer::new().normalize_batch(&["^{3}_{1}^{5}_{7}Cl", "plain"]);
        assert_eq!(out, vec![r"^{35}_{17}\mathrm{Cl}".to_string(), "plain".to_string()]);
    }
}
