//! Document-level statistics of a pipeline run.

use crate::latex::{categorize_formulas, extract_formulas, FormulaCategories};
use crate::pipeline::{PageOutcome, ReconstructedPage};
use serde::{Deserialize, Serialize};

/// Aggregated figures of one processed document.
///
/// Computed from the page-ordered result list, so the values do not depend
/// on the order pages finished in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    /// Pages that went through reconstruction
    pub pages_processed: usize,
    /// Pages with at least one character left after filtering
    pub pages_with_text: usize,
    /// Characters read, before any filtering
    pub total_chars_before: usize,
    /// Characters left after noise and exclusion filtering
    pub total_chars_after: usize,
    /// `total_chars_before - total_chars_after`
    pub chars_filtered: usize,
    /// `chars_filtered` as a percentage of `total_chars_before`
    pub filter_percentage: f64,
    /// Exclusion zones across the whole document
    pub exclusion_zones: usize,
    /// Pages reconstructed with LaTeX notation
    pub enhanced_pages: usize,
    /// Pages that fell back to plain text
    pub fallback_pages: usize,
    /// Pages whose characters could not be read
    pub failed_pages: usize,
    /// Formulas found in the LaTeX text, by category
    pub formulas: FormulaCounts,
}

/// Number of distinct formulas per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaCounts {
    /// Subscripted formulas
    pub compounds: usize,
    /// Charged species
    pub ions: usize,
    /// Nuclides
    pub isotopes: usize,
    /// Other formulas
    pub other: usize,
    /// Sum of the above
    pub total: usize,
}

impl From<&FormulaCategories> for FormulaCounts {
    fn from(categories: &FormulaCategories) -> Self {
        Self {
            compounds: categories.compounds.len(),
            ions: categories.ions.len(),
            isotopes: categories.isotopes.len(),
            other: categories.other.len(),
            total: categories.total(),
        }
    }
}

impl DocumentStatistics {
    /// Aggregate page results.
    ///
    /// # Arguments
    ///
    /// * `pages` - Reconstructed pages in page order
    /// * `exclusion_zones` - Total number of exclusion zones in the document
    pub fn from_pages(pages: &[ReconstructedPage], exclusion_zones: usize) -> Self {
        let total_chars_before: usize = pages.iter().map(|p| p.total_char_count).sum();
        let total_chars_after: usize = pages.iter().map(|p| p.filtered_char_count).sum();
        let chars_filtered = total_chars_before.saturating_sub(total_chars_after);
        let filter_percentage = if total_chars_before > 0 {
            chars_filtered as f64 / total_chars_before as f64 * 100.0
        } else {
            0.0
        };

        let mut stats = Self {
            pages_processed: pages.len(),
            pages_with_text: pages.iter().filter(|p| p.filtered_char_count > 0).count(),
            total_chars_before,
            total_chars_after,
            chars_filtered,
            filter_percentage,
            exclusion_zones,
            ..Default::default()
        };

        for page in pages {
            match page.outcome {
                PageOutcome::Enhanced => stats.enhanced_pages += 1,
                PageOutcome::PlainFallback { .. } => stats.fallback_pages += 1,
                PageOutcome::ReadFailed { .. } => stats.failed_pages += 1,
            }
        }

        let formulas = document_formulas(pages);
        stats.formulas = FormulaCounts::from(&categorize_formulas(&formulas));
        stats
    }
}

/// Distinct formulas of the whole document, in order of first appearance.
pub fn document_formulas(pages: &[ReconstructedPage]) -> Vec<String> {
    let mut formulas: Vec<String> = Vec::new();
    for page in pages {
        for formula in extract_formulas(&page.formatted_text) {
            if !formulas.contains(&formula) {
                formulas.push(formula);
            }
        }
    }
    formulas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, total: usize, filtered: usize, text: &str, outcome: PageOutcome) -> ReconstructedPage {
        ReconstructedPage {
            page: n,
            plain_text: String::new(),
            formatted_text: text.to_string(),
            total_char_count: total,
            filtered_char_count: filtered,
            outcome,
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_and_percentage() {
        let pages = vec![
            page(2, 100, 80, "H_{2}O", PageOutcome::Enhanced),
            page(3, 100, 0, "", PageOutcome::Enhanced),
            page(
                4,
                0,
                0,
                "",
                PageOutcome::ReadFailed {
                    reason: "broken".to_string(),
                },
            ),
        ];
        let stats = DocumentStatistics::from_pages(&pages, 4);
        assert_eq!(stats.pages_processed, 3);
        assert_eq!(stats.pages_with_text, 1);
        assert_eq!(stats.total_chars_before, 200);
        assert_eq!(stats.total_chars_after, 80);
        assert_eq!(stats.chars_filtered, 120);
        assert!((stats.filter_percentage - 60.0).abs() < 1e-9);
        assert_eq!(stats.exclusion_zones, 4);
        assert_eq!(stats.enhanced_pages, 2);
        assert_eq!(stats.failed_pages, 1);
    }

    #[test]
    fn test_empty_document() {
        let stats = DocumentStatistics::from_pages(&[], 0);
        assert_eq!(stats.pages_processed, 0);
        assert_eq!(stats.filter_percentage, 0.0);
        assert_eq!(stats.formulas.total, 0);
    }

    #[test]
    fn test_formulas_deduplicated_across_pages() {
        let pages = vec![
            page(1, 10, 10, "H_{2}O", PageOutcome::Enhanced),
            page(
                2,
                10,
                10,
                "H_{2}O and Fe^{3+}",
                PageOutcome::PlainFallback {
                    reason: "bad glyph".to_string(),
                },
            ),
        ];
        let formulas = document_formulas(&pages);
        assert_eq!(formulas.iter().filter(|f| *f == "H_{2}O").count(), 1);
        assert!(formulas.contains(&"Fe^{3+}".to_string()));

        let stats = DocumentStatistics::from_pages(&pages, 0);
        assert_eq!(stats.fallback_pages, 1);
        assert_eq!(stats.formulas.ions, 1);
        assert_eq!(stats.formulas.total, formulas.len());
    }
}
