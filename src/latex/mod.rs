//! Post-processing of LaTeX-marked text.
//!
//! - [`normalizer`]: nuclide notation repair
//! - [`formulas`]: formula extraction, categorization and Unicode rendering

pub mod formulas;
pub mod normalizer;

// Re-export main types
pub use formulas::{categorize_formulas, extract_formulas, latex_to_unicode, FormulaCategories};
pub use normalizer::{normalize_latex, LatexNormalizer, NormalizerStats};
