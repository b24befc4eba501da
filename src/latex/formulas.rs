//! Formula extraction from LaTeX-marked text.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref FORMULA_PATTERNS: Vec<Regex> = vec![
        // Subscripted element: H_{2}
        Regex::new(r"[A-Z][a-z]?(?:_\{[^}]+\})+").unwrap(),
        // Superscripted element: Fe^{3+}
        Regex::new(r"[A-Z][a-z]?(?:\^\{[^}]+\})+").unwrap(),
        // Parenthesised group: Ca(OH)_{2}
        Regex::new(
            r"[A-Z][a-z]?(?:_\{[^}]+\}|\^\{[^}]+\})*\([^)]+\)(?:_\{[^}]+\}|\^\{[^}]+\})*"
        )
        .unwrap(),
        // Runs of two or more elements: H_{2}SO_{4}
        Regex::new(r"(?:[A-Z][a-z]?(?:_\{[^}]+\}|\^\{[^}]+\})*){2,}").unwrap(),
        // Nuclide prefix: ^{14}_{6}C
        Regex::new(r"\^\{[^}]+\}_\{[^}]+\}[A-Z][a-z]?").unwrap(),
    ];
    static ref RE_ISOTOPE: Regex = Regex::new(r"\^\{[^}]+\}_\{[^}]+\}[A-Z]").unwrap();
    static ref RE_ION: Regex = Regex::new(r"\^\{[^}]*[+-][^}]*\}").unwrap();
    static ref RE_COMPOUND: Regex = Regex::new(r"[A-Z][a-z]?_\{[^}]+\}").unwrap();
    static ref RE_SUBSCRIPT_GROUP: Regex = Regex::new(r"_\{([^}]+)\}").unwrap();
    static ref RE_SUPERSCRIPT_GROUP: Regex = Regex::new(r"\^\{([^}]+)\}").unwrap();
}

/// Formulas grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaCategories {
    /// Subscripted formulas without charge
    pub compounds: Vec<String>,
    /// Formulas carrying a charge superscript
    pub ions: Vec<String>,
    /// Nuclides with mass and atomic number
    pub isotopes: Vec<String>,
    /// Everything else
    pub other: Vec<String>,
}

impl FormulaCategories {
    /// Total number of categorized formulas.
    pub fn total(&self) -> usize {
        self.compounds.len() + self.ions.len() + self.isotopes.len() + self.other.len()
    }
}

/// Collect chemical formulas from reconstructed text.
///
/// Matches are deduplicated in first-seen order and single-character matches
/// are dropped.
///
/// # Examples
///
/// ```
/// use exam_chemtext::latex::extract_formulas;
///
/// let found = extract_formulas("CO_{2} -> H_{2}O");
/// assert!(found.contains(&"CO_{2}".to_string()));
/// ```
pub fn extract_formulas(text: &str) -> Vec<String> {
    let mut formulas: Vec<String> = Vec::new();
    for pattern in FORMULA_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let found = m.as_str();
            if found.chars().count() > 1 && !formulas.iter().any(|f| f == found) {
                formulas.push(found.to_string());
            }
        }
    }
    formulas
}

/// Sort formulas into isotopes, ions, compounds and other, checked in that
/// order.
pub fn categorize_formulas<S: AsRef<str>>(formulas: &[S]) -> FormulaCategories {
    let mut categories = FormulaCategories::default();
    for formula in formulas {
        let formula = formula.as_ref();
        let bucket = if RE_ISOTOPE.is_match(formula) {
            &mut categories.isotopes
        } else if RE_ION.is_match(formula) {
            &mut categories.ions
        } else if RE_COMPOUND.is_match(formula) {
            &mut categories.compounds
        } else {
            &mut categories.other
        };
        bucket.push(formula.to_string());
    }
    categories
}

/// Render script groups with Unicode sub/superscript characters.
///
/// Characters without a script form are kept as they are.
///
/// # Examples
///
/// ```
/// use exam_chemtext::latex::latex_to_unicode;
///
/// assert_eq!(latex_to_unicode("H_{2}O"), "H₂O");
/// assert_eq!(latex_to_unicode("Ca^{2+}"), "Ca²⁺");
/// ```
pub fn latex_to_unicode(text: &str) -> String {
    let text = RE_SUBSCRIPT_GROUP.replace_all(text, |caps: &Captures| {
        caps[1].chars().map(subscript_char).collect::<String>()
    });
    RE_SUPERSCRIPT_GROUP
        .replace_all(&text, |caps: &Captures| {
            caps[1].chars().map(superscript_char).collect::<String>()
        })
        .into_owned()
}

fn subscript_char(c: char) -> char {
    match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        other => other,
    }
}

fn superscript_char(c: char) -> char {
    match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        other => other,
    }
}
