//! Text reconstruction from a page's character stream.
//!
//! - [`FormulaReconstructor`]: LaTeX-marked text with sub/superscript groups
//!   and reaction arrows
//! - [`reconstruct_plain`]: reading-order text without script semantics

pub mod formula;
pub mod plain;

pub use formula::{CharClass, FormulaReconstructor, ReconstructionConfig};
pub use plain::{reconstruct_plain, PlainTextConfig};
