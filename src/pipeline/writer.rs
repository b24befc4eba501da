//! Output files of a pipeline run.
//!
//! The cleaned files are read by the downstream question extractor, which
//! splits pages on the exact separator returned by
//! [`cleaned_page_separator`]. Do not change its format.

use crate::error::Result;
use crate::pipeline::{DocumentResult, ReconstructedPage};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 80;

/// Page separator of the cleaned text files.
///
/// # Examples
///
/// ```
/// use exam_chemtext::pipeline::cleaned_page_separator;
///
/// assert_eq!(
///     cleaned_page_separator(3),
///     "==================== CLEANED PAGE 3 ===================="
/// );
/// ```
pub fn cleaned_page_separator(page: usize) -> String {
    format!("==================== CLEANED PAGE {} ====================", page)
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// LaTeX text of every page with a per-page header of zone and character counts.
pub fn format_full_latex(pages: &[ReconstructedPage]) -> String {
    let rule = rule();
    let mut out = String::new();
    let _ = write!(out, "{rule}\nEXTRACTED TEXT (LaTeX Format, Filtered)\n{rule}\n\n");
    for page in pages {
        let _ = write!(
            out,
            "\n{rule}\nPAGE {}\nExclusion zones: {}\nCharacters: {} / {}\n{rule}\n\n{}\n\n",
            page.page,
            page.exclusion_zone_count,
            page.filtered_char_count,
            page.total_char_count,
            page.formatted_text
        );
    }
    out
}

/// Plain text of every page under a `PAGE N` header.
pub fn format_plain(pages: &[ReconstructedPage]) -> String {
    let rule = rule();
    let mut out = String::new();
    for page in pages {
        let _ = write!(out, "\n{rule}\nPAGE {}\n{rule}\n\n{}\n\n", page.page, page.plain_text);
    }
    out
}

/// Pages joined with the cleaned separator.
///
/// `latex` selects the LaTeX text instead of the plain text.
pub fn format_cleaned(pages: &[ReconstructedPage], latex: bool) -> String {
    let mut out = String::new();
    for page in pages {
        let text = if latex { &page.formatted_text } else { &page.plain_text };
        let _ = write!(out, "{}\n\n{}\n\n", cleaned_page_separator(page.page), text);
    }
    out
}

/// Per-page entry of the metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// 1-based page number
    pub page: usize,
    /// Exclusion zones on the page
    pub exclusion_zones: usize,
    /// Characters before filtering
    pub total_chars: usize,
    /// Characters after filtering
    pub filtered_chars: usize,
    /// Fraction of characters removed (0 for an empty page)
    pub filter_ratio: f64,
}

/// Content of the metadata file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMetadata {
    /// Number of reconstructed pages
    pub total_pages: usize,
    /// Per-page counts
    pub pages: Vec<PageMetadata>,
}

impl TextMetadata {
    /// Collect the counts of reconstructed pages.
    pub fn from_pages(pages: &[ReconstructedPage]) -> Self {
        Self {
            total_pages: pages.len(),
            pages: pages
                .iter()
                .map(|p| PageMetadata {
                    page: p.page,
                    exclusion_zones: p.exclusion_zone_count,
                    total_chars: p.total_char_count,
                    filtered_chars: p.filtered_char_count,
                    filter_ratio: if p.total_char_count > 0 {
                        1.0 - p.filtered_char_count as f64 / p.total_char_count as f64
                    } else {
                        0.0
                    },
                })
                .collect(),
        }
    }
}

/// Paths of the files written for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// `<stem>_full_latex.txt`
    pub full_latex: PathBuf,
    /// `<stem>_plain.txt`
    pub plain: PathBuf,
    /// `<stem>_text_metadata.json`
    pub metadata: PathBuf,
    /// `<stem>_cleaned_plain.txt`
    pub cleaned_plain: PathBuf,
    /// `<stem>_cleaned_latex.txt`
    pub cleaned_latex: PathBuf,
    /// `<stem>_statistics.json`
    pub statistics: PathBuf,
}

impl OutputFiles {
    /// File names for a document stem inside `dir`.
    pub fn new(dir: &Path, stem: &str) -> Self {
        let path = |suffix: &str| dir.join(format!("{}_{}", stem, suffix));
        Self {
            full_latex: path("full_latex.txt"),
            plain: path("plain.txt"),
            metadata: path("text_metadata.json"),
            cleaned_plain: path("cleaned_plain.txt"),
            cleaned_latex: path("cleaned_latex.txt"),
            statistics: path("statistics.json"),
        }
    }
}

/// Writes the text and JSON files of a [`DocumentResult`].
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    /// Create a writer targeting `output_dir`. The directory is created on
    /// first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every output file for a document.
    ///
    /// # Errors
    ///
    /// IO errors from creating the directory or writing a file.
    pub fn write(&self, stem: &str, result: &DocumentResult) -> Result<OutputFiles> {
        fs::create_dir_all(&self.output_dir)?;
        let files = OutputFiles::new(&self.output_dir, stem);
        let pages = &result.pages;

        fs::write(&files.full_latex, format_full_latex(pages))?;
        log::info!("Saved formatted text: {}", files.full_latex.display());

        fs::write(&files.plain, format_plain(pages))?;
        log::info!("Saved plain text: {}", files.plain.display());

        let metadata = serde_json::to_string_pretty(&TextMetadata::from_pages(pages))?;
        fs::write(&files.metadata, metadata)?;
        log::info!("Saved text metadata: {}", files.metadata.display());

        fs::write(&files.cleaned_plain, format_cleaned(pages, false))?;
        fs::write(&files.cleaned_latex, format_cleaned(pages, true))?;
        log::info!(
            "Saved cleaned text for question extraction: {}, {}",
            files.cleaned_plain.display(),
            files.cleaned_latex.display()
        );

        let statistics = serde_json::to_string_pretty(&result.statistics)?;
        fs::write(&files.statistics, statistics)?;
        log::debug!("Saved statistics: {}", files.statistics.display());

        Ok(files)
    }
}
