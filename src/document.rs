//! Access to an extracted document.
//!
//! The reconstruction core never parses PDF bytes. It reads pages through the
//! [`DocumentSource`] trait, which hands out each page's character stream,
//! its vector line segments and its size, all in PDF points with a top-left
//! origin.
//!
//! [`DocumentDump`] is the bundled implementation: a JSON file holding the
//! per-page records a pdfplumber-style extractor produces.
//!
//! ```text
//! {
//!   "pages": [
//!     {
//!       "width": 595.0, "height": 842.0,
//!       "chars": [{"text": "H", "x0": 72.0, "top": 100.0, "x1": 79.0, "bottom": 110.0, "size": 10.0}],
//!       "lines": [{"x0": 120.0, "y0": 105.0, "x1": 135.0, "y1": 105.0}]
//!     }
//!   ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::extractors::LineSegment;
use crate::layout::{extract_words, TextChar, Word, WordConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Page size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
}

impl PageDimensions {
    /// Create page dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A document whose pages can be read by zero-based index.
///
/// One value is borrowed for the whole of a pipeline pass (noise detection
/// and reconstruction) and must not be shared between documents.
pub trait DocumentSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Size of a page.
    fn page_dimensions(&self, page_index: usize) -> Result<PageDimensions>;

    /// Raw character stream of a page, in extraction order.
    fn chars(&self, page_index: usize) -> Result<Vec<TextChar>>;

    /// Straight line primitives drawn on a page.
    fn line_segments(&self, page_index: usize) -> Result<Vec<LineSegment>>;

    /// Words of a page, assembled from its characters by default.
    fn words(&self, page_index: usize) -> Result<Vec<Word>> {
        Ok(extract_words(&self.chars(page_index)?, WordConfig::default()))
    }
}

/// One page of a [`DocumentDump`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDump {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Character stream
    #[serde(default)]
    pub chars: Vec<TextChar>,
    /// Line primitives
    #[serde(default)]
    pub lines: Vec<LineSegment>,
}

/// In-memory document loaded from a JSON page dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentDump {
    /// Pages in document order
    pub pages: Vec<PageDump>,
}

impl DocumentDump {
    /// Create a document from pages.
    pub fn new(pages: Vec<PageDump>) -> Self {
        Self { pages }
    }

    /// Open a JSON page dump.
    ///
    /// Failing to open or parse the file is fatal for the document.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dump: DocumentDump = serde_json::from_reader(BufReader::new(file))?;
        dump.validate()?;
        log::debug!("Opened {} with {} pages", path.display(), dump.pages.len());
        Ok(dump)
    }

    /// Parse a JSON page dump from a string.
    pub fn from_json(json: &str) -> Result<Self> {
        let dump: DocumentDump = serde_json::from_str(json)?;
        dump.validate()?;
        Ok(dump)
    }

    fn validate(&self) -> Result<()> {
        for (i, page) in self.pages.iter().enumerate() {
            let ok = page.width.is_finite() && page.height.is_finite() && page.width > 0.0 && page.height > 0.0;
            if !ok {
                return Err(Error::InvalidDocument(format!(
                    "page {} has invalid dimensions {}x{}",
                    i + 1,
                    page.width,
                    page.height
                )));
            }
        }
        Ok(())
    }

    fn page(&self, page_index: usize) -> Result<&PageDump> {
        self.pages.get(page_index).ok_or(Error::PageOutOfRange {
            page: page_index,
            page_count: self.pages.len(),
        })
    }
}

impl DocumentSource for DocumentDump {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_dimensions(&self, page_index: usize) -> Result<PageDimensions> {
        let page = self.page(page_index)?;
        Ok(PageDimensions::new(page.width, page.height))
    }

    fn chars(&self, page_index: usize) -> Result<Vec<TextChar>> {
        Ok(self.page(page_index)?.chars.clone())
    }

    fn line_segments(&self, page_index: usize) -> Result<Vec<LineSegment>> {
        Ok(self.page(page_index)?.lines.clone())
    }
}
