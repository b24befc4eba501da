//! Document extraction pipeline.
//!
//! ```text
//! DocumentSource
//!     ↓
//! [NoiseDetector] (sampled pages → NoiseZones)      once per document
//! [ExclusionZoneBuilder] (elements → zones)         once per document
//!     ↓
//! per page:
//!   chars → [CharacterFilter] → [filter_chars] → PageBaseline
//!   line segments → [ArrowExtractor] → arrows
//!   [FormulaReconstructor] → [LatexNormalizer] → [RegexNoiseFilter]
//!     ↓
//! DocumentResult (pages in page order + DocumentStatistics)
//! ```
//!
//! Page-level failures never abort the document. A page whose characters
//! cannot be read becomes an empty page; a page whose formula reconstruction
//! fails keeps its plain text. The taken path is recorded in
//! [`PageOutcome`].

pub mod config;
pub mod stats;
pub mod writer;

// Re-export main types
pub use config::PipelineConfig;
pub use stats::{document_formulas, DocumentStatistics, FormulaCounts};
pub use writer::{
    cleaned_page_separator, format_cleaned, format_full_latex, format_plain, OutputFiles,
    OutputWriter, PageMetadata, TextMetadata,
};

use crate::document::DocumentSource;
use crate::error::Result;
use crate::exclusion::{filter_chars, ExclusionZoneBuilder, ExclusionZones, ExtractionElement};
use crate::extractors::{Arrow, ArrowExtractor};
use crate::latex::LatexNormalizer;
use crate::layout::PageBaseline;
use crate::noise::{
    CharacterFilter, NoiseDetector, NoiseFilter, NoiseZones, PassThroughFilter, RegexNoiseFilter,
};
use crate::reconstruct::{reconstruct_plain, FormulaReconstructor};
use serde::{Deserialize, Serialize};

/// How a page's text was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    /// LaTeX-marked reconstruction succeeded
    #[default]
    Enhanced,
    /// Formula reconstruction failed; `formatted_text` holds plain text
    PlainFallback {
        /// Error that caused the fallback
        reason: String,
    },
    /// The page's characters could not be read; both texts are empty
    ReadFailed {
        /// Error reported by the document
        reason: String,
    },
}

impl PageOutcome {
    /// Whether the LaTeX reconstruction was used.
    pub fn is_enhanced(&self) -> bool {
        matches!(self, PageOutcome::Enhanced)
    }
}

/// Text and counts of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedPage {
    /// 1-based page number
    pub page: usize,
    /// Text without sub/superscript markup
    pub plain_text: String,
    /// LaTeX-marked text
    pub formatted_text: String,
    /// Page baseline size of the filtered characters
    pub baseline_size: f32,
    /// Page baseline `top` of the filtered characters
    pub baseline_top: f32,
    /// Characters left after noise and exclusion filtering
    pub filtered_char_count: usize,
    /// Characters read from the page
    pub total_char_count: usize,
    /// Exclusion zones on this page
    pub exclusion_zone_count: usize,
    /// Path taken to produce the text
    pub outcome: PageOutcome,
}

/// Everything a pipeline run produced for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Pages in page order
    pub pages: Vec<ReconstructedPage>,
    /// Aggregated counts
    pub statistics: DocumentStatistics,
    /// Detected noise zones, `None` when noise removal was off or failed
    pub noise_zones: Option<NoiseZones>,
    /// Exclusion zones by page
    pub exclusion_zones: ExclusionZones,
}

impl DocumentResult {
    /// Result of a 1-based page, if it was processed.
    pub fn page(&self, page: usize) -> Option<&ReconstructedPage> {
        self.pages.iter().find(|p| p.page == page)
    }

    /// Distinct formulas of the document in order of first appearance.
    pub fn formulas(&self) -> Vec<String> {
        document_formulas(&self.pages)
    }
}

/// The extraction pipeline.
///
/// Holds only configuration and stateless stage objects, so one pipeline
/// can process any number of documents.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    config: PipelineConfig,
    reconstructor: FormulaReconstructor,
    arrow_extractor: ArrowExtractor,
    normalizer: LatexNormalizer,
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl ExtractionPipeline {
    /// Create a pipeline.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            reconstructor: FormulaReconstructor::with_config(config.reconstruction),
            arrow_extractor: ArrowExtractor::with_config(config.arrows),
            normalizer: config.latex,
            config,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process a document.
    ///
    /// # Arguments
    ///
    /// * `doc` - The open document, borrowed for the whole run
    /// * `elements` - Figure and table boxes from the element detectors
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidConfig`] for an invalid configuration and
    /// [`crate::Error::InvalidBBox`] for a malformed element box. Failures
    /// on single pages are downgraded and recorded in [`PageOutcome`].
    pub fn process(
        &self,
        doc: &dyn DocumentSource,
        elements: &[ExtractionElement],
    ) -> Result<DocumentResult> {
        self.config.validate()?;
        let page_count = doc.page_count();
        log::info!("Processing document with {} pages", page_count);

        let noise_zones = self.detect_noise(doc);
        let noise_filter: Box<dyn CharacterFilter> = match &noise_zones {
            Some(zones) => Box::new(NoiseFilter::new(zones.clone())),
            None => Box::new(PassThroughFilter),
        };
        let regex_filter = self
            .config
            .enable_noise_removal
            .then(|| RegexNoiseFilter::new(self.config.regex_filter.clone()));
        log::debug!(
            "Character filter: {}, line filter: {}",
            noise_filter.name(),
            if regex_filter.is_some() { "enabled" } else { "disabled" }
        );

        let exclusion_zones = ExclusionZoneBuilder::new(self.config.dpi)
            .with_origin(self.config.coordinate_origin)
            .with_zone_types(self.config.zone_types.clone())
            .build(elements, doc)?;

        let first = usize::from(self.config.skip_first_page);
        if first == 1 && page_count > 0 {
            log::info!("Skipping page 1");
        }

        let pages: Vec<ReconstructedPage> = (first..page_count)
            .map(|page_index| {
                self.process_page(
                    doc,
                    page_index,
                    noise_filter.as_ref(),
                    &exclusion_zones,
                    regex_filter.as_ref(),
                )
            })
            .collect();

        let statistics = DocumentStatistics::from_pages(&pages, exclusion_zones.total());
        log::info!(
            "Extracted text from {} pages ({} with text), {} of {} characters filtered ({:.1}%)",
            statistics.pages_processed,
            statistics.pages_with_text,
            statistics.chars_filtered,
            statistics.total_chars_before,
            statistics.filter_percentage
        );

        Ok(DocumentResult {
            pages,
            statistics,
            noise_zones,
            exclusion_zones,
        })
    }

    fn detect_noise(&self, doc: &dyn DocumentSource) -> Option<NoiseZones> {
        if !self.config.enable_noise_removal {
            log::info!("Noise removal disabled");
            return None;
        }
        match NoiseDetector::with_config(self.config.noise.clone()).detect(doc) {
            Ok(zones) => {
                let stats = zones.statistics();
                log::info!(
                    "Noise zones: {} header, {} footer, {} left margin, {} right margin",
                    stats.header_zones_count,
                    stats.footer_zones_count,
                    stats.left_margin_zones_count,
                    stats.right_margin_zones_count
                );
                Some(zones)
            },
            Err(e) => {
                log::warn!("Noise detection failed, continuing without it: {}", e);
                None
            },
        }
    }

    /// Reconstruct one page. Never fails; problems end up in the outcome.
    fn process_page(
        &self,
        doc: &dyn DocumentSource,
        page_index: usize,
        noise_filter: &dyn CharacterFilter,
        exclusion_zones: &ExclusionZones,
        regex_filter: Option<&RegexNoiseFilter>,
    ) -> ReconstructedPage {
        let page = page_index + 1;
        let zones = exclusion_zones.for_page(page);
        let defaults = PageBaseline::default();
        let mut result = ReconstructedPage {
            page,
            baseline_size: defaults.size,
            baseline_top: defaults.top,
            exclusion_zone_count: zones.len(),
            ..Default::default()
        };

        let chars = match doc.chars(page_index) {
            Ok(chars) => chars,
            Err(e) => {
                log::warn!("Page {}: could not read characters: {}", page, e);
                result.outcome = PageOutcome::ReadFailed {
                    reason: e.to_string(),
                };
                return result;
            },
        };
        result.total_char_count = chars.len();

        let chars = noise_filter.filter(chars);
        let chars = filter_chars(chars, zones, &self.config.padding);
        result.filtered_char_count = chars.len();
        log::debug!(
            "Page {}: {} of {} characters kept ({} exclusion zones)",
            page,
            chars.len(),
            result.total_char_count,
            zones.len()
        );
        if chars.is_empty() {
            return result;
        }

        let baseline = PageBaseline::from_chars(&chars);
        result.baseline_size = baseline.size;
        result.baseline_top = baseline.top;

        let arrows = match self.page_arrows(doc, page_index) {
            Ok(arrows) => arrows,
            Err(e) => {
                log::warn!("Page {}: arrow extraction failed: {}", page, e);
                Vec::new()
            },
        };

        let plain_text = reconstruct_plain(&chars, &self.config.plain);
        let formatted_text = match self.reconstructor.reconstruct(&chars, &baseline, &arrows) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Page {}: formula reconstruction failed, using plain text: {}", page, e);
                result.outcome = PageOutcome::PlainFallback {
                    reason: e.to_string(),
                };
                plain_text.clone()
            },
        };
        let formatted_text = self.normalizer.normalize(&formatted_text);

        match regex_filter {
            Some(filter) => {
                result.plain_text = filter.filter_text(&plain_text);
                result.formatted_text = filter.filter_text(&formatted_text);
            },
            None => {
                result.plain_text = plain_text;
                result.formatted_text = formatted_text;
            },
        }
        result
    }

    fn page_arrows(&self, doc: &dyn DocumentSource, page_index: usize) -> Result<Vec<Arrow>> {
        let dims = doc.page_dimensions(page_index)?;
        let segments = doc.line_segments(page_index)?;
        let arrows = self.arrow_extractor.extract(&segments, dims.height);
        if !arrows.is_empty() {
            log::debug!("Page {}: {} arrows", page_index + 1, arrows.len());
        }
        Ok(arrows)
    }
}
