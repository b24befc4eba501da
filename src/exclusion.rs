//! Figure and table exclusion zones.
//!
//! Figure and table detectors run upstream and report their findings as a
//! flat list of [`ExtractionElement`]s. This module turns them into per-page
//! rectangles in PDF points (top-left origin) and removes the characters
//! that fall inside them, so figure labels and table cells do not leak into
//! the body text.
//!
//! Element boxes arrive in one of two shapes:
//! - `{"x", "y", "width", "height"}`: pixels of the rasterized page, converted
//!   with the DPI the detector rendered at
//! - `[x0, y0, x1, y1]`: PDF points, in the configured [`CoordinateOrigin`]
//!
//! The DPI is a contract with the producing stage: a mismatch shifts and
//! scales every zone without any visible error.

use crate::document::DocumentSource;
use crate::error::{Error, Result};
use crate::geometry::{pixel_to_pdf, CoordinateOrigin, Rect};
use crate::layout::TextChar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Kind of region an element covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    /// Figure, diagram or chart
    Figure,
    /// Table
    Table,
    /// Anything else
    #[default]
    #[serde(other)]
    Unknown,
}

/// Detector that produced an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSource {
    /// Cropped from a "Fig. N" caption; boxes are tight
    Caption,
    /// Found by raster contour detection; boxes carry padding
    Visual,
    /// Glyph clustering over vector content
    GlyphClustering,
    /// pdfplumber table finder
    Pdfplumber,
    /// pdfplumber table finder, confirmed by a second detector
    PdfplumberVerified,
    /// Unrecognized source
    #[default]
    #[serde(other)]
    Other,
}

/// Bounding box of an element as supplied by a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementBBox {
    // Arrays must be tried first: a struct variant also accepts a sequence.
    /// `[x0, y0, x1, y1]` in PDF points
    Points(Vec<f32>),
    /// Pixel box at the detector's DPI
    Pixels {
        /// Left edge
        #[serde(default)]
        x: f32,
        /// Top edge
        #[serde(default)]
        y: f32,
        /// Width
        #[serde(default)]
        width: f32,
        /// Height
        #[serde(default)]
        height: f32,
    },
}

/// One detected figure or table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionElement {
    /// 1-based page number
    pub page: usize,
    /// Figure, table or unknown
    #[serde(rename = "type", default)]
    pub element_type: ZoneType,
    /// Box in pixels or points
    pub bbox: ElementBBox,
    /// Producing detector
    #[serde(default)]
    pub source: ZoneSource,
    /// Image file the element was saved to
    #[serde(default)]
    pub filename: String,
}

/// Element metadata file written by the figure/table stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMetadata {
    /// Detected elements
    #[serde(default)]
    pub elements: Vec<ExtractionElement>,
}

impl ElementMetadata {
    /// Load `{"elements": [...]}` from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// A rectangle whose characters are excluded from body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    /// Zone in PDF points, top-left origin
    pub bbox: Rect,
    /// Element kind
    pub zone_type: ZoneType,
    /// Producing detector
    pub source: ZoneSource,
    /// Image file of the element
    pub filename: String,
}

/// Zones of a document keyed by 1-based page number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZones {
    pages: BTreeMap<usize, Vec<ExclusionZone>>,
}

impl ExclusionZones {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone to a page.
    pub fn insert(&mut self, page: usize, zone: ExclusionZone) {
        self.pages.entry(page).or_default().push(zone);
    }

    /// Zones of a 1-based page (empty when it has none).
    pub fn for_page(&self, page: usize) -> &[ExclusionZone] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of zones across all pages.
    pub fn total(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    /// Number of pages with at least one zone.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether there are no zones.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate `(page, zones)` in page order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[ExclusionZone])> {
        self.pages.iter().map(|(p, z)| (*p, z.as_slice()))
    }

    /// A copy restricted to zones of the given types.
    pub fn with_types(&self, types: &[ZoneType]) -> ExclusionZones {
        let mut out = ExclusionZones::new();
        for (page, zones) in self.iter() {
            for zone in zones.iter().filter(|z| types.contains(&z.zone_type)) {
                out.insert(page, zone.clone());
            }
        }
        out
    }
}

/// Builds [`ExclusionZones`] from detector output.
#[derive(Debug, Clone)]
pub struct ExclusionZoneBuilder {
    dpi: f32,
    origin: CoordinateOrigin,
    zone_types: Vec<ZoneType>,
}

impl Default for ExclusionZoneBuilder {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            origin: CoordinateOrigin::TopLeft,
            zone_types: vec![ZoneType::Figure, ZoneType::Table],
        }
    }
}

impl ExclusionZoneBuilder {
    /// Create a builder for elements rendered at `dpi`.
    pub fn new(dpi: f32) -> Self {
        Self {
            dpi,
            ..Default::default()
        }
    }

    /// Origin convention of point (array) boxes.
    pub fn with_origin(mut self, origin: CoordinateOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Element types that become zones.
    pub fn with_zone_types(mut self, types: Vec<ZoneType>) -> Self {
        self.zone_types = types;
        self
    }

    /// Convert elements into per-page zones.
    ///
    /// Elements on page 0 or beyond the last page are skipped. Elements
    /// whose type is not selected are skipped.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidBBox`] when an array box does not hold exactly four
    /// finite numbers, and any error of the document while reading page
    /// sizes.
    pub fn build(
        &self,
        elements: &[ExtractionElement],
        doc: &dyn DocumentSource,
    ) -> Result<ExclusionZones> {
        let page_count = doc.page_count();
        let mut zones = ExclusionZones::new();

        for element in elements {
            if element.page == 0 || element.page > page_count {
                log::debug!(
                    "Skipping {:?} element {:?} on page {} (document has {} pages)",
                    element.element_type,
                    element.filename,
                    element.page,
                    page_count
                );
                continue;
            }
            if !self.zone_types.contains(&element.element_type) {
                continue;
            }

            let bbox = match &element.bbox {
                ElementBBox::Pixels { x, y, width, height } => {
                    pixel_to_pdf(Rect::new(*x, *y, *width, *height), self.dpi)
                },
                ElementBBox::Points(coords) => {
                    let rect = Rect::from_slice(coords)?;
                    let dims = doc.page_dimensions(element.page - 1)?;
                    self.origin.to_top_left(rect, dims.height)
                },
            };

            zones.insert(
                element.page,
                ExclusionZone {
                    bbox,
                    zone_type: element.element_type,
                    source: element.source,
                    filename: element.filename.clone(),
                },
            );
        }

        log::info!(
            "Created {} exclusion zones across {} pages",
            zones.total(),
            zones.page_count()
        );
        for (page, page_zones) in zones.iter() {
            log::debug!("  Page {}: {} exclusion zone(s)", page, page_zones.len());
        }

        Ok(zones)
    }
}

/// Inward shrink applied to figure zones before filtering, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingConfig {
    /// Shrink of caption-derived figure boxes
    pub caption_figure_padding: f32,
    /// Shrink of figure boxes from every other detector, which keeps labels
    /// the detector captured inside its padding
    pub visual_figure_padding: f32,
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self {
            caption_figure_padding: 0.0,
            visual_figure_padding: 20.0,
        }
    }
}

impl PaddingConfig {
    /// Shrink amount for a zone. Tables and unknown zones are never shrunk.
    pub fn padding_for(&self, zone: &ExclusionZone) -> f32 {
        match (zone.zone_type, zone.source) {
            (ZoneType::Figure, ZoneSource::Caption) => self.caption_figure_padding,
            (ZoneType::Figure, _) => self.visual_figure_padding,
            _ => 0.0,
        }
    }

    /// The rectangle actually used for filtering.
    pub fn effective_bbox(&self, zone: &ExclusionZone) -> Rect {
        let padding = self.padding_for(zone);
        if padding > 0.0 {
            zone.bbox.shrink(padding)
        } else {
            zone.bbox
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("caption_figure_padding", self.caption_figure_padding),
            ("visual_figure_padding", self.visual_figure_padding),
        ] {
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

/// Whether a character falls inside a (padded) zone rectangle.
///
/// Boxes overlap only with positive intersection area. A character without
/// area (zero-width glyphs) is tested by its center point instead.
pub fn char_in_zone(c: &TextChar, zone_bbox: &Rect) -> bool {
    if zone_bbox.is_degenerate() {
        return false;
    }
    if c.bbox.is_degenerate() {
        zone_bbox.contains_point(&c.bbox.center())
    } else {
        c.bbox.overlaps(zone_bbox)
    }
}

/// Remove the characters that fall inside any zone.
///
/// # Examples
///
/// ```
/// use exam_chemtext::exclusion::{filter_chars, ExclusionZone, PaddingConfig, ZoneSource, ZoneType};
/// use exam_chemtext::geometry::Rect;
/// use exam_chemtext::layout::TextChar;
///
/// let table = ExclusionZone {
///     bbox: Rect::from_points(50.0, 200.0, 300.0, 400.0),
///     zone_type: ZoneType::Table,
///     source: ZoneSource::Pdfplumber,
///     filename: String::new(),
/// };
/// let chars = vec![
///     TextChar::new("a", 60.0, 250.0, 65.0, 260.0, 10.0),
///     TextChar::new("b", 60.0, 500.0, 65.0, 510.0, 10.0),
/// ];
/// let kept = filter_chars(chars, &[table], &PaddingConfig::default());
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].text, "b");
/// ```
pub fn filter_chars(
    chars: Vec<TextChar>,
    zones: &[ExclusionZone],
    padding: &PaddingConfig,
) -> Vec<TextChar> {
    if zones.is_empty() {
        return chars;
    }
    let rects: Vec<Rect> = zones.iter().map(|z| padding.effective_bbox(z)).collect();
    chars
        .into_iter()
        .filter(|c| !rects.iter().any(|r| char_in_zone(c, r)))
        .collect()
}
