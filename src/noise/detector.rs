//! Detection of recurring header, footer and margin text.
//!
//! A few sample pages are scanned for words sitting in the edge bands of the
//! page. Normalized texts that recur on enough samples become noise patterns,
//! and each band with a pattern gets one zone sized to just cover the
//! matching words found on the first pages of the document.

use crate::document::DocumentSource;
use crate::error::{Error, Result};
use crate::layout::Word;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref RE_DIGITS: Regex = Regex::new(r"\d+").unwrap();
}

/// Placeholder substituted for every digit run during normalization.
pub const NUMBER_PLACEHOLDER: &str = "[NUM]";

/// Thresholds of the noise detector, in PDF points (top-left origin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseDetectorConfig {
    /// Words with `top` above this are header candidates
    pub header_threshold: f32,
    /// Words with `top` below this are footer candidates
    pub footer_threshold: f32,
    /// Words with `x0` left of this are left-margin candidates
    pub left_margin_threshold: f32,
    /// Words with `x0` right of this are right-margin candidates
    pub right_margin_threshold: f32,
    /// Fraction of sampled pages a text must appear on
    pub min_frequency: f32,
    /// Maximum number of sampled pages
    pub sample_size: usize,
    /// Number of leading pages scanned for zone extents
    pub scan_pages: usize,
    /// Margin added around the measured extent
    pub zone_buffer: f32,
}

impl Default for NoiseDetectorConfig {
    fn default() -> Self {
        Self {
            header_threshold: 30.0,
            footer_threshold: 780.0,
            left_margin_threshold: 40.0,
            right_margin_threshold: 570.0,
            min_frequency: 0.5,
            sample_size: 5,
            scan_pages: 10,
            zone_buffer: 5.0,
        }
    }
}

impl NoiseDetectorConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_frequency) {
            return Err(Error::InvalidConfig(format!(
                "min_frequency must be within [0, 1], got {}",
                self.min_frequency
            )));
        }
        if self.sample_size == 0 {
            return Err(Error::InvalidConfig("sample_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Edge band of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseBand {
    /// Top of the page (Y range)
    Header,
    /// Bottom of the page (Y range)
    Footer,
    /// Left edge (X range)
    LeftMargin,
    /// Right edge (X range)
    RightMargin,
}

impl NoiseBand {
    /// All bands, in detection order.
    pub const ALL: [NoiseBand; 4] = [
        NoiseBand::Header,
        NoiseBand::Footer,
        NoiseBand::LeftMargin,
        NoiseBand::RightMargin,
    ];

    /// Whether the band constrains the vertical axis.
    pub fn is_vertical(&self) -> bool {
        matches!(self, NoiseBand::Header | NoiseBand::Footer)
    }
}

/// A half-open range `[min, max)` on one axis where text is noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseZone {
    /// Band the zone belongs to
    pub band: NoiseBand,
    /// Inclusive lower bound
    pub min: f32,
    /// Exclusive upper bound
    pub max: f32,
}

impl NoiseZone {
    /// Create a zone.
    pub fn new(band: NoiseBand, min: f32, max: f32) -> Self {
        Self { band, min, max }
    }

    /// Whether a coordinate on the zone's axis lies inside it.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }

    /// Extent along the zone's axis.
    pub fn span(&self) -> f32 {
        (self.max - self.min).max(0.0)
    }
}

/// Promoted patterns per band, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoisePatterns {
    /// Header patterns and their counts
    pub header: Vec<(String, usize)>,
    /// Footer patterns and their counts
    pub footer: Vec<(String, usize)>,
    /// Left-margin patterns and their counts
    pub left_margin: Vec<(String, usize)>,
    /// Right-margin patterns and their counts
    pub right_margin: Vec<(String, usize)>,
}

impl NoisePatterns {
    /// Patterns of one band.
    pub fn band(&self, band: NoiseBand) -> &[(String, usize)] {
        match band {
            NoiseBand::Header => &self.header,
            NoiseBand::Footer => &self.footer,
            NoiseBand::LeftMargin => &self.left_margin,
            NoiseBand::RightMargin => &self.right_margin,
        }
    }

    fn band_mut(&mut self, band: NoiseBand) -> &mut Vec<(String, usize)> {
        match band {
            NoiseBand::Header => &mut self.header,
            NoiseBand::Footer => &mut self.footer,
            NoiseBand::LeftMargin => &mut self.left_margin,
            NoiseBand::RightMargin => &mut self.right_margin,
        }
    }

    /// Whether no band has a pattern.
    pub fn is_empty(&self) -> bool {
        NoiseBand::ALL.iter().all(|b| self.band(*b).is_empty())
    }
}

/// Document-wide noise zones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseZones {
    /// Zones, at most one per band
    pub zones: Vec<NoiseZone>,
    /// Patterns the zones were derived from
    pub patterns: NoisePatterns,
    /// Width and height of the last sampled page
    pub page_dimensions: (f32, f32),
    /// Number of pages sampled
    pub sample_count: usize,
}

/// Summary of detected zones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseZoneStatistics {
    /// Number of header zones
    pub header_zones_count: usize,
    /// Number of footer zones
    pub footer_zones_count: usize,
    /// Number of left-margin zones
    pub left_margin_zones_count: usize,
    /// Number of right-margin zones
    pub right_margin_zones_count: usize,
    /// Sum of all zone counts
    pub total_zones: usize,
    /// Depth of the header zone from the top edge
    pub header_height: Option<f32>,
    /// Depth of the footer zone from the bottom edge
    pub footer_height: Option<f32>,
    /// Width of the left-margin zone
    pub left_margin_width: Option<f32>,
    /// Width of the right-margin zone
    pub right_margin_width: Option<f32>,
}

impl NoiseZones {
    /// Zones of one band.
    pub fn band(&self, band: NoiseBand) -> impl Iterator<Item = &NoiseZone> {
        self.zones.iter().filter(move |z| z.band == band)
    }

    /// Whether no zone was detected.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zone counts and band sizes.
    pub fn statistics(&self) -> NoiseZoneStatistics {
        let count = |band| self.band(band).count();
        let first = |band| self.band(band).next();
        let (width, height) = self.page_dimensions;

        let mut stats = NoiseZoneStatistics {
            header_zones_count: count(NoiseBand::Header),
            footer_zones_count: count(NoiseBand::Footer),
            left_margin_zones_count: count(NoiseBand::LeftMargin),
            right_margin_zones_count: count(NoiseBand::RightMargin),
            total_zones: self.zones.len(),
            ..Default::default()
        };
        stats.header_height = first(NoiseBand::Header).map(|z| z.max);
        stats.footer_height = first(NoiseBand::Footer).map(|z| height - z.min);
        stats.left_margin_width = first(NoiseBand::LeftMargin).map(|z| z.max);
        stats.right_margin_width = first(NoiseBand::RightMargin).map(|z| width - z.min);
        stats
    }
}

/// Detector of recurring edge text.
#[derive(Debug, Clone, Default)]
pub struct NoiseDetector {
    config: NoiseDetectorConfig,
}

impl NoiseDetector {
    /// Create a detector with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom thresholds.
    pub fn with_config(config: NoiseDetectorConfig) -> Self {
        Self { config }
    }

    /// Access the configuration.
    pub fn config(&self) -> &NoiseDetectorConfig {
        &self.config
    }

    /// Detect noise zones of a document.
    ///
    /// An empty document, or one without recurring edge text, yields an
    /// empty zone set.
    ///
    /// # Arguments
    ///
    /// * `doc` - Document to analyze
    ///
    /// # Returns
    ///
    /// The zones, the promoted patterns and the sampled page size.
    pub fn detect(&self, doc: &dyn DocumentSource) -> Result<NoiseZones> {
        self.config.validate()?;

        let total = doc.page_count();
        let samples = self.sample_indices(total);

        let mut counts: IndexMap<NoiseBand, IndexMap<String, usize>> =
            NoiseBand::ALL.iter().map(|b| (*b, IndexMap::new())).collect();
        let mut page_dimensions = (0.0, 0.0);

        for &idx in &samples {
            let dims = doc.page_dimensions(idx)?;
            page_dimensions = (dims.width, dims.height);

            for word in doc.words(idx)? {
                let bands = self.candidate_bands(&word);
                if bands.is_empty() {
                    continue;
                }
                let Some(normalized) = normalize_text(&word.text) else {
                    continue;
                };
                for band in bands {
                    if let Some(band_counts) = counts.get_mut(&band) {
                        *band_counts.entry(normalized.clone()).or_insert(0) += 1;
                    }
                }
            }
        }

        let min_occurrences = promotion_threshold(samples.len(), self.config.min_frequency);
        let mut patterns = NoisePatterns::default();
        for (band, band_counts) in counts {
            let mut promoted: Vec<(String, usize)> = band_counts
                .into_iter()
                .filter(|(_, count)| *count as f32 >= min_occurrences)
                .collect();
            // Stable: ties keep first-seen order.
            promoted.sort_by(|a, b| b.1.cmp(&a.1));
            *patterns.band_mut(band) = promoted;
        }

        let mut zones = Vec::new();
        for band in NoiseBand::ALL {
            if let Some(zone) = self.measure_zone(doc, band, patterns.band(band))? {
                log::debug!("Noise zone {:?}: [{:.1}, {:.1})", band, zone.min, zone.max);
                zones.push(zone);
            }
        }

        log::info!(
            "Noise detection sampled {} of {} pages: {} zones",
            samples.len(),
            total,
            zones.len()
        );

        Ok(NoiseZones {
            zones,
            patterns,
            page_dimensions,
            sample_count: samples.len(),
        })
    }

    /// Deterministic sample of page indices.
    ///
    /// All pages when the document is no longer than `sample_size`, else the
    /// first two, the middle and the last two pages.
    pub fn sample_indices(&self, total_pages: usize) -> Vec<usize> {
        if total_pages <= self.config.sample_size {
            return (0..total_pages).collect();
        }
        let mut indices = vec![
            0,
            1,
            total_pages / 2,
            total_pages - 2,
            total_pages - 1,
        ];
        indices.sort_unstable();
        indices.dedup();
        indices.truncate(self.config.sample_size);
        indices
    }

    fn candidate_bands(&self, word: &Word) -> Vec<NoiseBand> {
        let cfg = &self.config;
        let mut bands = Vec::new();
        if word.top < cfg.header_threshold {
            bands.push(NoiseBand::Header);
        }
        if word.top > cfg.footer_threshold {
            bands.push(NoiseBand::Footer);
        }
        if word.x0 < cfg.left_margin_threshold {
            bands.push(NoiseBand::LeftMargin);
        }
        if word.x0 > cfg.right_margin_threshold {
            bands.push(NoiseBand::RightMargin);
        }
        bands
    }

    fn matches_pattern(word: &Word, patterns: &[(String, usize)]) -> bool {
        normalize_text(&word.text).is_some_and(|n| patterns.iter().any(|(p, _)| *p == n))
    }

    /// Measure the extent of a band's matching words over the leading pages.
    fn measure_zone(
        &self,
        doc: &dyn DocumentSource,
        band: NoiseBand,
        patterns: &[(String, usize)],
    ) -> Result<Option<NoiseZone>> {
        if patterns.is_empty() {
            return Ok(None);
        }

        let buffer = self.config.zone_buffer;
        let mut zone: Option<NoiseZone> = None;
        let mut merge = |min: f32, max: f32| {
            zone = Some(match zone {
                Some(z) => NoiseZone::new(band, z.min.min(min), z.max.max(max)),
                None => NoiseZone::new(band, min, max),
            });
        };

        let pages = doc.page_count().min(self.config.scan_pages);
        for idx in 0..pages {
            let dims = doc.page_dimensions(idx)?;
            let words: Vec<Word> = doc
                .words(idx)?
                .into_iter()
                .filter(|w| self.candidate_bands(w).contains(&band))
                .filter(|w| Self::matches_pattern(w, patterns))
                .collect();
            if words.is_empty() {
                continue;
            }

            match band {
                NoiseBand::Header => {
                    let max_bottom = words.iter().map(|w| w.bottom).fold(f32::MIN, f32::max);
                    merge(0.0, max_bottom + buffer);
                },
                NoiseBand::Footer => {
                    let min_top = words.iter().map(|w| w.top).fold(f32::MAX, f32::min);
                    merge(min_top - buffer, dims.height);
                },
                NoiseBand::LeftMargin => {
                    let max_x1 = words.iter().map(|w| w.x1).fold(f32::MIN, f32::max);
                    merge(0.0, max_x1 + buffer);
                },
                NoiseBand::RightMargin => {
                    let min_x0 = words.iter().map(|w| w.x0).fold(f32::MAX, f32::min);
                    merge(min_x0 - buffer, dims.width);
                },
            }
        }

        Ok(zone)
    }
}

/// Minimum occurrence count for promotion: `max(2, samples * min_frequency)`.
///
/// Compared as a real number, so 5 samples at 0.5 need 3 occurrences.
pub fn promotion_threshold(sample_count: usize, min_frequency: f32) -> f32 {
    (sample_count as f32 * min_frequency).max(2.0)
}

/// Normalize a candidate word for pattern counting.
///
/// Returns `None` for text that is too short, purely numeric or a `cid:`
/// artifact. Otherwise whitespace is collapsed and every digit run becomes
/// `[NUM]`, so "Page 3" and "Page 47" count as one pattern.
///
/// # Examples
///
/// ```
/// use exam_chemtext::noise::normalize_text;
///
/// assert_eq!(normalize_text("0620/42/M/J/24"), Some("[NUM]/[NUM]/M/J/[NUM]".to_string()));
/// assert_eq!(normalize_text("47"), None);
/// assert_eq!(normalize_text("(cid:3)"), None);
/// ```
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < 3 {
        return None;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if trimmed.to_lowercase().contains("cid:") {
        return None;
    }

    let collapsed = RE_WHITESPACE.replace_all(trimmed, " ");
    Some(RE_DIGITS.replace_all(&collapsed, NUMBER_PLACEHOLDER).into_owned())
}
