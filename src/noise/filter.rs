//! Character-level noise filtering.
//!
//! Filters are selected once per pipeline run: [`NoiseFilter`] when noise
//! zones were detected, [`PassThroughFilter`] when noise removal is disabled.

use crate::layout::TextChar;
use crate::noise::detector::{NoiseBand, NoiseZoneStatistics, NoiseZones};

/// A pure filter over a page's character stream.
pub trait CharacterFilter: Send + Sync {
    /// Keep the characters that are not noise, preserving order.
    fn filter(&self, chars: Vec<TextChar>) -> Vec<TextChar>;

    /// Return the name of this filter for logging.
    fn name(&self) -> &'static str;
}

/// Drops characters whose anchor lies inside a noise zone.
///
/// Header and footer zones are tested against the character's `top`, margin
/// zones against its `x0`. Only the anchor point is tested, so a glyph that
/// straddles a zone boundary may survive.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    zones: NoiseZones,
}

impl NoiseFilter {
    /// Create a filter over detected zones.
    pub fn new(zones: NoiseZones) -> Self {
        Self { zones }
    }

    /// The zones this filter applies.
    pub fn zones(&self) -> &NoiseZones {
        &self.zones
    }

    /// Whether a single character falls in any zone.
    pub fn is_noise(&self, c: &TextChar) -> bool {
        self.zones.zones.iter().any(|zone| match zone.band {
            NoiseBand::Header | NoiseBand::Footer => zone.contains(c.top()),
            NoiseBand::LeftMargin | NoiseBand::RightMargin => zone.contains(c.x0()),
        })
    }

    /// Zone counts and band sizes.
    pub fn statistics(&self) -> NoiseZoneStatistics {
        self.zones.statistics()
    }
}

impl CharacterFilter for NoiseFilter {
    fn filter(&self, chars: Vec<TextChar>) -> Vec<TextChar> {
        if self.zones.is_empty() {
            return chars;
        }
        chars.into_iter().filter(|c| !self.is_noise(c)).collect()
    }

    fn name(&self) -> &'static str {
        "noise_zones"
    }
}

/// Keeps every character.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughFilter;

impl CharacterFilter for PassThroughFilter {
    fn filter(&self, chars: Vec<TextChar>) -> Vec<TextChar> {
        chars
    }

    fn name(&self) -> &'static str {
        "pass_through"
    }
}
