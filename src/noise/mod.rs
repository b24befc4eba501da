//! Header, footer and margin noise removal.
//!
//! Two complementary stages:
//! - geometric: [`NoiseDetector`] finds recurring edge text across a sample
//!   of pages and [`NoiseFilter`] drops characters anchored in those zones
//! - textual: [`RegexNoiseFilter`] removes residual noise lines from the
//!   reconstructed text

pub mod detector;
pub mod filter;
pub mod regex_filter;

// Re-export main types
pub use detector::{
    normalize_text, promotion_threshold, NoiseBand, NoiseDetector, NoiseDetectorConfig,
    NoisePatterns, NoiseZone, NoiseZoneStatistics, NoiseZones,
};
pub use filter::{CharacterFilter, NoiseFilter, PassThroughFilter};
pub use regex_filter::{FilterStatistics, RegexFilterConfig, RegexNoiseFilter};
