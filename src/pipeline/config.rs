//! Unified configuration for the extraction pipeline.
//!
//! Every stage keeps its own config struct; [`PipelineConfig`] nests them so
//! a single JSON file can tune a whole run. Missing keys fall back to the
//! defaults, and CLI flags are applied on top through the `with_*` methods.

use crate::error::{Error, Result};
use crate::exclusion::{PaddingConfig, ZoneType};
use crate::extractors::ArrowConfig;
use crate::geometry::CoordinateOrigin;
use crate::latex::LatexNormalizer;
use crate::noise::{NoiseDetectorConfig, RegexFilterConfig};
use crate::reconstruct::{PlainTextConfig, ReconstructionConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Resolution the element detectors rasterized pages at. Pixel boxes are
    /// converted with this value, so it must match the producing stage.
    pub dpi: f32,
    /// Skip the cover page
    pub skip_first_page: bool,
    /// Origin convention of point (array) element boxes
    pub coordinate_origin: CoordinateOrigin,
    /// Element types that become exclusion zones
    pub zone_types: Vec<ZoneType>,
    /// Inward shrink of figure zones
    pub padding: PaddingConfig,
    /// Detect and drop header, footer and margin text, and run the line filter
    pub enable_noise_removal: bool,
    /// Noise zone detection thresholds
    pub noise: NoiseDetectorConfig,
    /// Line filter toggles and token lists
    pub regex_filter: RegexFilterConfig,
    /// Formula reconstruction thresholds
    pub reconstruction: ReconstructionConfig,
    /// Plain-text reconstruction thresholds
    pub plain: PlainTextConfig,
    /// Arrow detection thresholds
    pub arrows: ArrowConfig,
    /// Nuclide normalization passes
    pub latex: LatexNormalizer,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            skip_first_page: true,
            coordinate_origin: CoordinateOrigin::TopLeft,
            zone_types: vec![ZoneType::Figure, ZoneType::Table],
            padding: PaddingConfig::default(),
            enable_noise_removal: true,
            noise: NoiseDetectorConfig::default(),
            regex_filter: RegexFilterConfig::default(),
            reconstruction: ReconstructionConfig::default(),
            plain: PlainTextConfig::default(),
            arrows: ArrowConfig::default(),
            latex: LatexNormalizer::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file and validate it.
    ///
    /// # Errors
    ///
    /// IO and JSON errors, and [`Error::InvalidConfig`] for out-of-range
    /// values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every nested configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(Error::InvalidConfig(format!("dpi must be positive, got {}", self.dpi)));
        }
        self.padding.validate()?;
        self.noise.validate()?;
        self.reconstruction.validate()?;
        Ok(())
    }

    /// Set the element DPI.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set whether the first page is skipped.
    pub fn with_skip_first_page(mut self, skip: bool) -> Self {
        self.skip_first_page = skip;
        self
    }

    /// Enable or disable noise removal.
    pub fn with_noise_removal(mut self, enabled: bool) -> Self {
        self.enable_noise_removal = enabled;
        self
    }

    /// Set the figure padding.
    pub fn with_padding(mut self, caption_figure_padding: f32, visual_figure_padding: f32) -> Self {
        self.padding = PaddingConfig {
            caption_figure_padding,
            visual_figure_padding,
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.dpi, 300.0);
        assert!(config.skip_first_page);
        assert!(config.enable_noise_removal);
        assert_eq!(config.padding.visual_figure_padding, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"dpi": 200, "padding": {"caption_figure_padding": 4}, "noise": {"min_frequency": 0.6}}"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.dpi, 200.0);
        assert_eq!(config.padding.caption_figure_padding, 4.0);
        assert_eq!(config.padding.visual_figure_padding, 20.0);
        assert_eq!(config.noise.min_frequency, 0.6);
        assert_eq!(config.noise.sample_size, 5);
        assert!(config.skip_first_page);
    }

    #[test]
    fn test_builder_overrides() {
        let config = PipelineConfig::default()
            .with_dpi(150.0)
            .with_skip_first_page(false)
            .with_noise_removal(false)
            .with_padding(2.0, 10.0);
        assert_eq!(config.dpi, 150.0);
        assert!(!config.skip_first_page);
        assert!(!config.enable_noise_removal);
        assert_eq!(config.padding.caption_figure_padding, 2.0);
        assert_eq!(config.padding.visual_figure_padding, 10.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(PipelineConfig::default().with_dpi(0.0).validate().is_err());
        assert!(PipelineConfig::default().with_padding(-1.0, 20.0).validate().is_err());

        let mut config = PipelineConfig::default();
        config.noise.min_frequency = 1.5;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"skip_first_page": false}"#).unwrap();
        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert!(!config.skip_first_page);
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"dpi": -5}"#).unwrap();
        assert!(PipelineConfig::from_json_file(file.path()).is_err());
    }
}
