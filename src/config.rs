//! Recognition configuration
//!
//! Every threshold and size the pipeline uses, stored in TOML format.
//! Missing sections or fields fall back to the documented defaults.

use crate::models::PlateClass;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Plate class used when the caller does not choose one
    pub plate_class: PlateClass,
    pub preprocess: PreprocessConfig,
    pub pyramid: PyramidConfig,
    pub localize: LocalizeConfig,
    pub segment: SegmentConfig,
    pub matching: MatchConfig,
}

/// Grayscale smoothing ahead of plate localization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Bilateral filter neighbourhood diameter in pixels
    pub bilateral_diameter: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            bilateral_diameter: 11,
            bilateral_sigma_color: 17.0,
            bilateral_sigma_space: 17.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidConfig {
    /// Each level is the previous one divided by this factor
    pub scale: f32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            scale: 1.5,
            min_width: 20,
            min_height: 20,
        }
    }
}

/// Plate outline search within one pyramid level.
/// Canny applies its own sigma 1.4 Gaussian, so there is no separate blur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizeConfig {
    pub edge_low_threshold: f32,
    pub edge_high_threshold: f32,
    /// Only this many of the largest contours are examined
    pub max_candidates: usize,
    /// Polygon approximation tolerance as a fraction of the perimeter
    pub polygon_approx_tolerance: f32,
    /// Exclusive (min, max) width/height ratio of an accepted plate
    pub aspect_ratio_range: (f32, f32),
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for LocalizeConfig {
    fn default() -> Self {
        Self {
            edge_low_threshold: 50.0,
            edge_high_threshold: 200.0,
            max_candidates: 10,
            polygon_approx_tolerance: 0.018,
            aspect_ratio_range: (1.5, 4.5),
            min_width: 30,
            min_height: 15,
        }
    }
}

/// Character shape filter on the rectified plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Exclusive (min, max) width/height ratio of a character
    pub aspect_ratio_range: (f32, f32),
    pub min_height: u32,
    pub min_width: u32,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            aspect_ratio_range: (0.1, 1.0),
            min_height: 20,
            min_width: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// A glyph's best correlation must exceed this to be accepted
    pub confidence_floor: f32,
    /// Comparison size (width, height) shared by glyphs and templates
    pub glyph_size: (u32, u32),
    /// Fixed binarization cutoff for template bitmaps
    pub template_threshold: u8,
    /// Emitted in place of a glyph that matched nothing confidently
    pub unknown_marker: char,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.4,
            glyph_size: (40, 80),
            template_threshold: 127,
            unknown_marker: '?',
        }
    }
}

impl RecognitionConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let check_range = |name: &str, (lo, hi): (f32, f32)| -> Result<()> {
            if !(lo.is_finite() && hi.is_finite()) || lo >= hi || lo < 0.0 {
                bail!("{} must be an increasing non-negative range, got ({}, {})", name, lo, hi);
            }
            Ok(())
        };

        if self.preprocess.bilateral_diameter == 0 {
            bail!("preprocess.bilateral_diameter must be positive");
        }
        if self.preprocess.bilateral_sigma_color <= 0.0 || self.preprocess.bilateral_sigma_space <= 0.0 {
            bail!("preprocess bilateral sigmas must be positive");
        }
        if !(self.pyramid.scale > 1.0) {
            bail!("pyramid.scale must be greater than 1.0, got {}", self.pyramid.scale);
        }
        if self.pyramid.min_width == 0 || self.pyramid.min_height == 0 {
            bail!("pyramid minimum size must be positive");
        }
        if self.localize.edge_low_threshold > self.localize.edge_high_threshold {
            bail!("localize.edge_low_threshold must not exceed edge_high_threshold");
        }
        if self.localize.max_candidates == 0 {
            bail!("localize.max_candidates must be positive");
        }
        if !(self.localize.polygon_approx_tolerance > 0.0) {
            bail!("localize.polygon_approx_tolerance must be positive");
        }
        check_range("localize.aspect_ratio_range", self.localize.aspect_ratio_range)?;
        check_range("segment.aspect_ratio_range", self.segment.aspect_ratio_range)?;
        let (glyph_w, glyph_h) = self.matching.glyph_size;
        if glyph_w < 2 || glyph_h < 2 {
            bail!("matching.glyph_size must be at least 2x2, got {}x{}", glyph_w, glyph_h);
        }
        if !(-1.0..=1.0).contains(&self.matching.confidence_floor) {
            bail!("matching.confidence_floor must lie in [-1, 1], got {}", self.matching.confidence_floor);
        }
        Ok(())
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<RecognitionConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: RecognitionConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &RecognitionConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = RecognitionConfig::default();

        assert_eq!(config.plate_class, PlateClass::Car);
        assert_eq!(config.preprocess.bilateral_diameter, 11);
        assert!((config.pyramid.scale - 1.5).abs() < 1e-6);
        assert_eq!((config.pyramid.min_width, config.pyramid.min_height), (20, 20));
        assert_eq!(config.localize.edge_low_threshold, 50.0);
        assert_eq!(config.localize.edge_high_threshold, 200.0);
        assert!((config.localize.polygon_approx_tolerance - 0.018).abs() < 1e-6);
        assert_eq!(config.localize.aspect_ratio_range, (1.5, 4.5));
        assert!((config.matching.confidence_floor - 0.4).abs() < 1e-6);
        assert_eq!(config.matching.glyph_size, (40, 80));
        assert_eq!(config.matching.unknown_marker, '?');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = RecognitionConfig::default();
        config.plate_class = PlateClass::Motorcycle;
        config.matching.confidence_floor = 0.55;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RecognitionConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "plate_class = \"motorcycle\"").unwrap();
        writeln!(file, "[matching]").unwrap();
        writeln!(file, "confidence_floor = 0.6").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.plate_class, PlateClass::Motorcycle);
        assert!((config.matching.confidence_floor - 0.6).abs() < 1e-6);
        assert_eq!(config.matching.glyph_size, (40, 80));
        assert_eq!(config.localize, LocalizeConfig::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let file = NamedTempFile::new().unwrap();
        let mut config = RecognitionConfig::default();
        config.localize.max_candidates = 5;

        save_config(&config, file.path()).unwrap();
        let loaded = load_config(file.path()).unwrap();
        assert_eq!(loaded.localize.max_candidates, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RecognitionConfig::default();
        config.pyramid.scale = 1.0;
        assert!(config.validate().is_err());

        let mut config = RecognitionConfig::default();
        config.localize.aspect_ratio_range = (4.5, 1.5);
        assert!(config.validate().is_err());

        let mut config = RecognitionConfig::default();
        config.matching.glyph_size = (0, 80);
        assert!(config.validate().is_err());
    }
}
