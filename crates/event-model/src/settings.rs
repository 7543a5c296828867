//! Heatmap settings: raster geometry, spreading, palette and ratio pairs.
//!
//! One settings value covers a whole run. Missing fields in a settings
//! file fall back to the defaults, which reproduce the reference map.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::WorldRect;
use crate::metric::RatioRelation;

/// An RGBA color with 8-bit channels.
pub type Rgba8 = [u8; 4];

/// A two-stop color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRamp {
    /// Color just above the noise floor.
    pub low: Rgba8,
    /// Color at the peak.
    pub high: Rgba8,
}

impl ColorRamp {
    pub const fn new(low: Rgba8, high: Rgba8) -> Self {
        Self { low, high }
    }
}

/// Color ramps for unsigned and signed (ratio) heatmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    /// Ramp for ordinary heatmaps.
    pub unsigned: ColorRamp,
    /// Ramp for ratio pixels where the numerator dominates.
    pub positive: ColorRamp,
    /// Ramp for ratio pixels where the denominator dominates.
    pub negative: ColorRamp,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        let green = ColorRamp::new([0, 64, 0, 192], [240, 255, 240, 255]);
        Self {
            unsigned: green,
            positive: green,
            negative: ColorRamp::new([64, 0, 0, 192], [255, 240, 240, 255]),
        }
    }
}

/// How an event's weight fades with distance inside the decay radius.
///
/// Both forms reach the full weight at zero distance and zero at the
/// decay radius. `Linear` is linear in *squared* distance; `SquareRoot`
/// takes the square root of that fraction, which keeps the center flatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    #[default]
    Linear,
    SquareRoot,
}

/// Settings for one heatmap run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// World rectangle mapped onto the raster.
    pub world: WorldRect,
    /// Spread radius in pixels.
    pub spread_radius: u32,
    /// Decay curve inside the spread radius.
    pub falloff: Falloff,
    /// Color ramps.
    pub palette: PaletteSettings,
    /// Metric pairs combined into ratio heatmaps.
    pub ratios: Vec<RatioRelation>,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            world: WorldRect::default(),
            spread_radius: 16,
            falloff: Falloff::Linear,
            palette: PaletteSettings::default(),
            ratios: RatioRelation::defaults(),
        }
    }
}

impl HeatmapSettings {
    /// Check that the settings describe a usable raster and world domain.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::invalid(format!(
                "raster dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.world.is_degenerate() {
            return Err(SettingsError::invalid(format!(
                "world rectangle ({}, {})-({}, {}) has zero area",
                self.world.xmin, self.world.ymin, self.world.xmax, self.world.ymax
            )));
        }
        if self.spread_radius == 0 {
            return Err(SettingsError::invalid("spread radius must be positive"));
        }
        if let Some(rel) = self.ratios.iter().find(|r| r.numerator == r.denominator) {
            return Err(SettingsError::invalid(format!(
                "ratio relation pairs {} with itself",
                rel.numerator
            )));
        }
        Ok(())
    }

    /// Squared world distance beyond which an event contributes nothing.
    ///
    /// Converts the pixel spread radius into world units, correcting for
    /// non-square world-to-pixel scaling.
    pub fn decay_radius(&self) -> f64 {
        let scale = self.world.width() * self.world.height()
            / (self.width as f64 * self.height as f64);
        scale.abs() * (self.spread_radius as f64).powi(2)
    }

    /// Load settings from a JSON file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SettingsError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| SettingsError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors that can occur when working with settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid settings: {message}")]
    ValidationError { message: String },
}

impl SettingsError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}
