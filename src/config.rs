use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::color::Color;
use crate::compositor::Kernel;
use crate::error::{RasterError, Result};
use crate::paint::RadialAlpha;

/// Engine-wide defaults, stored as JSON.
///
/// Missing fields fall back to [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Max per-channel difference at which two colors count as equal
    pub tolerance: u8,
    /// Kernel used by `Surface::blur`
    pub blur_kernel: Kernel,
    /// Radial paint falloff radius as a fraction of the fill's larger side
    pub radial_multiplier: f32,
    /// Color a new surface starts out with
    pub background: Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: 0,
            blur_kernel: Kernel::Box,
            radial_multiplier: 0.5,
            background: Color::TRANSPARENT,
        }
    }
}

impl EngineConfig {
    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::debug!("loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.radial_multiplier.is_finite() || self.radial_multiplier <= 0.0 {
            return Err(RasterError::Config(format!(
                "radial_multiplier must be positive, got {}",
                self.radial_multiplier
            )));
        }
        Ok(())
    }

    /// Radial paint using the configured multiplier
    pub fn radial(&self, color: Color, peak_alpha: u8) -> RadialAlpha {
        RadialAlpha::new(color, peak_alpha, self.radial_multiplier)
    }
}
