use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calibration::config::{BackgroundConfig, CalibrationConfig};
use crate::consts::DEFAULT_IMAGE_EXTENSION;
use crate::detection::config::ProfileConfig;
use crate::error::Result;
use crate::io::output::ExistingPolicy;
use crate::naming::config::NamingConfig;
use crate::signal::config::SignalConfig;

/// Settings for one run, built once and passed by reference everywhere.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::error::DoserError::Pipeline(format!("serialize config: {e}")))
    }
}

/// What gets written and how existing outputs are treated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub existing: ExistingPolicy,
    /// Also save cropped frames as 16-bit TIFF.
    #[serde(default)]
    pub save_crop: bool,
    /// Also save background-subtracted frames as 16-bit TIFF.
    #[serde(default)]
    pub save_bg_sub: bool,
    /// Extension of frame files inside video folders.
    #[serde(default = "default_image_extension")]
    pub image_extension: String,
    /// Frame rate used instead of the one parsed from folder names.
    #[serde(default)]
    pub fps: Option<f64>,
    /// Process the frames of one video in parallel.
    #[serde(default)]
    pub parallel_frames: bool,
}

fn default_image_extension() -> String {
    DEFAULT_IMAGE_EXTENSION.into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            existing: ExistingPolicy::default(),
            save_crop: false,
            save_bg_sub: false,
            image_extension: default_image_extension(),
            fps: None,
            parallel_frames: false,
        }
    }
}
