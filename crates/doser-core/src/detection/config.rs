use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DIAMETER_TOLERANCE_PX, DEFAULT_FULL_WHITE_FALLBACK_ROWS};

/// How the lowest analysed row of a binary frame is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottomBorderMethod {
    /// Row with the largest foreground sum in the bottom half of the frame.
    #[default]
    MaxRowSum,
    /// Legacy rule: first fully white row, else derived from runs of
    /// non-empty rows.
    FullWhite,
}

impl std::fmt::Display for BottomBorderMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaxRowSum => write!(f, "Max row sum"),
            Self::FullWhite => write!(f, "Full white"),
        }
    }
}

/// Configuration for per-frame diameter measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Rows within this many pixels of the narrowest row are averaged.
    #[serde(default = "default_tolerance")]
    pub diameter_tolerance_px: usize,
    #[serde(default)]
    pub bottom_border: BottomBorderMethod,
    /// Rows dropped from a lone white block by the `FullWhite` rule.
    #[serde(default = "default_fallback_rows")]
    pub full_white_fallback_rows: usize,
}

fn default_tolerance() -> usize {
    DEFAULT_DIAMETER_TOLERANCE_PX
}
fn default_fallback_rows() -> usize {
    DEFAULT_FULL_WHITE_FALLBACK_ROWS
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            diameter_tolerance_px: DEFAULT_DIAMETER_TOLERANCE_PX,
            bottom_border: BottomBorderMethod::default(),
            full_white_fallback_rows: DEFAULT_FULL_WHITE_FALLBACK_ROWS,
        }
    }
}
