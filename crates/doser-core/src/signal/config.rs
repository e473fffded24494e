use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_TC_BOUNDS;

/// Where a series is cut relative to the longest run of zero diameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    /// Keep rows up to, not including, the first zero of the run.
    #[default]
    BeforeDropout,
    /// Keep rows up to and including the last zero of the run.
    AfterDropout,
}

impl std::fmt::Display for Truncation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeforeDropout => write!(f, "Before dropout"),
            Self::AfterDropout => write!(f, "After dropout"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// D/D0 values bounding the critical-time search, in row order.
    #[serde(default = "default_tc_bounds")]
    pub tc_bounds: [f64; 2],
    #[serde(default)]
    pub truncation: Truncation,
}

fn default_tc_bounds() -> [f64; 2] {
    DEFAULT_TC_BOUNDS
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            tc_bounds: DEFAULT_TC_BOUNDS,
            truncation: Truncation::default(),
        }
    }
}
