use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CROP_HEIGHT_COEFFICIENT, DEFAULT_CROP_NOZZLE_COEFFICIENT,
    DEFAULT_CROP_WIDTH_COEFFICIENT, DEFAULT_NOZZLE_ROW, DEFAULT_SENSOR_BIT_DEPTH,
};

/// Coefficients for nozzle calibration, relative to the nozzle diameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Row of the reference frame crossing the nozzle.
    #[serde(default = "default_nozzle_row")]
    pub nozzle_row: usize,
    /// Margin added left and right of the nozzle.
    #[serde(default = "default_width_coefficient")]
    pub crop_width_coefficient: f64,
    /// Offset of the crop top below the nozzle row.
    #[serde(default = "default_nozzle_coefficient")]
    pub crop_nozzle_coefficient: f64,
    /// Crop height.
    #[serde(default = "default_height_coefficient")]
    pub crop_height_coefficient: f64,
    /// Bit depth of the camera samples; frames are rescaled to 16 bits.
    #[serde(default = "default_sensor_bit_depth")]
    pub sensor_bit_depth: u8,
}

fn default_nozzle_row() -> usize {
    DEFAULT_NOZZLE_ROW
}
fn default_width_coefficient() -> f64 {
    DEFAULT_CROP_WIDTH_COEFFICIENT
}
fn default_nozzle_coefficient() -> f64 {
    DEFAULT_CROP_NOZZLE_COEFFICIENT
}
fn default_height_coefficient() -> f64 {
    DEFAULT_CROP_HEIGHT_COEFFICIENT
}
fn default_sensor_bit_depth() -> u8 {
    DEFAULT_SENSOR_BIT_DEPTH
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            nozzle_row: DEFAULT_NOZZLE_ROW,
            crop_width_coefficient: DEFAULT_CROP_WIDTH_COEFFICIENT,
            crop_nozzle_coefficient: DEFAULT_CROP_NOZZLE_COEFFICIENT,
            crop_height_coefficient: DEFAULT_CROP_HEIGHT_COEFFICIENT,
            sensor_bit_depth: DEFAULT_SENSOR_BIT_DEPTH,
        }
    }
}

/// Background model options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Mask out a drop resting on the substrate before subtraction.
    #[serde(default)]
    pub drop_removal: bool,
}
