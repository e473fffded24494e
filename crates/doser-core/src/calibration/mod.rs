pub mod background;
pub mod config;
pub mod geometry;

pub use background::{bg_drop_top_edge, build_background, remove_bg_drop, top_border, BackgroundImage};
pub use config::{BackgroundConfig, CalibrationConfig};
pub use geometry::{calibrate, Calibration, CropBox};
