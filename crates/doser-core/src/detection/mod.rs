pub mod binarize;
pub mod config;
pub mod diameter;
pub mod edges;
pub mod threshold;

pub use binarize::{binarize, binarize_frame, subtract_background, BinarizedFrame, SubtractionPolarity};
pub use config::{BottomBorderMethod, ProfileConfig};
pub use diameter::{bottom_border, min_diameter, DiameterWindow};
pub use threshold::{otsu_dark_mask, otsu_threshold, otsu_threshold_binned};
