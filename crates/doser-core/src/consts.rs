/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Bit depth of the working intensity range after rescaling.
pub const WORKING_BIT_DEPTH: u8 = 16;

/// Pixel value of filament pixels in a binary frame.
pub const BINARY_FOREGROUND: u8 = 255;

/// Pixel value of background pixels in a binary frame.
pub const BINARY_BACKGROUND: u8 = 0;

/// Number of histogram bins for Otsu's thresholding.
pub const OTSU_HISTOGRAM_BINS: usize = 256;

/// Rows whose width lies within this many pixels of the row-wise minimum
/// are averaged into the reported diameter.
pub const DEFAULT_DIAMETER_TOLERANCE_PX: usize = 2;

/// Rows subtracted from the end of a single white block when the legacy
/// full-white bottom border finds no fully white row.
pub const DEFAULT_FULL_WHITE_FALLBACK_ROWS: usize = 10;

/// Row of the reference frame scanned for the nozzle.
pub const DEFAULT_NOZZLE_ROW: usize = 1;

/// Horizontal crop margin on each side, as a fraction of the nozzle diameter.
pub const DEFAULT_CROP_WIDTH_COEFFICIENT: f64 = 0.02;

/// Crop top offset below the nozzle row, as a fraction of the nozzle diameter.
pub const DEFAULT_CROP_NOZZLE_COEFFICIENT: f64 = 0.15;

/// Crop height, as a multiple of the nozzle diameter.
pub const DEFAULT_CROP_HEIGHT_COEFFICIENT: f64 = 2.0;

/// Bit depth of the high-speed camera sensor.
pub const DEFAULT_SENSOR_BIT_DEPTH: u8 = 12;

/// D/D0 window searched for the critical time.
pub const DEFAULT_TC_BOUNDS: [f64; 2] = [0.3, 0.07];

/// Image extension of frames inside a video folder.
pub const DEFAULT_IMAGE_EXTENSION: &str = "tif";

/// Column names of the time series table.
pub const COL_TIME: &str = "time (s)";
pub const COL_DIAMETER: &str = "D/D0";
pub const COL_STRAIN_RATE: &str = "strain rate (1/s)";
pub const COL_TC: &str = "tc (s)";
pub const COL_T_MINUS_TC: &str = "t - tc (s)";
pub const COL_DTC: &str = "Dtc/D0";

/// Sub-folders of a processed video's image folder.
pub const BIN_FOLDER: &str = "bin";
pub const CROP_FOLDER: &str = "crop";
pub const BG_SUB_FOLDER: &str = "bg_sub";
