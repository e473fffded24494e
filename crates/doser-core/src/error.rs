use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoserError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Unsupported color mode: {0}")]
    UnsupportedColorMode(String),

    #[error("Frame shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("No foreground pixel on calibration row {row}")]
    NoForegroundOnRow { row: usize },

    #[error("column {0} must be present in dataset")]
    MissingColumn(String),

    #[error("column {0} must be numeric")]
    NonNumericColumn(String),

    #[error("Column {name} has {actual} rows, expected {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("No rows between D/D0 bounds {start} and {end}")]
    EmptyCriticalWindow { start: f64, end: f64 },

    #[error("Missing parameter {key} in {path}")]
    MissingParameter { key: String, path: String },

    #[error("Invalid value {value:?} for parameter {key}")]
    InvalidParameter { key: String, value: String },

    #[error("Cannot parse {name:?} with format {format:?}: {reason}")]
    FilenameFormat {
        name: String,
        format: String,
        reason: String,
    },

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Empty frame sequence")]
    EmptySequence,
}

pub type Result<T> = std::result::Result<T, DoserError>;
