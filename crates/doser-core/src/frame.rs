use ndarray::Array2;
use std::path::PathBuf;

use crate::consts::{BINARY_BACKGROUND, BINARY_FOREGROUND, WORKING_BIT_DEPTH};

/// A single-channel intensity frame.
/// Samples are stored unscaled, as read from the source.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<u16>,
    /// Bit depth of the source samples (8, 12, 16, ...)
    pub bit_depth: u8,
    /// Position of the frame in its video
    pub index: usize,
}

impl Frame {
    pub fn new(data: Array2<u16>, bit_depth: u8) -> Self {
        Self {
            data,
            bit_depth,
            index: 0,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Two-valued image: `BINARY_FOREGROUND` marks filament pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryFrame {
    pub data: Array2<u8>,
}

impl BinaryFrame {
    pub fn new(data: Array2<u8>) -> Self {
        Self { data }
    }

    /// Build from a boolean mask, `true` becoming foreground.
    pub fn from_mask(mask: &Array2<bool>) -> Self {
        Self {
            data: mask.mapv(|m| if m { BINARY_FOREGROUND } else { BINARY_BACKGROUND }),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_foreground(&self, row: usize, col: usize) -> bool {
        self.data[[row, col]] != BINARY_BACKGROUND
    }
}

/// Rescale one sample from the sensor range `[0, 2^sensor_bits - 1]` to the
/// 16-bit working range. Values above the sensor range are clipped.
/// The result is truncated, not rounded.
pub fn rescale_sample(value: f64, sensor_bits: u8) -> u16 {
    let in_max = ((1u32 << sensor_bits.min(WORKING_BIT_DEPTH)) - 1) as f64;
    let out_max = u16::MAX as f64;
    let clipped = value.clamp(0.0, in_max);
    (clipped / in_max * out_max) as u16
}

/// Rescale a whole frame to the working range.
pub fn rescale_intensity(data: &Array2<u16>, sensor_bits: u8) -> Array2<u16> {
    data.mapv(|v| rescale_sample(v as f64, sensor_bits))
}

/// Metadata about a video source.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    ImageSequence,
    Ser,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageSequence => write!(f, "Image sequence"),
            Self::Ser => write!(f, "SER"),
        }
    }
}
