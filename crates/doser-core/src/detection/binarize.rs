use ndarray::{Array2, Zip};
use tracing::trace;

use crate::calibration::background::BackgroundImage;
use crate::calibration::geometry::CropBox;
use crate::error::{DoserError, Result};
use crate::frame::{rescale_intensity, BinaryFrame, Frame};

use super::threshold::otsu_dark_mask;

/// Which side of the background a frame fell on after subtraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtractionPolarity {
    /// At least one pixel darker than the background. The magnitude of the
    /// darkening is normalized and inverted, so the filament ends up dark.
    FrameDarker,
    /// No pixel darker than the background. Only brightening is kept.
    FrameBrighter,
}

impl std::fmt::Display for SubtractionPolarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrameDarker => write!(f, "Frame darker"),
            Self::FrameBrighter => write!(f, "Frame brighter"),
        }
    }
}

/// Every intermediate of binarizing one frame.
#[derive(Clone, Debug)]
pub struct BinarizedFrame {
    /// Cropped frame in the 16-bit working range.
    pub cropped: Array2<u16>,
    /// Background-subtracted image, normalized to the full u16 range.
    pub subtracted: Array2<u16>,
    pub polarity: SubtractionPolarity,
    pub binary: BinaryFrame,
}

/// Signed difference `frame - background`, normalized back to u16.
///
/// When any difference is negative, `1 - |neg| / max|neg|` is kept (positive
/// differences count as zero). Otherwise `pos / max(pos)` is kept, and an
/// identical pair yields an all-zero image.
pub fn subtract_background(
    frame: &Array2<u16>,
    background: &Array2<u16>,
) -> Result<(Array2<u16>, SubtractionPolarity)> {
    if frame.dim() != background.dim() {
        return Err(DoserError::ShapeMismatch {
            expected: background.dim(),
            actual: frame.dim(),
        });
    }

    let mut diff = Array2::<i32>::zeros(frame.dim());
    Zip::from(&mut diff)
        .and(frame)
        .and(background)
        .for_each(|d, &f, &b| *d = f as i32 - b as i32);

    let most_negative = diff.iter().copied().min().unwrap_or(0);
    if most_negative < 0 {
        let scale = -(most_negative as f64);
        let out = diff.mapv(|d| {
            let magnitude = if d < 0 { -(d as f64) } else { 0.0 };
            to_u16_unit(1.0 - magnitude / scale)
        });
        Ok((out, SubtractionPolarity::FrameDarker))
    } else {
        let max = diff.iter().copied().max().unwrap_or(0);
        let out = if max == 0 {
            Array2::<u16>::zeros(frame.dim())
        } else {
            let scale = max as f64;
            diff.mapv(|d| to_u16_unit(d as f64 / scale))
        };
        Ok((out, SubtractionPolarity::FrameBrighter))
    }
}

/// Otsu-threshold a subtracted image; pixels below the threshold become
/// filament (255), the rest background (0).
pub fn binarize(subtracted: &Array2<u16>) -> BinaryFrame {
    BinaryFrame::from_mask(&otsu_dark_mask(subtracted))
}

/// Crop, rescale, subtract the background and binarize a raw frame.
///
/// `background` must come from the same crop.
pub fn binarize_frame(
    frame: &Frame,
    crop: &CropBox,
    background: &BackgroundImage,
    sensor_bits: u8,
) -> Result<BinarizedFrame> {
    let cropped = rescale_intensity(&crop.apply(&frame.data)?, sensor_bits);
    let (subtracted, polarity) = subtract_background(&cropped, &background.data)?;
    let binary = binarize(&subtracted);
    trace!(index = frame.index, %polarity, "Binarized frame");
    Ok(BinarizedFrame {
        cropped,
        subtracted,
        polarity,
        binary,
    })
}

/// Map a value in [0, 1] to u16, rounding half to even.
fn to_u16_unit(value: f64) -> u16 {
    (value.clamp(0.0, 1.0) * u16::MAX as f64).round_ties_even() as u16
}
