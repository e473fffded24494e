use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::threshold::otsu_dark_mask;
use crate::error::{DoserError, Result};
use crate::frame::Frame;

use super::config::CalibrationConfig;

/// Analysis rectangle, half-open on `right` and `bottom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl CropBox {
    pub fn width(&self) -> usize {
        self.right - self.left
    }

    pub fn height(&self) -> usize {
        self.bottom - self.top
    }

    /// Check `0 <= left < right <= width` and `0 <= top < bottom <= height`.
    pub fn validated(self, frame_width: usize, frame_height: usize) -> Result<CropBox> {
        if self.left >= self.right || self.top >= self.bottom {
            return Err(DoserError::InvalidCrop(format!(
                "empty region (left {}, top {}, right {}, bottom {})",
                self.left, self.top, self.right, self.bottom
            )));
        }
        if self.right > frame_width || self.bottom > frame_height {
            return Err(DoserError::InvalidCrop(format!(
                "region ({}, {})-({}, {}) exceeds frame {frame_width}x{frame_height}",
                self.left, self.top, self.right, self.bottom
            )));
        }
        Ok(self)
    }

    /// View of the cropped region of `data`.
    pub fn view<'a, T>(&self, data: &'a Array2<T>) -> Result<ArrayView2<'a, T>> {
        let (h, w) = data.dim();
        let crop = self.validated(w, h)?;
        Ok(data.slice(s![crop.top..crop.bottom, crop.left..crop.right]))
    }

    /// Owned copy of the cropped region of `data`.
    pub fn apply<T: Clone>(&self, data: &Array2<T>) -> Result<Array2<T>> {
        Ok(self.view(data)?.to_owned())
    }
}

/// Geometry inferred once from the reference frame of a video pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    pub crop: CropBox,
    /// Nozzle width in pixels; every D/D0 is relative to it.
    pub nozzle_diameter: usize,
}

/// Measure the nozzle on the reference frame and derive the crop box.
///
/// The frame is Otsu-binarized (dark pixels are the nozzle). On
/// `config.nozzle_row` the first and last nozzle pixels give the nozzle
/// diameter; margins are multiples of it. Rows start `crop_top` below the
/// nozzle row and end `crop_top + crop_bottom` from the top of the frame.
pub fn calibrate(reference: &Frame, config: &CalibrationConfig) -> Result<Calibration> {
    let (h, w) = reference.data.dim();
    let row = config.nozzle_row;
    if row >= h {
        return Err(DoserError::InvalidCrop(format!(
            "nozzle row {row} outside frame of height {h}"
        )));
    }

    let mask = otsu_dark_mask(&reference.data);
    let line = mask.row(row);
    let first = line.iter().position(|&m| m);
    let last = line.iter().rposition(|&m| m);
    let (first, last) = match (first, last) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(DoserError::NoForegroundOnRow { row }),
    };

    let nozzle_diameter = last - first + 1;
    let scaled = |coefficient: f64| (nozzle_diameter as f64 * coefficient).round() as i64;

    let margin = scaled(config.crop_width_coefficient);
    let crop_bottom = scaled(config.crop_height_coefficient);
    let crop_top = scaled(config.crop_nozzle_coefficient);

    let clamp = |v: i64, hi: usize| v.clamp(0, hi as i64) as usize;
    let crop = CropBox {
        left: clamp(first as i64 - margin, w),
        right: clamp(last as i64 + margin, w),
        top: clamp(row as i64 + crop_top, h),
        bottom: clamp(crop_top + crop_bottom, h),
    }
    .validated(w, h)?;

    debug!(nozzle_diameter, ?crop, "Calibrated geometry");
    Ok(Calibration {
        crop,
        nozzle_diameter,
    })
}
