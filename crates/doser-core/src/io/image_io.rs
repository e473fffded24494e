use std::path::Path;

use image::{GrayImage, ImageBuffer, ImageFormat, Luma};
use ndarray::Array2;

use crate::error::{DoserError, Result};
use crate::frame::BinaryFrame;

/// Save a 16-bit intensity image as grayscale TIFF.
pub fn save_tiff16(data: &Array2<u16>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let pixels: Vec<u16> = data.iter().copied().collect();
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels).ok_or(
        DoserError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        },
    )?;
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save a binary frame as 8-bit grayscale PNG.
pub fn save_binary_png(frame: &BinaryFrame, path: &Path) -> Result<()> {
    let (h, w) = frame.data.dim();
    let pixels: Vec<u8> = frame.data.iter().copied().collect();
    let img = GrayImage::from_raw(w as u32, h as u32, pixels).ok_or(
        DoserError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        },
    )?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Load a saved binary image. Any nonzero sample is foreground.
pub fn load_binary(path: &Path) -> Result<BinaryFrame> {
    let gray = image::open(path)?.to_luma8();
    let (w, h) = gray.dimensions();
    let data = Array2::from_shape_vec((h as usize, w as usize), gray.into_raw())
        .map_err(|_| DoserError::InvalidDimensions {
            width: w,
            height: h,
        })?;
    Ok(BinaryFrame::new(data))
}
