use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::detection::edges::sobel_magnitude;
use crate::detection::threshold::{otsu_dark_mask, otsu_threshold_binned};
use crate::error::{DoserError, Result};
use crate::frame::{rescale_sample, Frame};
use crate::signal::runs::{continuous_nonzero, runs_where};

use super::config::BackgroundConfig;
use super::geometry::CropBox;

/// Representative background of one video pair, cropped and rescaled to the
/// 16-bit working range. Built once and shared read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundImage {
    pub data: Array2<u16>,
}

impl BackgroundImage {
    pub fn new(data: Array2<u16>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Median of the background frames inside `crop`, rescaled from
/// `sensor_bits` to 16 bits, with the resting drop optionally masked out.
pub fn build_background(
    frames: &[Frame],
    crop: &CropBox,
    sensor_bits: u8,
    config: &BackgroundConfig,
) -> Result<BackgroundImage> {
    let views = frames
        .iter()
        .map(|f| crop.view(&f.data))
        .collect::<Result<Vec<_>>>()?;
    let Some(first) = views.first() else {
        return Err(DoserError::EmptySequence);
    };
    let (h, w) = first.dim();
    let n = views.len();

    let median_row = |row: usize| -> Vec<u16> {
        let mut values = vec![0u16; n];
        (0..w)
            .map(|col| {
                for (slot, view) in values.iter_mut().zip(&views) {
                    *slot = view[[row, col]];
                }
                rescale_sample(compute_median(&mut values), sensor_bits)
            })
            .collect()
    };

    let rows: Vec<Vec<u16>> = if h * w >= PARALLEL_PIXEL_THRESHOLD && n > 1 {
        (0..h).into_par_iter().map(median_row).collect()
    } else {
        (0..h).map(median_row).collect()
    };

    let flat: Vec<u16> = rows.into_iter().flatten().collect();
    let data = Array2::from_shape_vec((h, w), flat)
        .map_err(|e| DoserError::Pipeline(format!("background shape: {e}")))?;
    let mut background = BackgroundImage::new(data);
    debug!(frames = n, width = w, height = h, "Built background median");

    if config.drop_removal {
        remove_bg_drop(&mut background);
    }
    Ok(background)
}

/// Median of `values`; the mean of the two middle values for even counts.
fn compute_median(values: &mut [u16]) -> f64 {
    let n = values.len();
    if n == 1 {
        return values[0] as f64;
    }
    let mid = n / 2;
    let upper = *values.select_nth_unstable(mid).1 as f64;
    if n % 2 == 1 {
        upper
    } else {
        let lower = values[..mid].iter().copied().max().unwrap_or(0) as f64;
        (lower + upper) / 2.0
    }
}

/// Row where the lowest detected edge starts in each column.
///
/// Edges are Sobel magnitudes at or above their Otsu threshold. Columns
/// without any edge get the image height, so nothing in them is replaced.
pub fn bg_drop_top_edge(background: &BackgroundImage) -> Vec<usize> {
    let (h, w) = background.data.dim();
    let magnitude = sobel_magnitude(&background.data);
    let threshold = otsu_threshold_binned(&magnitude);

    (0..w)
        .map(|col| {
            let column: Vec<f64> = magnitude.column(col).to_vec();
            let edges = runs_where(&column, |&m| m >= threshold);
            edges
                .last()
                .map(|block| block[0])
                .unwrap_or(h)
        })
        .collect()
}

/// Replace every pixel at or below the drop's top edge with the image
/// maximum, so the drop vanishes after subtraction.
pub fn remove_bg_drop(background: &mut BackgroundImage) {
    let max_value = background.data.iter().copied().max().unwrap_or(0);
    let cutoffs = bg_drop_top_edge(background);
    for (col, &cutoff) in cutoffs.iter().enumerate() {
        for row in cutoff..background.height() {
            background.data[[row, col]] = max_value;
        }
    }
    debug!(max_value, "Removed background drop");
}

/// Last row of the nozzle in the background, used as the top of the
/// diameter window.
///
/// Dark pixels after Otsu thresholding are the nozzle; the end of the first
/// run of rows containing any of them is returned. Falls back to 0 when the
/// background has no dark rows.
pub fn top_border(background: &BackgroundImage) -> usize {
    let mask = otsu_dark_mask(&background.data);
    let sums: Vec<u64> = mask
        .rows()
        .into_iter()
        .map(|row| row.iter().filter(|&&m| m).count() as u64)
        .collect();
    match continuous_nonzero(&sums).first() {
        Some(block) => block[1],
        None => {
            warn!("No nozzle found in background, diameter window starts at row 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(compute_median(&mut [3, 1, 2]), 2.0);
        assert_eq!(compute_median(&mut [4, 1, 3, 2]), 2.5);
        assert_eq!(compute_median(&mut [7]), 7.0);
    }

    #[test]
    fn test_top_border_first_dark_block() {
        let mut data = Array2::<u16>::from_elem((10, 6), 60_000);
        for row in 0..3 {
            for col in 1..5 {
                data[[row, col]] = 1_000;
            }
        }
        // Outline at 1_000, interior one level up, as a sensor would record it.
        for row in 0..3 {
            for col in 2..4 {
                data[[row, col]] = 1_001;
            }
        }
        data[[7, 2]] = 1_000;
        assert_eq!(top_border(&BackgroundImage::new(data)), 3);
    }

    #[test]
    fn test_top_border_flat_background() {
        let data = Array2::<u16>::from_elem((4, 4), 100);
        assert_eq!(top_border(&BackgroundImage::new(data)), 0);
    }
}
