use ndarray::{Array2, ArrayBase, Data, Ix2};

use crate::consts::OTSU_HISTOGRAM_BINS;

/// Otsu's thresholding over the exact integer histogram of a 16-bit image.
///
/// Every level in `[min, max]` is its own bin. The returned threshold is the
/// highest level of the dark class, so callers keep pixels strictly below it:
/// a two-valued image selects nothing. A constant image returns its value.
pub fn otsu_threshold<S>(data: &ArrayBase<S, Ix2>) -> u16
where
    S: Data<Elem = u16>,
{
    let Some((min, max)) = data.iter().fold(None, |acc: Option<(u16, u16)>, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    }) else {
        return 0;
    };
    if max == min {
        return min;
    }

    let mut histogram = vec![0u64; (max - min) as usize + 1];
    for &v in data.iter() {
        histogram[(v - min) as usize] += 1;
    }
    let level = best_split(&histogram, |i| min as f64 + i as f64);
    min + level as u16
}

/// Otsu's thresholding for continuous values, such as edge magnitudes.
///
/// The histogram has `OTSU_HISTOGRAM_BINS` bins over the data's own
/// `[min, max]` range and the threshold is the center of the winning bin.
pub fn otsu_threshold_binned<S>(data: &ArrayBase<S, Ix2>) -> f64
where
    S: Data<Elem = f64>,
{
    let bins = OTSU_HISTOGRAM_BINS;
    let Some((min, max)) = data.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    }) else {
        return 0.0;
    };
    if max <= min {
        return min;
    }
    let width = (max - min) / bins as f64;

    let mut histogram = vec![0u64; bins];
    for &v in data.iter() {
        let bin = (((v - min) / width) as usize).min(bins - 1);
        histogram[bin] += 1;
    }
    let center = |i: usize| min + (i as f64 + 0.5) * width;
    center(best_split(&histogram, center))
}

/// Index of the last bin of the lower class maximizing the between-class
/// variance. The first maximum wins, so empty bins after the lower class
/// never move the split.
fn best_split(histogram: &[u64], value_of: impl Fn(usize) -> f64) -> usize {
    let total: f64 = histogram.iter().sum::<u64>() as f64;
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| value_of(i) * count as f64)
        .sum();

    let mut weight_bg: f64 = 0.0;
    let mut sum_bg: f64 = 0.0;
    let mut best_variance = 0.0_f64;
    let mut best = 0usize;

    for (i, &count) in histogram.iter().enumerate() {
        weight_bg += count as f64;
        sum_bg += value_of(i) * count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between_variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if between_variance > best_variance {
            best_variance = between_variance;
            best = i;
        }
    }
    best
}

/// Mask of pixels strictly below `threshold`.
pub fn below_threshold<S>(data: &ArrayBase<S, Ix2>, threshold: u16) -> Array2<bool>
where
    S: Data<Elem = u16>,
{
    data.mapv(|v| v < threshold)
}

/// Otsu-binarize, marking the dark class as `true`.
pub fn otsu_dark_mask<S>(data: &ArrayBase<S, Ix2>) -> Array2<bool>
where
    S: Data<Elem = u16>,
{
    below_threshold(data, otsu_threshold(data))
}
