use serde::{Deserialize, Serialize};

use crate::consts::BINARY_FOREGROUND;
use crate::frame::BinaryFrame;
use crate::signal::runs::continuous_nonzero;

use super::config::{BottomBorderMethod, ProfileConfig};

/// Horizontal bounds and top row of the analysed region of a binary frame.
/// The bottom row is chosen per frame by [`bottom_border`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiameterWindow {
    pub left: usize,
    pub top: usize,
    pub right: usize,
}

impl DiameterWindow {
    /// Full frame width starting at `top`.
    pub fn full_width(top: usize, width: usize) -> Self {
        Self {
            left: 0,
            top,
            right: width,
        }
    }
}

fn row_sums(frame: &BinaryFrame) -> Vec<u64> {
    frame
        .data
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|&v| v as u64).sum())
        .collect()
}

/// First index of the maximum; `None` for an empty slice.
fn argmax(values: &[u64]) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Lowest row of the frame still analysed, using the configured rule.
pub fn bottom_border(frame: &BinaryFrame, config: &ProfileConfig) -> usize {
    match config.bottom_border {
        BottomBorderMethod::MaxRowSum => bottom_border_max_row_sum(frame),
        BottomBorderMethod::FullWhite => {
            bottom_border_full_white(frame, config.full_white_fallback_rows)
        }
    }
}

/// Row with the largest foreground sum in the bottom half of the frame.
///
/// The half point is `height / 2` rounded half to even. Ties go to the
/// topmost row.
pub fn bottom_border_max_row_sum(frame: &BinaryFrame) -> usize {
    let sums = row_sums(frame);
    let half = (sums.len() as f64 / 2.0).round_ties_even() as usize;
    half + argmax(&sums[half.min(sums.len())..]).unwrap_or(0)
}

/// Legacy rule: the first fully white row if there is one. Otherwise the
/// runs of non-empty rows decide: a single run ends `fallback_rows` above
/// its end, several runs end at the start of the last one, and no run
/// keeps the whole frame.
pub fn bottom_border_full_white(frame: &BinaryFrame, fallback_rows: usize) -> usize {
    let sums = row_sums(frame);
    let full_white = BINARY_FOREGROUND as u64 * frame.width() as u64;
    if full_white > 0 {
        if let Some(row) = sums.iter().position(|&s| s == full_white) {
            return row;
        }
    }

    let runs = continuous_nonzero(&sums);
    match runs.as_slice() {
        [] => sums.len(),
        [only] => only[1].saturating_sub(fallback_rows),
        [.., last] => last[0],
    }
}

/// Minimum filament width in pixels inside `window`.
///
/// Each row in `[top, bottom)` records `last - first + 1` over its
/// foreground pixels in `[left, right)`, or 0 when it has none. Any 0 means
/// the filament is broken and the result is 0. Otherwise the rows within
/// `diameter_tolerance_px` of the narrowest are averaged. An empty window
/// also measures 0.
pub fn min_diameter(frame: &BinaryFrame, window: &DiameterWindow, config: &ProfileConfig) -> f64 {
    let bottom = bottom_border(frame, config).min(frame.height());
    let right = window.right.min(frame.width());
    let left = window.left.min(right);

    let mut profile = Vec::new();
    for row in window.top..bottom {
        let line = frame.data.row(row);
        let segment = line.slice(ndarray::s![left..right]);
        let first = segment.iter().position(|&v| v != 0);
        let last = segment.iter().rposition(|&v| v != 0);
        let width = match (first, last) {
            (Some(f), Some(l)) => l - f + 1,
            _ => 0,
        };
        profile.push(width);
    }

    let Some(&narrowest) = profile.iter().min() else {
        return 0.0;
    };
    if narrowest == 0 {
        return 0.0;
    }

    let limit = narrowest + config.diameter_tolerance_px;
    let (sum, count) = profile
        .iter()
        .filter(|&&w| w <= limit)
        .fold((0usize, 0usize), |(s, c), &w| (s + w, c + 1));
    sum as f64 / count as f64
}
