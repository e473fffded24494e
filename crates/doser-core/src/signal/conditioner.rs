use tracing::debug;

use crate::consts::{COL_DIAMETER, COL_DTC, COL_STRAIN_RATE, COL_T_MINUS_TC, COL_TC, COL_TIME};
use crate::error::{DoserError, Result};

use super::config::{SignalConfig, Truncation};
use super::runs::{continuous_zero, longest_block};
use super::table::TimeSeries;

/// Critical point found in one series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CriticalPoint {
    /// Row of the series holding the strain-rate maximum.
    pub index: usize,
    /// Critical time in seconds.
    pub tc: f64,
    /// D/D0 at the critical time.
    pub dtc_d0: f64,
}

/// Run every stage: truncate, strain rate, critical time, annotate.
pub fn condition(series: &mut TimeSeries, config: &SignalConfig) -> Result<CriticalPoint> {
    truncate_data(series, config.truncation)?;
    add_strain_rate(series)?;
    add_critical_time(series, config.tc_bounds)
}

/// Cut the series at the longest run of zero D/D0.
///
/// The run marks the sensor dropout after breakup. With no zero at all the
/// series is left untouched.
pub fn truncate_data(series: &mut TimeSeries, truncation: Truncation) -> Result<()> {
    let diameter = series.numeric(COL_DIAMETER)?;
    let blocks = continuous_zero(diameter);
    let Some(longest) = longest_block(&blocks) else {
        debug!("No zero run in D/D0, series kept whole");
        return Ok(());
    };
    let end = match truncation {
        Truncation::BeforeDropout => blocks[longest][0],
        Truncation::AfterDropout => blocks[longest][1],
    };
    debug!(rows = series.len(), end, %truncation, "Truncating series");
    series.truncate(end);
    Ok(())
}

/// Derivative of `y` with respect to `x`.
///
/// Second-order central differences on the interior (valid for uneven
/// spacing) and first-order one-sided differences at both ends.
pub fn gradient(y: &[f64], x: &[f64]) -> Vec<f64> {
    let n = y.len();
    if n < 2 {
        return vec![f64::NAN; n];
    }
    let mut out = vec![0.0; n];
    out[0] = (y[1] - y[0]) / (x[1] - x[0]);
    out[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);
    for i in 1..n - 1 {
        let hd = x[i] - x[i - 1];
        let hs = x[i + 1] - x[i];
        out[i] = (hd * hd * y[i + 1] + (hs * hs - hd * hd) * y[i] - hs * hs * y[i - 1])
            / (hs * hd * (hd + hs));
    }
    out
}

/// Add `strain rate (1/s)` = -2 (dD/dt) / D and drop rows where it is not finite.
pub fn add_strain_rate(series: &mut TimeSeries) -> Result<()> {
    series.require(&[COL_DIAMETER, COL_TIME])?;
    let diameter = series.numeric(COL_DIAMETER)?;
    let time = series.numeric(COL_TIME)?;

    let strain: Vec<f64> = gradient(diameter, time)
        .iter()
        .zip(diameter)
        .map(|(d_dt, d)| -2.0 * d_dt / d)
        .collect();
    let keep: Vec<bool> = strain.iter().map(|s| s.is_finite()).collect();

    series.set_numeric(COL_STRAIN_RATE, strain)?;
    let before = series.len();
    series.retain_rows(&keep);
    if series.len() != before {
        debug!(dropped = before - series.len(), "Removed non-finite strain rates");
    }
    Ok(())
}

/// Row whose value in `column` is nearest to `value`; first wins ties.
pub fn closest_index_for_value(series: &TimeSeries, column: &str, value: f64) -> Result<usize> {
    let values = series.numeric(column)?;
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (i, v)| {
            let distance = (v - value).abs();
            match best {
                Some((_, best_distance)) if best_distance <= distance => best,
                _ => Some((i, distance)),
            }
        })
        .map(|(i, _)| i)
        .ok_or(DoserError::EmptySequence)
}

/// Locate the strain-rate maximum between the rows nearest to the two D/D0
/// bounds, then annotate every row with `tc (s)`, `t - tc (s)` and `Dtc/D0`.
pub fn add_critical_time(series: &mut TimeSeries, tc_bounds: [f64; 2]) -> Result<CriticalPoint> {
    series.require(&[COL_DIAMETER, COL_TIME, COL_STRAIN_RATE])?;

    let begin = closest_index_for_value(series, COL_DIAMETER, tc_bounds[0])?;
    let end = closest_index_for_value(series, COL_DIAMETER, tc_bounds[1])?;

    let strain = series.numeric(COL_STRAIN_RATE)?;
    let mut best: Option<usize> = None;
    for i in begin..end.max(begin) {
        if best.map_or(true, |b| strain[i] > strain[b]) {
            best = Some(i);
        }
    }
    let index = best.ok_or(DoserError::EmptyCriticalWindow {
        start: tc_bounds[0],
        end: tc_bounds[1],
    })?;

    let time = series.numeric(COL_TIME)?;
    let point = CriticalPoint {
        index,
        tc: time[index],
        dtc_d0: series.numeric(COL_DIAMETER)?[index],
    };
    let t_minus_tc: Vec<f64> = time.iter().map(|t| t - point.tc).collect();

    series.fill_numeric(COL_TC, point.tc)?;
    series.set_numeric(COL_T_MINUS_TC, t_minus_tc)?;
    series.fill_numeric(COL_DTC, point.dtc_d0)?;
    debug!(tc = point.tc, dtc_d0 = point.dtc_d0, "Critical time found");
    Ok(point)
}
