mod common;

use approx::assert_relative_eq;
use doser_core::consts::{COL_DIAMETER, COL_DTC, COL_STRAIN_RATE, COL_TC, COL_TIME, COL_T_MINUS_TC};
use doser_core::error::DoserError;
use doser_core::signal::runs::{continuous_nonzero, continuous_zero, longest_block};
use doser_core::signal::{
    add_critical_time, add_strain_rate, closest_index_for_value, condition, truncate_data,
    SignalConfig, Truncation,
};

use common::series;

const RUN_VALUES: [f64; 16] = [
    0.0, 0.1, 0.2, 0.1, 1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0, 0.0, 0.0, 1.0,
];

fn dropout_series() -> doser_core::signal::TimeSeries {
    let d = vec![
        1.0, 0.9, 0.0, 0.8, 0.5, 0.2, 0.1, 0.01, 0.0, 0.0, 0.0, 0.0, 0.0, 0.2, 0.3, 0.0, 0.0,
    ];
    let t = (0..d.len()).map(|i| i as f64 / 10.0).collect();
    series(&[(COL_DIAMETER, d), (COL_TIME, t)])
}

// ---------------------------------------------------------------------------
// Run-length blocks
// ---------------------------------------------------------------------------

#[test]
fn test_continuous_nonzero_blocks() {
    assert_eq!(
        continuous_nonzero(&RUN_VALUES),
        vec![[1, 6], [10, 13], [15, 16]]
    );
}

#[test]
fn test_continuous_zero_blocks() {
    assert_eq!(continuous_zero(&RUN_VALUES), vec![[0, 1], [6, 10], [13, 15]]);
}

#[test]
fn test_blocks_are_complementary() {
    let mut all: Vec<[usize; 2]> = continuous_zero(&RUN_VALUES);
    all.extend(continuous_nonzero(&RUN_VALUES));
    all.sort();
    let covered: usize = all.iter().map(|b| b[1] - b[0]).sum();
    assert_eq!(covered, RUN_VALUES.len());
    for pair in all.windows(2) {
        assert_eq!(pair[0][1], pair[1][0]);
    }
}

#[test]
fn test_integer_sequences() {
    assert_eq!(continuous_zero(&[0u64, 0, 5, 0]), vec![[0, 2], [3, 4]]);
    assert_eq!(continuous_nonzero(&[0i32, -1, -2, 0]), vec![[1, 3]]);
}

#[test]
fn test_longest_zero_block() {
    let blocks = continuous_zero(&RUN_VALUES);
    assert_eq!(longest_block(&blocks), Some(1));
}

// ---------------------------------------------------------------------------
// Truncation
// ---------------------------------------------------------------------------

#[test]
fn test_truncate_before_dropout() {
    let mut s = dropout_series();
    truncate_data(&mut s, Truncation::BeforeDropout).unwrap();
    assert_eq!(s.len(), 8);
    assert_eq!(
        s.numeric(COL_DIAMETER).unwrap(),
        &[1.0, 0.9, 0.0, 0.8, 0.5, 0.2, 0.1, 0.01]
    );
    assert_relative_eq!(s.numeric(COL_TIME).unwrap()[7], 0.7);
}

#[test]
fn test_truncate_after_dropout() {
    let mut s = dropout_series();
    truncate_data(&mut s, Truncation::AfterDropout).unwrap();
    assert_eq!(s.len(), 13);
    assert_eq!(s.numeric(COL_DIAMETER).unwrap()[12], 0.0);
}

#[test]
fn test_truncate_without_zero_keeps_everything() {
    let mut s = series(&[(COL_DIAMETER, vec![1.0, 0.5, 0.2]), (COL_TIME, vec![0.0, 0.1, 0.2])]);
    truncate_data(&mut s, Truncation::BeforeDropout).unwrap();
    assert_eq!(s.len(), 3);
}

#[test]
fn test_truncate_requires_diameter() {
    let mut s = series(&[(COL_TIME, vec![0.0, 0.1])]);
    let err = truncate_data(&mut s, Truncation::BeforeDropout).unwrap_err();
    assert!(matches!(err, DoserError::MissingColumn(ref c) if c == COL_DIAMETER));
    assert_eq!(err.to_string(), "column D/D0 must be present in dataset");
}

// ---------------------------------------------------------------------------
// Strain rate
// ---------------------------------------------------------------------------

#[test]
fn test_strain_rate_values() {
    let d = vec![1.0, 0.9, 0.8, 0.5, 0.2, 0.1];
    let t: Vec<f64> = (0..6).map(|i| i as f64 / 10.0).collect();
    let mut s = series(&[(COL_DIAMETER, d.clone()), (COL_TIME, t.clone())]);
    add_strain_rate(&mut s).unwrap();

    let rate = s.numeric(COL_STRAIN_RATE).unwrap();
    assert_eq!(rate.len(), 6);
    assert_relative_eq!(rate[0], 2.0, epsilon = 1e-9);
    assert_relative_eq!(rate[5], 20.0, epsilon = 1e-9);
    for i in 1..5 {
        let expected = -2.0 * (d[i + 1] - d[i - 1]) / (t[i + 1] - t[i - 1]) / d[i];
        assert_relative_eq!(rate[i], expected, epsilon = 1e-9);
    }
}

#[test]
fn test_strain_rate_drops_non_finite_rows() {
    let d = vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0];
    let t: Vec<f64> = (0..8).map(|i| i as f64 / 10.0).collect();
    let mut s = series(&[(COL_DIAMETER, d), (COL_TIME, t)]);
    add_strain_rate(&mut s).unwrap();

    assert_eq!(s.len(), 5);
    assert_eq!(s.numeric(COL_DIAMETER).unwrap(), &[1.0; 5]);
    let time = s.numeric(COL_TIME).unwrap();
    for (got, want) in time.iter().zip([0.0, 0.1, 0.2, 0.6, 0.7]) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
    let rate = s.numeric(COL_STRAIN_RATE).unwrap();
    for (got, want) in rate.iter().zip([0.0, 0.0, 10.0, -10.0, 0.0]) {
        assert_relative_eq!(*got, want, epsilon = 1e-9);
    }
}

#[test]
fn test_strain_rate_missing_columns() {
    let mut s = series(&[(COL_TIME, vec![0.0, 0.1])]);
    assert!(matches!(
        add_strain_rate(&mut s),
        Err(DoserError::MissingColumn(ref c)) if c == COL_DIAMETER
    ));
    let mut s = series(&[(COL_DIAMETER, vec![1.0, 0.5])]);
    assert!(matches!(
        add_strain_rate(&mut s),
        Err(DoserError::MissingColumn(ref c)) if c == COL_TIME
    ));
}

// ---------------------------------------------------------------------------
// Critical time
// ---------------------------------------------------------------------------

fn critical_series() -> doser_core::signal::TimeSeries {
    let d = vec![1.0, 0.9, 0.8, 0.5, 0.2, 0.1, 0.01];
    let t: Vec<f64> = (0..7).map(|i| i as f64 / 10.0).collect();
    let mut s = series(&[(COL_DIAMETER, d), (COL_TIME, t)]);
    add_strain_rate(&mut s).unwrap();
    s
}

#[test]
fn test_closest_index_for_value() {
    let s = series(&[("x", vec![-1.0, 0.0, 1.0, 2.0])]);
    assert_eq!(closest_index_for_value(&s, "x", 1.1).unwrap(), 2);
    assert_eq!(closest_index_for_value(&s, "x", 1.8).unwrap(), 3);
}

#[test]
fn test_closest_index_non_numeric_column() {
    let mut s = series(&[("x", vec![1.0])]);
    s.fill_text("name", "one").unwrap();
    assert!(matches!(
        closest_index_for_value(&s, "name", 1.0),
        Err(DoserError::NonNumericColumn(_))
    ));
}

#[test]
fn test_critical_time_values() {
    let mut s = critical_series();
    let point = add_critical_time(&mut s, [0.3, 0.07]).unwrap();
    assert_eq!(point.index, 4);
    assert_relative_eq!(point.tc, 0.4);
    assert_relative_eq!(point.dtc_d0, 0.2);

    assert!(s.numeric(COL_TC).unwrap().iter().all(|&v| v == point.tc));
    assert!(s.numeric(COL_DTC).unwrap().iter().all(|&v| v == point.dtc_d0));
    let time = s.numeric(COL_TIME).unwrap().to_vec();
    let shifted = s.numeric(COL_T_MINUS_TC).unwrap();
    for (t, dt) in time.iter().zip(shifted) {
        assert_relative_eq!(*dt, t - 0.4, epsilon = 1e-12);
    }
}

#[test]
fn test_critical_time_empty_window() {
    let mut s = critical_series();
    // Both bounds map to the same row.
    let err = add_critical_time(&mut s, [0.5, 0.5]).unwrap_err();
    assert!(matches!(err, DoserError::EmptyCriticalWindow { .. }));
}

#[test]
fn test_critical_time_missing_columns() {
    let t: Vec<f64> = (0..3).map(|i| i as f64).collect();
    let mut s = series(&[(COL_TIME, t.clone()), (COL_STRAIN_RATE, vec![0.0; 3])]);
    assert!(matches!(
        add_critical_time(&mut s, [0.3, 0.07]),
        Err(DoserError::MissingColumn(ref c)) if c == COL_DIAMETER
    ));
    let mut s = series(&[(COL_DIAMETER, vec![1.0, 0.5, 0.1]), (COL_STRAIN_RATE, vec![0.0; 3])]);
    assert!(matches!(
        add_critical_time(&mut s, [0.3, 0.07]),
        Err(DoserError::MissingColumn(ref c)) if c == COL_TIME
    ));
    let mut s = series(&[(COL_DIAMETER, vec![1.0, 0.5, 0.1]), (COL_TIME, t)]);
    assert!(matches!(
        add_critical_time(&mut s, [0.3, 0.07]),
        Err(DoserError::MissingColumn(ref c)) if c == COL_STRAIN_RATE
    ));
}

// ---------------------------------------------------------------------------
// Full conditioning
// ---------------------------------------------------------------------------

#[test]
fn test_condition_runs_every_stage() {
    let d = vec![0.5, 0.4, 0.3, 0.2, 0.1, 0.0, 0.0, 0.0];
    let t: Vec<f64> = (0..8).map(|i| i as f64 / 1000.0).collect();
    let mut s = series(&[(COL_TIME, t), (COL_DIAMETER, d)]);
    let point = condition(&mut s, &SignalConfig::default()).unwrap();

    assert_eq!(s.len(), 5);
    assert_eq!(point.index, 3);
    assert_relative_eq!(point.tc, 0.003);
    assert_relative_eq!(point.dtc_d0, 0.2);
    let names: Vec<&str> = s.column_names().collect();
    assert_eq!(
        names,
        vec![COL_TIME, COL_DIAMETER, COL_STRAIN_RATE, COL_TC, COL_T_MINUS_TC, COL_DTC]
    );
}
