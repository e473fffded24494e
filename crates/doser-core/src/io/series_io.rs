use std::path::Path;

use crate::error::Result;
use crate::signal::table::{Column, TimeSeries};

/// Write a series as CSV: one header row of column names, then one row per
/// sample. NaN cells are left empty.
pub fn write_series(series: &TimeSeries, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(series.column_names())?;
    let columns: Vec<&Column> = series.columns().map(|(_, c)| c).collect();
    for row in 0..series.len() {
        writer.write_record(columns.iter().map(|c| c.cell(row)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a series written by [`write_series`] or by a spreadsheet tool.
///
/// A column whose cells all parse as numbers (empty cells count as NaN) is
/// numeric, anything else is text. A leading unnamed column, as written by
/// tools that export a row index, is dropped.
pub fn read_series(path: &Path) -> Result<TimeSeries> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let mut series = TimeSeries::new();
    for (i, (name, values)) in headers.into_iter().zip(cells).enumerate() {
        if i == 0 && name.trim().is_empty() {
            continue;
        }
        series.set_column(&name, parse_column(values))?;
    }
    Ok(series)
}

fn parse_column(values: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = values
        .iter()
        .map(|v| {
            let v = v.trim();
            if v.is_empty() {
                Some(f64::NAN)
            } else {
                v.parse::<f64>().ok()
            }
        })
        .collect();
    match parsed {
        Some(numbers) => Column::Numeric(numbers),
        None => Column::Text(values),
    }
}
