use crate::consts::{COL_DIAMETER, COL_TIME};
use crate::error::{DoserError, Result};

/// Raw measurement of one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiameterSample {
    pub frame_index: usize,
    pub diameter_px: f64,
}

/// One named column of a [`TimeSeries`].
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell rendered as text, the way it is written to CSV.
    pub fn cell(&self, row: usize) -> String {
        match self {
            Self::Numeric(v) => format_number(v[row]),
            Self::Text(v) => v[row].clone(),
        }
    }

    fn truncate(&mut self, len: usize) {
        match self {
            Self::Numeric(v) => v.truncate(len),
            Self::Text(v) => v.truncate(len),
        }
    }

    fn retain(&mut self, keep: &[bool]) {
        match self {
            Self::Numeric(v) => retain_by_mask(v, keep),
            Self::Text(v) => retain_by_mask(v, keep),
        }
    }

    fn empty_like(&self, len: usize) -> Self {
        match self {
            Self::Numeric(_) => Self::Numeric(vec![f64::NAN; len]),
            Self::Text(_) => Self::Text(vec![String::new(); len]),
        }
    }

    fn extend(&mut self, other: &Column) {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.extend_from_slice(b),
            (Self::Text(a), Self::Text(b)) => a.extend(b.iter().cloned()),
            (this, other) => {
                let mut text = this.to_text();
                text.extend(other.to_text());
                *this = Self::Text(text);
            }
        }
    }

    fn to_text(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.cell(i)).collect()
    }
}

fn retain_by_mask<T>(values: &mut Vec<T>, keep: &[bool]) {
    let mut i = 0;
    values.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
}

/// Shortest text that parses back to the same f64. NaN becomes an empty cell.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value}")
    }
}

/// Ordered table of equal-length named columns.
///
/// Rows are in frame order. Column order is insertion order and is kept
/// when the table is written out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeries {
    columns: Vec<(String, Column)>,
    rows: usize,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the raw `time (s)` / `D/D0` series of one video.
    pub fn from_samples(samples: &[DiameterSample], nozzle_diameter: usize, fps: f64) -> Self {
        let time = samples
            .iter()
            .map(|s| s.frame_index as f64 / fps)
            .collect();
        let diameter = samples
            .iter()
            .map(|s| s.diameter_px / nozzle_diameter as f64)
            .collect();
        let mut series = Self::new();
        series.columns.push((COL_TIME.to_string(), Column::Numeric(time)));
        series
            .columns
            .push((COL_DIAMETER.to_string(), Column::Numeric(diameter)));
        series.rows = samples.len();
        series
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Borrow a numeric column, failing if it is absent or holds text.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column::Numeric(values)) => Ok(values),
            Some(Column::Text(_)) => Err(DoserError::NonNumericColumn(name.to_string())),
            None => Err(DoserError::MissingColumn(name.to_string())),
        }
    }

    /// Fail with `MissingColumn` for the first absent name.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|n| !self.has_column(n)) {
            Some(missing) => Err(DoserError::MissingColumn((*missing).to_string())),
            None => Ok(()),
        }
    }

    /// Insert or replace a column. The first column fixes the row count.
    pub fn set_column(&mut self, name: &str, column: Column) -> Result<()> {
        if self.columns.is_empty() {
            self.rows = column.len();
        } else if column.len() != self.rows {
            return Err(DoserError::ColumnLength {
                name: name.to_string(),
                expected: self.rows,
                actual: column.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name.to_string(), column)),
        }
        Ok(())
    }

    pub fn set_numeric(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        self.set_column(name, Column::Numeric(values))
    }

    /// Broadcast one value over every row.
    pub fn fill_numeric(&mut self, name: &str, value: f64) -> Result<()> {
        self.set_numeric(name, vec![value; self.rows])
    }

    pub fn fill_text(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_column(name, Column::Text(vec![value.to_string(); self.rows]))
    }

    /// Keep only the first `len` rows.
    pub fn truncate(&mut self, len: usize) {
        let len = len.min(self.rows);
        for (_, column) in &mut self.columns {
            column.truncate(len);
        }
        self.rows = len;
    }

    /// Keep rows whose mask entry is `true`; row order is preserved.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.rows);
        for (_, column) in &mut self.columns {
            column.retain(keep);
        }
        self.rows = keep.iter().filter(|&&k| k).count();
    }

    /// Append the rows of `other`. Columns missing on either side are
    /// padded with NaN (numeric) or empty text.
    pub fn append(&mut self, other: &TimeSeries) {
        let before = self.rows;
        for (name, column) in &other.columns {
            if !self.has_column(name) {
                let pad = column.empty_like(before);
                self.columns.push((name.clone(), pad));
            }
        }
        for (name, column) in &mut self.columns {
            match other.column(name) {
                Some(incoming) => column.extend(incoming),
                None => {
                    let pad = column.empty_like(other.rows);
                    column.extend(&pad);
                }
            }
        }
        self.rows = before + other.rows;
    }
}
