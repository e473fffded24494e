#![allow(dead_code)]

use std::path::Path;

use doser_core::io::image_io::save_tiff16;
use doser_core::io::ser::SER_HEADER_SIZE;
use doser_core::signal::TimeSeries;
use ndarray::Array2;

/// Synthetic 12-bit camera frames: a bright backlight with a dark nozzle
/// at the top. Filaments hang from the nozzle to the bottom of the frame.
pub const FRAME_HEIGHT: usize = 100;
pub const FRAME_WIDTH: usize = 60;
pub const BRIGHT: u16 = 3000;
pub const DARK: u16 = 200;
/// Nozzle occupies rows `0..NOZZLE_ROWS` and columns `NOZZLE_LEFT..NOZZLE_RIGHT`.
pub const NOZZLE_ROWS: usize = 10;
pub const NOZZLE_LEFT: usize = 10;
pub const NOZZLE_RIGHT: usize = 50;
pub const NOZZLE_DIAMETER: usize = NOZZLE_RIGHT - NOZZLE_LEFT;
pub const FILAMENT_LEFT: usize = 20;

/// Filament widths in pixels of the synthetic experiment: thinning, then
/// broken for the last three frames.
pub const FILAMENT_WIDTHS: [usize; 8] = [20, 16, 12, 8, 4, 0, 0, 0];

/// Output name of the synthetic pair (default naming config).
pub const PAIR_NAME: &str = "20210929_6M-PEO_fps-1k_1";

/// Level of the inside of dark shapes, one step above their outline.
/// Otsu puts the top level of the dark class on the bright side, so only
/// the `DARK` outline columns are foreground and measured widths are kept.
pub const DARK_INTERIOR: u16 = DARK + 1;

/// Paint columns `left..right` of `rows` dark: `DARK` on the outer columns,
/// `DARK_INTERIOR` between them.
fn paint_dark(data: &mut Array2<u16>, rows: std::ops::Range<usize>, left: usize, right: usize) {
    for row in rows {
        for col in left..right {
            let edge = col == left || col + 1 == right;
            data[[row, col]] = if edge { DARK } else { DARK_INTERIOR };
        }
    }
}

pub fn background_frame() -> Array2<u16> {
    let mut data = Array2::from_elem((FRAME_HEIGHT, FRAME_WIDTH), BRIGHT);
    paint_dark(&mut data, 0..NOZZLE_ROWS, NOZZLE_LEFT, NOZZLE_RIGHT);
    data
}

/// Background plus a dark vertical band of `width` pixels below the nozzle.
pub fn filament_frame(width: usize) -> Array2<u16> {
    let mut data = background_frame();
    paint_dark(&mut data, NOZZLE_ROWS..FRAME_HEIGHT, FILAMENT_LEFT, FILAMENT_LEFT + width);
    data
}

/// Write frames as `frame<i>.tif` 16-bit TIFF files into `dir`.
pub fn write_frame_folder(dir: &Path, frames: &[Array2<u16>]) {
    std::fs::create_dir_all(dir).expect("create frame folder");
    for (i, frame) in frames.iter().enumerate() {
        save_tiff16(frame, &dir.join(format!("frame{i}.tif"))).expect("write frame");
    }
}

/// Create `<root>/<PAIR_NAME>_exp` and `<root>/<PAIR_NAME>_bg` video folders.
pub fn write_synthetic_pair(root: &Path) {
    write_synthetic_pair_named(root, PAIR_NAME);
}

pub fn write_synthetic_pair_named(root: &Path, name: &str) {
    let background: Vec<_> = (0..3).map(|_| background_frame()).collect();
    let experiment: Vec<_> = FILAMENT_WIDTHS.iter().map(|&w| filament_frame(w)).collect();
    write_frame_folder(&root.join(format!("{name}_bg")), &background);
    write_frame_folder(&root.join(format!("{name}_exp")), &experiment);
}

/// D/D0 expected for each synthetic experiment frame.
pub fn expected_diameters() -> Vec<f64> {
    FILAMENT_WIDTHS
        .iter()
        .map(|&w| w as f64 / NOZZLE_DIAMETER as f64)
        .collect()
}

/// Build a SER file header with configurable bit depth and color mode.
///
/// `color_id`: 0=MONO, 8=BAYER_RGGB, 100=RGB, 101=BGR
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID (4 bytes)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID (4 bytes)
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0 (little-endian data)
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope (40 bytes each)
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC (8 bytes each)
    buf.extend_from_slice(&[0u8; 16]);

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Complete mono 16-bit SER file holding `frames`.
pub fn build_ser_16bit(frames: &[Array2<u16>]) -> Vec<u8> {
    let (h, w) = frames.first().map(|f| f.dim()).unwrap_or((1, 1));
    let mut buf = build_ser_header_full(w as u32, h as u32, 12, frames.len(), 0);
    for frame in frames {
        for &v in frame.iter() {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }
    buf
}

/// Write a SER buffer to `path`.
pub fn write_ser(path: &Path, data: &[u8]) {
    std::fs::write(path, data).expect("write SER data");
}

/// Table from `(name, values)` numeric columns.
pub fn series(columns: &[(&str, Vec<f64>)]) -> TimeSeries {
    let mut series = TimeSeries::new();
    for (name, values) in columns {
        series.set_numeric(name, values.clone()).expect("column length");
    }
    series
}
