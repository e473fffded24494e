use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use ndarray::Array2;

use crate::error::{DoserError, Result};
use crate::frame::{Frame, SourceInfo, SourceKind};

use super::VideoSource;

/// A video stored as a folder of single-channel image files, one per frame.
#[derive(Clone, Debug)]
pub struct ImageSequence {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    height: usize,
    width: usize,
    bit_depth: u8,
}

impl ImageSequence {
    /// List the frames of `dir` with the given extension (case-insensitive),
    /// in natural filename order, and probe the first one for its shape.
    pub fn open(dir: &Path, extension: &str) -> Result<Self> {
        let paths = list_frames(dir, extension)?;
        let Some(first) = paths.first() else {
            return Err(DoserError::EmptySequence);
        };
        let probe = load_frame(first)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            height: probe.height(),
            width: probe.width(),
            bit_depth: probe.bit_depth,
            paths,
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl VideoSource for ImageSequence {
    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        let path = self.paths.get(index).ok_or(DoserError::FrameIndexOutOfRange {
            index,
            total: self.paths.len(),
        })?;
        let frame = load_frame(path)?;
        if frame.data.dim() != (self.height, self.width) {
            return Err(DoserError::ShapeMismatch {
                expected: (self.height, self.width),
                actual: frame.data.dim(),
            });
        }
        Ok(frame.with_index(index))
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            path: self.dir.clone(),
            kind: SourceKind::ImageSequence,
            total_frames: self.paths.len(),
            width: self.width as u32,
            height: self.height as u32,
            bit_depth: self.bit_depth,
        }
    }
}

/// Files in `dir` whose extension matches, sorted naturally.
pub fn list_frames(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let wanted = extension.trim_start_matches('.');
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
        })
        .collect();
    paths.sort_by(|a, b| {
        let a = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let b = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        natural_cmp(&a, &b)
    });
    Ok(paths)
}

/// Decode one image file into a frame without rescaling its samples.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    let (data, bit_depth) = match img {
        DynamicImage::ImageLuma16(buf) => {
            let (w, h) = buf.dimensions();
            (to_array(w, h, buf.into_raw())?, 16)
        }
        DynamicImage::ImageLuma8(buf) => {
            let (w, h) = buf.dimensions();
            let raw = buf.into_raw().into_iter().map(u16::from).collect();
            (to_array(w, h, raw)?, 8)
        }
        other => {
            let buf = other.to_luma16();
            let (w, h) = buf.dimensions();
            (to_array(w, h, buf.into_raw())?, 16)
        }
    };
    Ok(Frame::new(data, bit_depth))
}

fn to_array(width: u32, height: u32, raw: Vec<u16>) -> Result<Array2<u16>> {
    Array2::from_shape_vec((height as usize, width as usize), raw)
        .map_err(|_| DoserError::InvalidDimensions { width, height })
}

/// Compare names so embedded numbers sort by value: `f2` before `f10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_digits(&mut a);
                let nb = take_digits(&mut b);
                let ta = na.trim_start_matches('0');
                let tb = nb.trim_start_matches('0');
                let ord = ta
                    .len()
                    .cmp(&tb.len())
                    .then_with(|| ta.cmp(tb))
                    .then_with(|| na.len().cmp(&nb.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()).then(x.cmp(&y));
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}
