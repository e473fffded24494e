use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{DoserError, Result};
use crate::frame::{Frame, SourceInfo, SourceKind};

use super::VideoSource;

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// SER color ids carrying three interleaved planes.
const SER_COLOR_RGB: i32 = 100;
const SER_COLOR_BGR: i32 = 101;

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
}

impl SerHeader {
    /// Bytes per sample (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_sample(&self) -> usize {
        if self.pixel_depth <= 8 {
            1
        } else {
            2
        }
    }

    pub fn frame_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_sample())
    }
}

/// Memory-mapped SER file reader. Only single-plane (mono or raw Bayer)
/// recordings are accepted; samples are kept as recorded.
pub struct SerReader {
    mmap: Mmap,
    path: PathBuf,
    frame_size: usize,
    pub header: SerHeader,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the map is read-only and the file is not modified while open.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(DoserError::InvalidSer("File too small for SER header".into()));
        }
        if &mmap[0..14] != SER_MAGIC {
            return Err(DoserError::InvalidSer("Missing LUCAM-RECORDER magic".into()));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;
        if matches!(header.color_id, SER_COLOR_RGB | SER_COLOR_BGR) {
            return Err(DoserError::UnsupportedColorMode(format!(
                "SER color id {} (only single-channel recordings are supported)",
                header.color_id
            )));
        }

        let frame_size = header
            .frame_byte_size()
            .ok_or_else(|| DoserError::InvalidSer("Frame size overflows".into()))?;
        let expected = frame_size
            .checked_mul(header.frame_count as usize)
            .and_then(|d| d.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| DoserError::InvalidSer("File size overflows".into()))?;
        if mmap.len() < expected {
            return Err(DoserError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            path: path.to_path_buf(),
            frame_size,
            header,
        })
    }

    /// Raw bytes of a single frame (zero-copy from the map).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let count = self.header.frame_count as usize;
        if index >= count {
            return Err(DoserError::FrameIndexOutOfRange { index, total: count });
        }
        let offset = SER_HEADER_SIZE + index * self.frame_size;
        Ok(&self.mmap[offset..offset + self.frame_size])
    }
}

impl VideoSource for SerReader {
    fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.header.height as usize, self.header.width as usize)
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        let raw = self.frame_raw(index)?;
        let (h, w) = self.dimensions();
        let data = decode_mono_plane(
            raw,
            h,
            w,
            self.header.bytes_per_sample(),
            self.header.little_endian,
        );
        Ok(Frame::new(data, self.header.pixel_depth as u8).with_index(index))
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            path: self.path.clone(),
            kind: SourceKind::Ser,
            total_frames: self.frame_count(),
            width: self.header.width,
            height: self.header.height,
            bit_depth: self.header.pixel_depth as u8,
        }
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    if width == 0 || height == 0 {
        return Err(DoserError::InvalidDimensions { width, height });
    }
    if pixel_depth == 0 || pixel_depth > 16 {
        return Err(DoserError::InvalidSer(format!(
            "Unsupported pixel depth {pixel_depth}"
        )));
    }

    // Most writers put 0 here for little-endian data despite the format
    // document saying otherwise; only 1 is read as big-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

fn decode_mono_plane(
    raw: &[u8],
    height: usize,
    width: usize,
    bytes_per_sample: usize,
    little_endian: bool,
) -> Array2<u16> {
    let mut data = Array2::<u16>::zeros((height, width));
    for ((row, col), value) in data.indexed_iter_mut() {
        let idx = (row * width + col) * bytes_per_sample;
        *value = if bytes_per_sample == 1 {
            raw[idx] as u16
        } else {
            let pair = [raw[idx], raw[idx + 1]];
            if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        };
    }
    data
}
