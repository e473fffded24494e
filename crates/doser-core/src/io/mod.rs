pub mod image_io;
pub mod output;
pub mod params;
pub mod sequence;
pub mod ser;
pub mod series_io;

use std::path::Path;

use crate::error::Result;
use crate::frame::{Frame, SourceInfo};

pub use output::{ExistingPolicy, ImageFolders};
pub use params::{read_params, write_params, ImageParams};
pub use sequence::ImageSequence;
pub use ser::SerReader;
pub use series_io::{read_series, write_series};

/// An ordered, indexed sequence of single-channel frames.
pub trait VideoSource: Send + Sync {
    fn frame_count(&self) -> usize;

    /// `(height, width)` of every frame.
    fn dimensions(&self) -> (usize, usize);

    fn read_frame(&self, index: usize) -> Result<Frame>;

    fn info(&self) -> SourceInfo;

    /// Read every frame, in order.
    fn read_all(&self) -> Result<Vec<Frame>> {
        (0..self.frame_count()).map(|i| self.read_frame(i)).collect()
    }
}

/// Open a video: a `.ser` file, or a folder of `extension` image files.
pub fn open_video(path: &Path, extension: &str) -> Result<Box<dyn VideoSource>> {
    let is_ser = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ser"));
    if path.is_file() && is_ser {
        Ok(Box::new(SerReader::open(path)?))
    } else {
        Ok(Box::new(ImageSequence::open(path, extension)?))
    }
}
