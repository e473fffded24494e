use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{BG_SUB_FOLDER, BIN_FOLDER, CROP_FOLDER};
use crate::error::Result;

/// What to do when an output already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingPolicy {
    /// Keep the existing output and skip the work producing it.
    #[default]
    Skip,
    /// Recompute and replace it.
    Overwrite,
}

impl ExistingPolicy {
    /// Whether an output at `path` should be (re)written.
    pub fn should_write(self, path: &Path) -> bool {
        self == Self::Overwrite || !path.exists()
    }
}

impl fmt::Display for ExistingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "Skip"),
            Self::Overwrite => write!(f, "Overwrite"),
        }
    }
}

/// Folders holding the intermediate images of one processed video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFolders {
    pub root: PathBuf,
}

impl ImageFolders {
    /// `<images>/<name>`
    pub fn new(images_root: &Path, name: &str) -> Self {
        Self {
            root: images_root.join(name),
        }
    }

    pub fn bin(&self) -> PathBuf {
        self.root.join(BIN_FOLDER)
    }

    pub fn crop(&self) -> PathBuf {
        self.root.join(CROP_FOLDER)
    }

    pub fn bg_sub(&self) -> PathBuf {
        self.root.join(BG_SUB_FOLDER)
    }

    /// Create the folders that will be written. With
    /// [`ExistingPolicy::Overwrite`] an existing folder that will be written
    /// is emptied first, so no frame of an earlier run survives. Returns, in
    /// order, whether the `bin`, `crop` and `bg_sub` folders already existed.
    pub fn prepare(
        &self,
        save_crop: bool,
        save_bg_sub: bool,
        existing: ExistingPolicy,
    ) -> Result<[bool; 3]> {
        let mut existed = [false; 3];
        let wanted = [(self.bin(), true), (self.crop(), save_crop), (self.bg_sub(), save_bg_sub)];
        for (slot, (dir, create)) in existed.iter_mut().zip(wanted) {
            *slot = dir.is_dir();
            if !create {
                continue;
            }
            if *slot && existing == ExistingPolicy::Overwrite {
                debug!(path = %dir.display(), "Clearing previous frames");
                std::fs::remove_dir_all(&dir)?;
                std::fs::create_dir_all(&dir)?;
            } else if !*slot {
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(existed)
    }
}

/// Frame file name with a three-digit index: `007.png`.
pub fn frame_file_name(index: usize, extension: &str) -> String {
    format!("{index:03}.{extension}")
}

/// `<csv folder>/<name>.csv`
pub fn series_csv_path(csv_root: &Path, name: &str) -> PathBuf {
    csv_root.join(format!("{name}.csv"))
}
