use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::calibration::geometry::{Calibration, CropBox};
use crate::error::{DoserError, Result};

const KEY_CROP_LEFT: &str = "crop_left";
const KEY_CROP_TOP: &str = "crop_top";
const KEY_CROP_RIGHT: &str = "crop_right";
const KEY_CROP_BOTTOM: &str = "crop_bottom";
const KEY_NOZZLE_DIAMETER: &str = "nozzle_diameter";
const KEY_WINDOW_TOP: &str = "window_top";
const KEY_FPS: &str = "fps";

/// Geometry saved next to the intermediate images of one video, enough to
/// measure the binaries again without recalibrating.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageParams {
    pub calibration: Calibration,
    /// First row of the diameter window, from the background's nozzle.
    pub window_top: usize,
    pub fps: Option<f64>,
}

/// `<folder>/<folder name>_params.csv`
pub fn params_path(images_location: &Path) -> PathBuf {
    let name = images_location
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    images_location.join(format!("{name}_params.csv"))
}

/// Write the sidecar as `Keys,Values` rows.
pub fn write_params(images_location: &Path, params: &ImageParams) -> Result<()> {
    let crop = params.calibration.crop;
    let mut rows = vec![
        (KEY_CROP_LEFT, crop.left.to_string()),
        (KEY_CROP_TOP, crop.top.to_string()),
        (KEY_CROP_RIGHT, crop.right.to_string()),
        (KEY_CROP_BOTTOM, crop.bottom.to_string()),
        (
            KEY_NOZZLE_DIAMETER,
            params.calibration.nozzle_diameter.to_string(),
        ),
        (KEY_WINDOW_TOP, params.window_top.to_string()),
    ];
    if let Some(fps) = params.fps {
        rows.push((KEY_FPS, fps.to_string()));
    }

    let mut writer = csv::Writer::from_path(params_path(images_location))?;
    writer.write_record(["Keys", "Values"])?;
    for (key, value) in rows {
        writer.write_record([key, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the sidecar written by [`write_params`]. The first value of a
/// repeated key wins.
pub fn read_params(images_location: &Path) -> Result<ImageParams> {
    let path = params_path(images_location);
    let mut reader = csv::Reader::from_path(&path)?;
    let mut values = BTreeMap::new();
    for record in reader.records() {
        let record = record?;
        if let (Some(key), Some(value)) = (record.get(0), record.get(1)) {
            values
                .entry(key.trim().to_string())
                .or_insert_with(|| value.trim().to_string());
        }
    }

    let sidecar = Sidecar {
        path: &path,
        values: &values,
    };
    let crop = CropBox {
        left: sidecar.require(KEY_CROP_LEFT)?,
        top: sidecar.require(KEY_CROP_TOP)?,
        right: sidecar.require(KEY_CROP_RIGHT)?,
        bottom: sidecar.require(KEY_CROP_BOTTOM)?,
    };
    Ok(ImageParams {
        calibration: Calibration {
            crop,
            nozzle_diameter: sidecar.require(KEY_NOZZLE_DIAMETER)?,
        },
        window_top: sidecar.require(KEY_WINDOW_TOP)?,
        fps: sidecar.optional(KEY_FPS)?,
    })
}

struct Sidecar<'a> {
    path: &'a Path,
    values: &'a BTreeMap<String, String>,
}

impl Sidecar<'_> {
    fn optional<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(raw) => parse_value(raw)
                .map(Some)
                .ok_or_else(|| DoserError::InvalidParameter {
                    key: key.to_string(),
                    value: raw.clone(),
                }),
        }
    }

    fn require<T: FromStr>(&self, key: &str) -> Result<T> {
        self.optional(key)?
            .ok_or_else(|| DoserError::MissingParameter {
                key: key.to_string(),
                path: self.path.display().to_string(),
            })
    }
}

/// Integers written by float-formatting tools come back as `40.0`.
fn parse_value<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse::<T>()
        .ok()
        .or_else(|| raw.strip_suffix(".0").and_then(|r| r.parse::<T>().ok()))
}
