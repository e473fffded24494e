use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::calibration::background::{build_background, top_border, BackgroundImage};
use crate::calibration::geometry::{calibrate, Calibration};
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::detection::binarize::{binarize_frame, BinarizedFrame};
use crate::detection::diameter::{min_diameter, DiameterWindow};
use crate::error::{DoserError, Result};
use crate::frame::Frame;
use crate::io::image_io::{load_binary, save_binary_png, save_tiff16};
use crate::io::output::{frame_file_name, series_csv_path, ExistingPolicy, ImageFolders};
use crate::io::params::{read_params, write_params, ImageParams};
use crate::io::sequence::list_frames;
use crate::io::series_io::write_series;
use crate::io::{open_video, VideoSource};
use crate::signal::table::{DiameterSample, TimeSeries};

use super::config::{OutputConfig, PipelineConfig};
use super::types::{PipelineStage, ProgressReporter, UnitStatus};

/// Everything derived from the background video of a pair: shared read-only
/// by every experimental frame.
#[derive(Clone, Debug)]
pub struct PairModel {
    pub calibration: Calibration,
    pub background: BackgroundImage,
    /// First row of the diameter window inside the crop.
    pub window_top: usize,
}

impl PairModel {
    pub fn window(&self) -> DiameterWindow {
        DiameterWindow::full_width(self.window_top, self.calibration.crop.width())
    }

    pub fn params(&self, fps: Option<f64>) -> ImageParams {
        ImageParams {
            calibration: self.calibration,
            window_top: self.window_top,
            fps,
        }
    }
}

/// Calibrate on the first background frame, then build the background
/// median inside the crop and find the top of the diameter window.
pub fn build_pair_model(
    background: &dyn VideoSource,
    config: &PipelineConfig,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<PairModel> {
    reporter.begin_stage(PipelineStage::Reading, Some(background.frame_count()));
    let frames = background.read_all()?;
    reporter.finish_stage();
    let Some(reference) = frames.first() else {
        return Err(DoserError::EmptySequence);
    };

    reporter.begin_stage(PipelineStage::Calibrating, None);
    let calibration = calibrate(reference, &config.calibration)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::BuildingBackground, Some(frames.len()));
    let background = build_background(
        &frames,
        &calibration.crop,
        config.calibration.sensor_bit_depth,
        &config.background,
    )?;
    let window_top = top_border(&background);
    reporter.finish_stage();

    info!(
        nozzle_diameter = calibration.nozzle_diameter,
        window_top,
        crop = ?calibration.crop,
        "Pair model ready"
    );
    Ok(PairModel {
        calibration,
        background,
        window_top,
    })
}

/// Binarize one experimental frame and measure its minimum diameter in
/// pixels. Pure: nothing touches the filesystem.
pub fn measure_frame(
    frame: &Frame,
    model: &PairModel,
    config: &PipelineConfig,
) -> Result<(BinarizedFrame, f64)> {
    let binarized = binarize_frame(
        frame,
        &model.calibration.crop,
        &model.background,
        config.calibration.sensor_bit_depth,
    )?;
    let diameter = min_diameter(&binarized.binary, &model.window(), &config.profile);
    Ok((binarized, diameter))
}

/// Writes the per-frame images of one video.
#[derive(Clone, Debug)]
pub struct FrameSink {
    folders: ImageFolders,
    write_bin: bool,
    write_crop: bool,
    write_bg_sub: bool,
}

impl FrameSink {
    /// Create the image folders. With [`ExistingPolicy::Skip`], a folder
    /// that already existed is left untouched; with
    /// [`ExistingPolicy::Overwrite`] it is emptied and written again.
    pub fn prepare(folders: ImageFolders, output: &OutputConfig) -> Result<Self> {
        let [bin, crop, bg_sub] =
            folders.prepare(output.save_crop, output.save_bg_sub, output.existing)?;
        let fresh = |existed: bool| !existed || output.existing == ExistingPolicy::Overwrite;
        Ok(Self {
            write_bin: fresh(bin),
            write_crop: output.save_crop && fresh(crop),
            write_bg_sub: output.save_bg_sub && fresh(bg_sub),
            folders,
        })
    }

    pub fn folders(&self) -> &ImageFolders {
        &self.folders
    }

    /// Whether binaries are (re)written, and with them the parameter sidecar.
    pub fn writes_binaries(&self) -> bool {
        self.write_bin
    }

    pub fn save(&self, index: usize, frame: &BinarizedFrame) -> Result<()> {
        if self.write_bin {
            save_binary_png(&frame.binary, &self.folders.bin().join(frame_file_name(index, "png")))?;
        }
        if self.write_crop {
            save_tiff16(&frame.cropped, &self.folders.crop().join(frame_file_name(index, "tiff")))?;
        }
        if self.write_bg_sub {
            save_tiff16(
                &frame.subtracted,
                &self.folders.bg_sub().join(frame_file_name(index, "tiff")),
            )?;
        }
        Ok(())
    }
}

/// Measure every frame of `experiment`, in frame order.
///
/// Frames are independent; with `parallel_frames` they are processed on the
/// rayon pool. When a sink is given each frame's images are written after
/// it is measured.
pub fn extract_samples(
    experiment: &dyn VideoSource,
    model: &PairModel,
    config: &PipelineConfig,
    sink: Option<&FrameSink>,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<Vec<DiameterSample>> {
    let total = experiment.frame_count();
    reporter.begin_stage(PipelineStage::Binarizing, Some(total));

    let process = |index: usize| -> Result<DiameterSample> {
        let frame = experiment.read_frame(index)?;
        let (binarized, diameter_px) = measure_frame(&frame, model, config)?;
        if let Some(sink) = sink {
            sink.save(index, &binarized)?;
        }
        reporter.advance(1);
        Ok(DiameterSample {
            frame_index: index,
            diameter_px,
        })
    };

    let samples = if config.output.parallel_frames && total >= PARALLEL_FRAME_THRESHOLD {
        (0..total)
            .into_par_iter()
            .map(process)
            .collect::<Result<Vec<_>>>()?
    } else {
        (0..total).map(process).collect::<Result<Vec<_>>>()?
    };
    reporter.finish_stage();
    Ok(samples)
}

/// Result of running one video pair end to end.
#[derive(Clone, Debug)]
pub struct PairExtraction {
    pub model: PairModel,
    pub series: TimeSeries,
}

/// Run one experiment/background pair into a raw `time (s)`, `D/D0`
/// series. With `images_root`, binaries (and optional intermediates) go to
/// `<images_root>/<name>/` together with the parameter sidecar.
pub fn extract_pair(
    name: &str,
    experiment: &Path,
    background: &Path,
    fps: f64,
    images_root: Option<&Path>,
    config: &PipelineConfig,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<PairExtraction> {
    if fps.is_nan() || fps <= 0.0 {
        return Err(DoserError::InvalidParameter {
            key: "fps".into(),
            value: fps.to_string(),
        });
    }
    info!(name, experiment = %experiment.display(), background = %background.display(), "Processing pair");

    let extension = config.output.image_extension.as_str();
    let background_video = open_video(background, extension)?;
    let experiment_video = open_video(experiment, extension)?;
    let model = build_pair_model(background_video.as_ref(), config, reporter)?;

    let sink = match images_root {
        Some(root) => Some(FrameSink::prepare(ImageFolders::new(root, name), &config.output)?),
        None => None,
    };

    let samples = extract_samples(
        experiment_video.as_ref(),
        &model,
        config,
        sink.as_ref(),
        reporter,
    )?;

    // A kept `bin` folder keeps the sidecar it was measured with.
    if let Some(sink) = sink.as_ref().filter(|s| s.writes_binaries()) {
        reporter.begin_stage(PipelineStage::Writing, None);
        write_params(&sink.folders().root, &model.params(Some(fps)))?;
        reporter.finish_stage();
    }

    let series = TimeSeries::from_samples(&samples, model.calibration.nozzle_diameter, fps);
    debug!(name, rows = series.len(), "Extracted series");
    Ok(PairExtraction { model, series })
}

/// Measure the saved binaries of one processed video again, using its
/// parameter sidecar. `fps` overrides the sidecar's frame rate.
pub fn binaries_to_series(
    images_location: &Path,
    fps: Option<f64>,
    config: &PipelineConfig,
) -> Result<TimeSeries> {
    let params = read_params(images_location)?;
    let fps = fps.or(params.fps).ok_or_else(|| DoserError::MissingParameter {
        key: "fps".into(),
        path: images_location.display().to_string(),
    })?;

    let bin_folder = ImageFolders {
        root: images_location.to_path_buf(),
    }
    .bin();
    let paths = list_frames(&bin_folder, "png")?;

    let mut samples = Vec::with_capacity(paths.len());
    let mut window: Option<DiameterWindow> = None;
    for (index, path) in paths.iter().enumerate() {
        let binary = load_binary(path)?;
        // The window spans the width of the first binary.
        let window =
            *window.get_or_insert_with(|| DiameterWindow::full_width(params.window_top, binary.width()));
        samples.push(DiameterSample {
            frame_index: index,
            diameter_px: min_diameter(&binary, &window, &config.profile),
        });
    }

    Ok(TimeSeries::from_samples(
        &samples,
        params.calibration.nozzle_diameter,
        fps,
    ))
}

/// [`binaries_to_series`], written to `<csv_root>/<folder name>.csv`.
pub fn binaries_to_csv(
    images_location: &Path,
    csv_root: &Path,
    fps: Option<f64>,
    config: &PipelineConfig,
) -> Result<(UnitStatus, PathBuf)> {
    let name = folder_name(images_location);
    let csv_path = series_csv_path(csv_root, &name);
    if !config.output.existing.should_write(&csv_path) {
        warn!(path = %csv_path.display(), "CSV exists, skipping");
        return Ok((UnitStatus::Skipped, csv_path));
    }
    let series = binaries_to_series(images_location, fps, config)?;
    std::fs::create_dir_all(csv_root)?;
    write_series(&series, &csv_path)?;
    info!(path = %csv_path.display(), rows = series.len(), "Saved CSV");
    Ok((UnitStatus::Done, csv_path))
}

pub(super) fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
