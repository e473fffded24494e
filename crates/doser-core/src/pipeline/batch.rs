use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::consts::BIN_FOLDER;
use crate::error::{DoserError, Result};
use crate::io::output::{series_csv_path, ExistingPolicy, ImageFolders};
use crate::io::params::read_params;
use crate::io::series_io::{read_series, write_series};
use crate::naming::pairing::{select_video_pairs, VideoPair};
use crate::naming::tags::{parse_fname, FilenameTags, NameFormat, TagValue};
use crate::signal::conditioner::condition;
use crate::signal::table::TimeSeries;

use super::config::PipelineConfig;
use super::extract::{binaries_to_csv, extract_pair, folder_name};
use super::types::{BatchReport, PipelineStage, ProgressReporter, UnitOutcome, UnitStatus};

/// Tags of an output name (a name without `vtype` and `remove` tokens).
pub fn output_name_tags(name: &str, config: &PipelineConfig) -> Result<FilenameTags> {
    let naming = &config.naming;
    let output_format = naming.output_format();
    let format = NameFormat {
        fname_format: &output_format,
        ..naming.name_format()
    };
    parse_fname(name, &format)
}

/// Frame rate of a video: the configured override, else its `fps` tag.
pub fn resolve_fps(name: &str, config: &PipelineConfig) -> Result<f64> {
    if let Some(fps) = config.output.fps {
        return Ok(fps);
    }
    output_name_tags(name, config)?
        .fps()
        .ok_or_else(|| DoserError::MissingParameter {
            key: "fps".into(),
            path: name.to_string(),
        })
}

fn outcome(name: &str, result: Result<(UnitStatus, Option<PathBuf>)>) -> UnitOutcome {
    match result {
        Ok((status, output)) => UnitOutcome {
            name: name.to_string(),
            output,
            status,
        },
        Err(e) => {
            error!(name, error = %e, "Unit failed");
            UnitOutcome {
                name: name.to_string(),
                output: None,
                status: UnitStatus::Failed(e.to_string()),
            }
        }
    }
}

/// Run `work` over `items` on the rayon pool, collecting one outcome each
/// in input order.
fn run_units<T: Sync>(
    items: &[T],
    stage: PipelineStage,
    reporter: &Arc<dyn ProgressReporter>,
    name_of: impl Fn(&T) -> String + Sync,
    work: impl Fn(&T) -> Result<(UnitStatus, Option<PathBuf>)> + Sync,
) -> BatchReport {
    reporter.begin_stage(stage, Some(items.len()));
    let units = items
        .par_iter()
        .map(|item| {
            let name = name_of(item);
            let result = outcome(&name, work(item));
            reporter.advance(1);
            result
        })
        .collect();
    reporter.finish_stage();
    BatchReport { units }
}

fn pair_folders_exist(folders: &ImageFolders, config: &PipelineConfig) -> bool {
    folders.bin().is_dir()
        && (!config.output.save_crop || folders.crop().is_dir())
        && (!config.output.save_bg_sub || folders.bg_sub().is_dir())
}

/// Binarize every experiment video of `videos_root` into
/// `<images_root>/<name>/bin`, with the parameter sidecar beside it.
pub fn videos_to_binaries(
    videos_root: &Path,
    images_root: &Path,
    config: &PipelineConfig,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<BatchReport> {
    let pairs = select_video_pairs(videos_root, &config.naming)?;
    info!(count = pairs.len(), "Processing videos to binaries");
    let silent: Arc<dyn ProgressReporter> = Arc::new(super::types::NoOpReporter);

    let report = run_units(
        &pairs,
        PipelineStage::Binarizing,
        reporter,
        |pair: &VideoPair| pair.name.clone(),
        |pair| {
            let folders = ImageFolders::new(images_root, &pair.name);
            if config.output.existing == ExistingPolicy::Skip && pair_folders_exist(&folders, config) {
                warn!(name = pair.name.as_str(), "Image folders exist, skipping");
                return Ok((UnitStatus::Skipped, Some(folders.root)));
            }
            let fps = resolve_fps(&pair.name, config)?;
            extract_pair(
                &pair.name,
                &pair.experiment,
                &pair.background,
                fps,
                Some(images_root),
                config,
                &silent,
            )?;
            Ok((UnitStatus::Done, Some(folders.root)))
        },
    );
    info!(done = report.done(), skipped = report.skipped(), failed = report.failed(), "Finished processing videos");
    Ok(report)
}

/// Subfolders of `images_root` holding a `bin` folder, sorted by name.
fn processed_folders(images_root: &Path) -> Result<Vec<PathBuf>> {
    let mut folders: Vec<PathBuf> = std::fs::read_dir(images_root)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.join(BIN_FOLDER).is_dir())
        .collect();
    folders.sort();
    Ok(folders)
}

/// Measure the saved binaries of every processed folder into one CSV each.
pub fn binaries_to_csvs(
    images_root: &Path,
    csv_root: &Path,
    config: &PipelineConfig,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<BatchReport> {
    let folders = processed_folders(images_root)?;
    info!(count = folders.len(), "Measuring binaries");
    std::fs::create_dir_all(csv_root)?;

    let report = run_units(
        &folders,
        PipelineStage::Measuring,
        reporter,
        |path: &PathBuf| folder_name(path),
        |path| {
            let name = folder_name(path);
            // Override, then sidecar, then the folder name's own tag.
            let fps = match config.output.fps {
                Some(fps) => Some(fps),
                None if read_params(path)?.fps.is_some() => None,
                None => Some(resolve_fps(&name, config)?),
            };
            let (status, csv) = binaries_to_csv(path, csv_root, fps, config)?;
            Ok((status, Some(csv)))
        },
    );
    info!(done = report.done(), skipped = report.skipped(), failed = report.failed(), "Finished measuring binaries");
    Ok(report)
}

/// Videos straight to CSVs. With `images_root`, binaries and sidecars are
/// kept as well.
pub fn videos_to_csvs(
    videos_root: &Path,
    images_root: Option<&Path>,
    csv_root: &Path,
    config: &PipelineConfig,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<BatchReport> {
    let pairs = select_video_pairs(videos_root, &config.naming)?;
    info!(count = pairs.len(), "Processing videos to CSVs");
    std::fs::create_dir_all(csv_root)?;
    let silent: Arc<dyn ProgressReporter> = Arc::new(super::types::NoOpReporter);

    let report = run_units(
        &pairs,
        PipelineStage::Measuring,
        reporter,
        |pair: &VideoPair| pair.name.clone(),
        |pair| {
            let csv_path = series_csv_path(csv_root, &pair.name);
            if !config.output.existing.should_write(&csv_path) {
                warn!(path = %csv_path.display(), "CSV exists, skipping");
                return Ok((UnitStatus::Skipped, Some(csv_path)));
            }
            let fps = resolve_fps(&pair.name, config)?;
            let extraction = extract_pair(
                &pair.name,
                &pair.experiment,
                &pair.background,
                fps,
                images_root,
                config,
                &silent,
            )?;
            write_series(&extraction.series, &csv_path)?;
            Ok((UnitStatus::Done, Some(csv_path)))
        },
    );
    info!(done = report.done(), skipped = report.skipped(), failed = report.failed(), "Finished processing videos");
    Ok(report)
}

/// Attach the tags of `name` to every row as constant columns.
fn add_tag_columns(series: &mut TimeSeries, tags: &FilenameTags) -> Result<()> {
    for (key, value) in tags.iter() {
        match value {
            TagValue::Number(n) => series.fill_numeric(key, *n)?,
            TagValue::Text(t) => series.fill_text(key, t)?,
        }
    }
    Ok(())
}

/// Read one raw series, condition it and tag it with its file name.
pub fn csv_to_annotated(path: &Path, config: &PipelineConfig) -> Result<TimeSeries> {
    let name = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut series = read_series(path)?;
    condition(&mut series, &config.signal)?;
    match output_name_tags(&name, config) {
        Ok(tags) => add_tag_columns(&mut series, &tags)?,
        Err(e) => warn!(name, error = %e, "No tags attached"),
    }
    Ok(series)
}

/// Condition every `*.csv` of `csv_root` (sorted) and concatenate them into
/// one table written to `output`. Files that fail are reported and left out.
pub fn csvs_to_annotated(
    csv_root: &Path,
    output: &Path,
    config: &PipelineConfig,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<(TimeSeries, BatchReport)> {
    if !config.output.existing.should_write(output) {
        warn!(path = %output.display(), "Annotated CSV exists, skipping");
        return Ok((
            read_series(output)?,
            BatchReport {
                units: vec![UnitOutcome {
                    name: folder_name(output),
                    output: Some(output.to_path_buf()),
                    status: UnitStatus::Skipped,
                }],
            },
        ));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(csv_root)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .filter(|p| p.as_path() != output)
        .collect();
    files.sort();

    reporter.begin_stage(PipelineStage::Conditioning, Some(files.len()));
    let results: Vec<(PathBuf, Result<TimeSeries>)> = files
        .par_iter()
        .map(|path| {
            let result = csv_to_annotated(path, config);
            reporter.advance(1);
            (path.clone(), result)
        })
        .collect();
    reporter.finish_stage();

    let mut combined = TimeSeries::new();
    let mut units = Vec::with_capacity(results.len());
    for (path, result) in results {
        let name = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let result = result.map(|series| {
            combined.append(&series);
            (UnitStatus::Done, Some(path))
        });
        units.push(outcome(&name, result));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    write_series(&combined, output)?;
    info!(path = %output.display(), rows = combined.len(), "Saved annotated CSV");
    Ok((combined, BatchReport { units }))
}
