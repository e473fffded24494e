use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use doser_core::io::output::series_csv_path;
use doser_core::io::write_series;
use doser_core::pipeline::{extract_pair, resolve_fps, PipelineConfig, ProgressReporter};

use crate::progress::BarReporter;
use crate::summary::print_run_summary;

#[derive(Args)]
pub struct ExtractArgs {
    /// Experiment video: a SER file or a folder of frames
    pub experiment: PathBuf,

    /// Background video recorded for the same setup
    pub background: PathBuf,

    /// Frame rate; taken from the config or the experiment name when omitted
    #[arg(long)]
    pub fps: Option<f64>,

    /// Output name (default: the experiment file or folder name)
    #[arg(long)]
    pub name: Option<String>,

    /// Save binary frames and the parameter sidecar under this folder
    #[arg(long)]
    pub images: Option<PathBuf>,

    /// Write the series as `<name>.csv` into this folder
    #[arg(long, default_value = ".")]
    pub csv: PathBuf,
}

pub fn run(args: &ExtractArgs, config: &PipelineConfig) -> Result<()> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .experiment
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .context("Experiment path has no file name")?,
    };
    let fps = match args.fps {
        Some(fps) => fps,
        None => resolve_fps(&name, config)
            .with_context(|| format!("No frame rate for {name}; pass --fps"))?,
    };

    let mut inputs = vec![
        ("Experiment", args.experiment.as_path()),
        ("Background", args.background.as_path()),
        ("CSV folder", args.csv.as_path()),
    ];
    if let Some(images) = &args.images {
        inputs.push(("Images", images.as_path()));
    }
    print_run_summary("Doser Extract", &inputs, config);

    let reporter: Arc<dyn ProgressReporter> = Arc::new(BarReporter::new());
    let extraction = extract_pair(
        &name,
        &args.experiment,
        &args.background,
        fps,
        args.images.as_deref(),
        config,
        &reporter,
    )?;

    std::fs::create_dir_all(&args.csv)
        .with_context(|| format!("Failed to create {}", args.csv.display()))?;
    let csv_path = series_csv_path(&args.csv, &name);
    write_series(&extraction.series, &csv_path)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;

    println!(
        "Nozzle diameter {} px, {} frames at {} fps",
        extraction.model.calibration.nozzle_diameter,
        extraction.series.len(),
        fps
    );
    println!("Series saved to {}", csv_path.display());
    Ok(())
}
