use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use doser_core::pipeline::{
    binaries_to_csvs, csvs_to_annotated, videos_to_binaries, videos_to_csvs, BatchReport,
    PipelineConfig, ProgressReporter,
};

use crate::progress::BarReporter;
use crate::summary::{print_batch_report, print_run_summary};

#[derive(Args)]
pub struct BatchArgs {
    /// Folder of experiment and background videos (or of processed image
    /// folders with --from-binaries)
    pub videos: PathBuf,

    /// Save binary frames and sidecars under this folder
    #[arg(long)]
    pub images: Option<PathBuf>,

    /// Write one raw series CSV per video into this folder
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Also condition every CSV and write the combined table here
    #[arg(long)]
    pub annotated: Option<PathBuf>,

    /// Measure previously saved binaries instead of reading videos
    #[arg(long)]
    pub from_binaries: bool,
}

pub fn run(args: &BatchArgs, config: &PipelineConfig) -> Result<()> {
    if args.annotated.is_some() && args.csv.is_none() {
        bail!("--annotated needs --csv");
    }

    let mut inputs = vec![("Videos", args.videos.as_path())];
    for (label, path) in [("Images", &args.images), ("CSV folder", &args.csv), ("Annotated", &args.annotated)] {
        if let Some(path) = path {
            inputs.push((label, path.as_path()));
        }
    }
    print_run_summary("Doser Batch", &inputs, config);

    let reporter: Arc<dyn ProgressReporter> = Arc::new(BarReporter::new());
    let report: BatchReport = match (&args.csv, &args.images, args.from_binaries) {
        (Some(csv), _, true) => binaries_to_csvs(&args.videos, csv, config, &reporter)?,
        (Some(csv), images, false) => {
            videos_to_csvs(&args.videos, images.as_deref(), csv, config, &reporter)?
        }
        (None, Some(images), false) => videos_to_binaries(&args.videos, images, config, &reporter)?,
        (None, _, true) => bail!("--from-binaries needs --csv"),
        (None, None, false) => bail!("Nothing to write: pass --images and/or --csv"),
    };
    print_batch_report(&report);

    if let (Some(csv), Some(annotated)) = (&args.csv, &args.annotated) {
        let (table, report) = csvs_to_annotated(csv, annotated, config, &reporter)?;
        print_batch_report(&report);
        println!("\n{} rows saved to {}", table.len(), annotated.display());
    }

    Ok(())
}
