use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use doser_core::pipeline::{csvs_to_annotated, PipelineConfig, ProgressReporter};

use crate::progress::BarReporter;
use crate::summary::{print_batch_report, print_run_summary};

#[derive(Args)]
pub struct ConditionArgs {
    /// Folder of raw `time (s)`, `D/D0` series CSVs
    pub csv_folder: PathBuf,

    /// Combined output table (default: `<csv-folder>/annotated.csv`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ConditionArgs, config: &PipelineConfig) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.csv_folder.join("annotated.csv"));

    print_run_summary(
        "Doser Condition",
        &[("CSV folder", args.csv_folder.as_path()), ("Output", output.as_path())],
        config,
    );

    let reporter: Arc<dyn ProgressReporter> = Arc::new(BarReporter::new());
    let (table, report) = csvs_to_annotated(&args.csv_folder, &output, config, &reporter)?;
    print_batch_report(&report);
    println!("\n{} rows saved to {}", table.len(), output.display());
    Ok(())
}
