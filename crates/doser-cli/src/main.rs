mod commands;
mod progress;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doser_core::pipeline::PipelineConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "doser", about = "Capillary thinning video analysis tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pipeline config file (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads for batch and frame parallelism (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show video metadata
    Info(commands::info::InfoArgs),
    /// Measure one experiment/background pair
    Extract(commands::extract::ExtractArgs),
    /// Process every video pair of a folder
    Batch(commands::batch::BatchArgs),
    /// Condition and annotate a folder of raw series CSVs
    Condition(commands::condition::ConditionArgs),
    /// Print or save the default config
    Config(commands::config::ConfigArgs),
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = load_config(cli.config.as_ref())?;

    match &cli.command {
        Commands::Info(args) => commands::info::run(args, &config),
        Commands::Extract(args) => commands::extract::run(args, &config),
        Commands::Batch(args) => commands::batch::run(args, &config),
        Commands::Condition(args) => commands::condition::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
    }
}
