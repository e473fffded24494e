use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use doser_core::io::open_video;
use doser_core::pipeline::PipelineConfig;

#[derive(Args)]
pub struct InfoArgs {
    /// Video: a SER file or a folder of frames
    pub video: PathBuf,
}

pub fn run(args: &InfoArgs, config: &PipelineConfig) -> Result<()> {
    let video = open_video(&args.video, &config.output.image_extension)
        .with_context(|| format!("Failed to open {}", args.video.display()))?;
    let info = video.info();

    println!("Video:       {}", info.path.display());
    println!("Kind:        {}", info.kind);
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Bit depth:   {}", info.bit_depth);

    let frame_bytes = info.width as usize * info.height as usize * 2;
    let total_mb = (frame_bytes * info.total_frames) as f64 / (1024.0 * 1024.0);
    println!("Decoded:     {:.1} MB", total_mb);

    Ok(())
}
