//! Mosaic CLI
//!
//! Usage: mosaic-cli <FOLDER> <OUTPUT> [--count N]
//! Config comes from MOSAIC_CONFIG / FFMPEG_PATH; logs go to stderr (RUST_LOG)
//! Returns non-zero on any failure

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mosaic_core::{MosaicConfig, MosaicPipeline};

#[derive(Parser)]
#[command(name = "mosaic-cli")]
#[command(about = "Mosaic CLI - compose a folder of images into one portrait grid")]
struct Cli {
    /// Folder holding the source images
    folder: PathBuf,

    /// Output image path
    output: PathBuf,

    /// Number of images to place [default: requiredCount from config, 40]
    #[arg(short, long)]
    count: Option<usize>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match MosaicConfig::from_env() {
        Ok(c) => c.with_count_override(cli.count),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = MosaicPipeline::with_system_tool(config);

    match pipeline.generate(&cli.folder, &cli.output) {
        Ok(report) => {
            tracing::info!(
                id = %report.id,
                plan_hash = %report.plan_hash,
                job_hash = %report.job_hash,
                "mosaic report"
            );
            println!("Mosaic created successfully: {}", report.output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
