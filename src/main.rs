//! # Batch Image Converter - Main Entry Point
//!
//! ## Execution flow:
//! 1. Parse CLI arguments with `clap` (inputs, format, mode, quality, ...)
//! 2. Configure logging with `tracing` (INFO, or DEBUG with --verbose)
//! 3. Expand inputs into supported image files and load them into memory
//! 4. Load the codec engine, run the batch, report per-item outcomes
//! 5. Package the succeeded subset and write the deliverable
//!
//! ## Example usage:
//! ```bash
//! batch-converter ./photos --format webp --output converted.zip
//! batch-converter a.png b.png --format jpg --compress --quality 70
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use batch_image_converter::files::FileScanner;
use batch_image_converter::progress::ProgressManager;
use batch_image_converter::{
    BatchConfig, BatchOrchestrator, RawFile, TargetFormat, TransformMode,
};

#[derive(Parser)]
#[command(name = "batch-converter")]
#[command(about = "Convert, compress or resize batches of images")]
struct Args {
    /// Image files or directories to transform
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Target format (jpg, png, webp, gif, bmp, ico, tiff, pnm)
    #[arg(short, long, default_value = "png")]
    format: TargetFormat,

    /// Recompress at --quality instead of plain conversion (jpg/png/webp only)
    #[arg(long)]
    compress: bool,

    /// Quality for --compress (1-100)
    #[arg(short, long, default_value = "80")]
    quality: u8,

    /// Downscale to this percentage of the original dimensions (1-100)
    #[arg(long, conflicts_with = "compress")]
    resize: Option<u8>,

    /// Where to write the deliverable (defaults to the suggested name in cwd)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit progress and results as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mode = if args.compress {
        TransformMode::Compress {
            quality: args.quality,
        }
    } else if let Some(scale) = args.resize {
        TransformMode::Resize { scale }
    } else {
        TransformMode::Convert
    };

    let config = BatchConfig {
        target_format: args.format,
        mode,
        output_path: args.output,
        json_output: args.json,
    };

    let files = FileScanner::collect_input_files(&args.inputs)?;
    if files.is_empty() {
        return Err(anyhow::anyhow!("No supported image files found in inputs"));
    }
    if !args.json {
        info!("Found {} image files to transform", files.len());
    }

    let mut raw_files = Vec::with_capacity(files.len());
    for path in &files {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        raw_files.push(RawFile::new(name, FileScanner::guess_mime(path), bytes));
    }

    let mut session = BatchOrchestrator::new(config)?;

    let spinner = ProgressManager::spinner("Loading codec engine...");
    session.load_engine().await?;
    spinner.finish_and_clear();

    session.add_files(raw_files);
    session.run().await?;

    let deliverable = session.package()?;
    let output_path = session
        .config()
        .output_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&deliverable.file_name));

    tokio::fs::write(&output_path, &deliverable.bytes).await?;
    if !args.json {
        info!(
            "Wrote {} to {}",
            FileScanner::format_size(deliverable.bytes.len() as u64),
            output_path.display()
        );
    }

    Ok(())
}
