use clap::{ArgGroup, Parser};
use signal_export::domains::export::ParquetCompression;
use signal_export::{init_logging, ExportConfig, ExportFormat, ExportService};
use std::path::PathBuf;

/// Process a single recording or a directory of recordings into CSV or
/// Parquet files.
#[derive(Debug, Parser)]
#[command(name = "signal-export", version)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "directory"])))]
struct Cli {
    /// Path to a single recording
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Path to a directory of recordings
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Location where the processed files will be stored
    #[arg(short, long, default_value = ".")]
    target: PathBuf,

    /// Show the signals contained in the recording; nothing is exported
    #[arg(long)]
    dump: bool,

    /// Export format
    #[arg(long, value_enum, default_value = "parquet")]
    format: ExportFormat,

    /// Worker pool size for Parquet export (defaults to available cores)
    #[arg(long, env = "SIGNAL_EXPORT_WORKERS")]
    workers: Option<usize>,

    /// Keep processing a directory when a recording cannot be opened
    #[arg(long)]
    keep_going: bool,
}

impl Cli {
    fn config(&self) -> ExportConfig {
        ExportConfig {
            format: self.format,
            target: self.target.clone(),
            dump: self.dump,
            max_workers: self.workers,
            parquet_compression: ParquetCompression::default(),
            keep_going: self.keep_going,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();
    let service = ExportService::new(cli.config())?;

    if let Some(file) = &cli.file {
        service.process_file(file).await?;
    } else if let Some(directory) = &cli.directory {
        let report = service.process_directory(directory).await?;
        for (path, reason) in &report.failed {
            log::error!("Failed to process {}: {}", path.display(), reason);
        }
        log::info!(
            "Processed {} recordings, {} failed",
            report.processed.len(),
            report.failed.len()
        );
    }

    Ok(())
}
