use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::domains::export::manifest::{write_manifest, Manifest};
use crate::domains::export::scheduler::ExportScheduler;
use crate::domains::export::types::{ExportConfig, ExportFormat, ExportRun, ExportSummary};
use crate::domains::export::writers::{CompressedCsvWriter, CsvConfig, ParquetPartitionWriter};
use crate::domains::export::writer::TableSink;
use crate::domains::recording::{resolve, MeasurementContainer, Recording};
use crate::errors::ExportResult;

/// Outcome of exporting one recording
#[derive(Debug, Clone)]
pub struct RecordingReport {
    pub run: ExportRun,
    pub summary: ExportSummary,
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
}

/// Outcome of a directory batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files processed, with the signal count of each
    pub processed: Vec<(PathBuf, usize)>,
    /// Files that could not be processed (only with `keep_going`)
    pub failed: Vec<(PathBuf, String)>,
}

/// Drives dump, export and manifest writing for recordings
pub struct ExportService {
    config: ExportConfig,
    scheduler: ExportScheduler,
}

impl std::fmt::Debug for ExportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportService")
            .field("config", &self.config)
            .field("max_workers", &self.scheduler.max_workers())
            .finish()
    }
}

impl ExportService {
    pub fn new(config: ExportConfig) -> ExportResult<Self> {
        config.validate()?;
        let scheduler = ExportScheduler::new(config.max_workers);
        log::debug!(
            "Export service: format={:?}, target={}, workers={}",
            config.format,
            config.target.display(),
            scheduler.max_workers()
        );

        Ok(Self { config, scheduler })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Open one recording file and dump or export it. Returns the number of
    /// signals in the recording.
    pub async fn process_file(&self, path: &Path) -> ExportResult<usize> {
        let started = Instant::now();
        let recording = Recording::open(path)?;

        let count = if self.config.dump {
            let stdout = std::io::stdout();
            dump_signals(&recording, &mut stdout.lock())?
        } else {
            let basename = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "recording".to_string());
            self.process_recording(&recording, &basename).await?.summary.signal_count
        };

        log::info!(
            "Processing {} took {:?} and has {} signals",
            path.display(),
            started.elapsed(),
            count
        );
        Ok(count)
    }

    /// Export every signal of `container` and write its manifest.
    ///
    /// Per-signal failures are logged and counted but do not stop the run;
    /// the manifest is always written last.
    pub async fn process_recording<C>(
        &self,
        container: &C,
        basename: &str,
    ) -> ExportResult<RecordingReport>
    where
        C: MeasurementContainer + ?Sized,
    {
        let run = ExportRun::new(basename);
        let output_dir = run.output_dir(&self.config.target);

        let summary = match self.config.format {
            ExportFormat::Parquet => {
                let sink: Arc<dyn TableSink> = Arc::new(ParquetPartitionWriter::new(
                    output_dir.clone(),
                    self.config.parquet_compression,
                ));
                self.export_columnar(container, &run, sink).await
            }
            ExportFormat::Csv => {
                let writer = CompressedCsvWriter::new(output_dir.clone(), CsvConfig::default());
                self.scheduler.export_rows(container, &run, &writer).await
            }
        };

        if !summary.failed.is_empty() {
            log::warn!(
                "{} of {} signals failed for {}",
                summary.failed.len(),
                summary.signal_count,
                run.artifact_stem()
            );
        }

        let manifest = Manifest::build(&run, container, summary.signal_count);
        let manifest_path = write_manifest(&run, &self.config.target, &manifest)?;

        Ok(RecordingReport {
            run,
            summary,
            output_dir,
            manifest_path,
        })
    }

    /// Columnar export through an arbitrary sink
    pub async fn export_columnar<C>(
        &self,
        container: &C,
        run: &ExportRun,
        sink: Arc<dyn TableSink>,
    ) -> ExportSummary
    where
        C: MeasurementContainer + ?Sized,
    {
        self.scheduler.export_columnar(container, run, sink).await
    }

    /// Process every regular file in `dir`, in file name order.
    ///
    /// Without `keep_going` the first failing recording aborts the batch.
    pub async fn process_directory(&self, dir: &Path) -> ExportResult<BatchReport> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut report = BatchReport::default();
        for path in paths {
            match self.process_file(&path).await {
                Ok(count) => report.processed.push((path, count)),
                Err(e) if self.config.keep_going => {
                    log::error!("Skipping {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }
}

/// Print one line per signal and return how many there are
pub fn dump_signals<C, W>(container: &C, out: &mut W) -> ExportResult<usize>
where
    C: MeasurementContainer + ?Sized,
    W: Write,
{
    let mut count = 0;
    for signal in container.signals() {
        let metadata = resolve(container, signal.group_index);
        writeln!(
            out,
            "{}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
            signal.source.name,
            metadata.channel_group_acq_name,
            metadata.acq_source_name,
            metadata.acq_source_path,
            signal.name,
            signal.unit,
            signal.source.source_type,
            signal.source.bus_type,
            signal.group_index,
            signal.channel_index
        )?;
        count += 1;
    }
    Ok(count)
}
