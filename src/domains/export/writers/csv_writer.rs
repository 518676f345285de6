use crate::domains::export::csv_record::CsvRecord;
use crate::domains::export::rows::{MaterializedSignal, Row};
use crate::domains::export::types::ExportRun;
use crate::errors::{ExportError, ExportResult};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CsvConfig {
    pub delimiter: u8,
    pub quote_char: u8,
    /// gzip level, 0-9
    pub compression_level: u32,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote_char: b'"',
            compression_level: 6,
        }
    }
}

/// Row sink writing one gzip-compressed CSV file per signal
#[derive(Debug, Clone)]
pub struct CompressedCsvWriter {
    output_dir: PathBuf,
    config: CsvConfig,
}

impl CompressedCsvWriter {
    pub fn new(output_dir: impl Into<PathBuf>, config: CsvConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            config,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File for signal number `index`; names are disjoint per signal
    pub fn file_path(&self, run: &ExportRun, index: usize) -> PathBuf {
        self.output_dir.join(run.csv_file_name(index))
    }

    /// Write the header and every row of `signal` to `path`, in the order the
    /// signal's timestamps were recorded. Returns the rows written.
    pub fn write_delimited_file(
        &self,
        signal: &MaterializedSignal<'_>,
        path: &Path,
    ) -> ExportResult<usize> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let encoder = GzEncoder::new(
            BufWriter::new(file),
            Compression::new(self.config.compression_level),
        );
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter)
            .quote(self.config.quote_char)
            .from_writer(encoder);

        wtr.write_record(Row::headers())?;
        let mut rows_written = 0;
        for row in signal.rows() {
            wtr.write_record(row.to_csv())?;
            rows_written += 1;
        }

        let encoder = wtr
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;
        encoder.finish()?.flush()?;

        Ok(rows_written)
    }
}
