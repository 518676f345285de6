use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::{ExportError, ExportResult, SignalFailure};

/// Export formats supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Partitioned Parquet dataset, one partition per signal
    #[default]
    Parquet,
    /// One gzip-compressed CSV file per signal
    Csv,
}

impl ExportFormat {
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Parquet => "parquet",
            ExportFormat::Csv => "csv.gz",
        }
    }
}

/// Parquet compression options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParquetCompression {
    None,
    #[default]
    Snappy,
    Gzip,
    Lz4,
    Zstd,
}

impl ParquetCompression {
    pub fn to_parquet(self) -> parquet::basic::Compression {
        use parquet::basic::{Compression, GzipLevel, ZstdLevel};

        match self {
            ParquetCompression::None => Compression::UNCOMPRESSED,
            ParquetCompression::Snappy => Compression::SNAPPY,
            ParquetCompression::Gzip => Compression::GZIP(GzipLevel::default()),
            ParquetCompression::Lz4 => Compression::LZ4_RAW,
            ParquetCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
        }
    }
}

/// Configuration consumed by the export service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub target: PathBuf,
    /// Only enumerate and print signal descriptors; nothing is written
    pub dump: bool,
    /// Worker pool size for the columnar path; host parallelism when unset
    pub max_workers: Option<usize>,
    pub parquet_compression: ParquetCompression,
    /// Continue a directory batch after a recording fails to open
    pub keep_going: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            target: PathBuf::from("."),
            dump: false,
            max_workers: None,
            parquet_compression: ParquetCompression::default(),
            keep_going: false,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> ExportResult<()> {
        if self.max_workers == Some(0) {
            return Err(ExportError::InvalidConfig(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.target.as_os_str().is_empty() {
            return Err(ExportError::InvalidConfig("target directory is empty".to_string()));
        }
        Ok(())
    }
}

/// Identity of one export run over a single recording.
///
/// The run id is minted once per recording and passed explicitly to every
/// component that names an artifact or stamps a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRun {
    pub id: Uuid,
    pub basename: String,
    pub started_at: DateTime<Utc>,
}

impl ExportRun {
    pub fn new(basename: impl Into<String>) -> Self {
        Self::with_id(basename, Uuid::new_v4())
    }

    pub fn with_id(basename: impl Into<String>, id: Uuid) -> Self {
        Self {
            id,
            basename: basename.into(),
            started_at: Utc::now(),
        }
    }

    /// `{basename}-{run id}`, the namespace of every artifact of this run
    pub fn artifact_stem(&self) -> String {
        format!("{}-{}", self.basename, self.id)
    }

    /// Dataset directory (Parquet) or file directory (CSV) under `target`
    pub fn output_dir(&self, target: &Path) -> PathBuf {
        target.join(self.artifact_stem())
    }

    pub fn manifest_path(&self, target: &Path) -> PathBuf {
        target.join(format!("{}.metadata.json", self.artifact_stem()))
    }

    /// Per-signal CSV file name; `index` is the signal's enumeration index
    pub fn csv_file_name(&self, index: usize) -> String {
        format!("{}-{}.{}", self.id, index, ExportFormat::Csv.file_extension())
    }
}

/// Result of exporting every signal of one recording
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    /// Signals enumerated, failed ones included
    pub signal_count: usize,
    pub rows_written: usize,
    pub failed: Vec<SignalFailure>,
}

impl ExportSummary {
    pub fn succeeded(&self) -> usize {
        self.signal_count - self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_artifact_names() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let run = ExportRun::with_id("drive01", id);
        let target = Path::new("/out");

        assert_eq!(
            run.output_dir(target),
            PathBuf::from("/out/drive01-550e8400-e29b-41d4-a716-446655440000")
        );
        assert_eq!(
            run.manifest_path(target),
            PathBuf::from("/out/drive01-550e8400-e29b-41d4-a716-446655440000.metadata.json")
        );
        assert_eq!(
            run.csv_file_name(7),
            "550e8400-e29b-41d4-a716-446655440000-7.csv.gz"
        );
    }

    #[test]
    fn test_config_defaults_and_validation() {
        let config: ExportConfig = serde_json::from_str(r#"{"format": "csv"}"#).unwrap();
        assert_eq!(config.format, ExportFormat::Csv);
        assert_eq!(config.target, PathBuf::from("."));
        assert!(!config.dump);
        assert!(config.validate().is_ok());

        let config = ExportConfig {
            max_workers: Some(0),
            ..ExportConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExportError::InvalidConfig(_))));
    }

    #[test]
    fn test_fresh_runs_get_distinct_ids() {
        assert_ne!(ExportRun::new("a").id, ExportRun::new("a").id);
    }
}
