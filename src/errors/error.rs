use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading recordings or exporting their signals
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid recording {}: {reason}", path.display())]
    InvalidRecording { path: PathBuf, reason: String },

    #[error("Signal {name} has {timestamps} timestamps but {samples} samples")]
    LengthMismatch {
        name: String,
        timestamps: usize,
        samples: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Export task failed: {0}")]
    Task(String),
}

impl ExportError {
    pub fn invalid_recording(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ExportError::InvalidRecording {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A per-signal failure captured at the task boundary.
///
/// Failures never abort the recording; they are collected so the caller can
/// report them alongside the signal count.
#[derive(Debug, Clone, Serialize)]
pub struct SignalFailure {
    pub index: usize,
    pub name: String,
    pub sample_count: usize,
    pub message: String,
}

impl std::fmt::Display for SignalFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Signal {}: {} with {} failed: {}",
            self.index, self.name, self.sample_count, self.message
        )
    }
}
