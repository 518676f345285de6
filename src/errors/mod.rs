mod error;

pub use error::{ExportError, SignalFailure};

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
