//! Signal extraction and columnar export for automotive measurement
//! recordings.
//!
//! Signals are normalised into a fixed row schema, tagged with their source
//! provenance and written either as a partitioned Parquet dataset or as one
//! gzip-compressed CSV file per signal, followed by a JSON manifest.

// Public modules
pub mod domains;
pub mod errors;

pub use domains::export::{ExportConfig, ExportFormat, ExportService};
pub use domains::recording::{MeasurementContainer, Recording};
pub use errors::{ExportError, ExportResult};

/// Initialise `env_logger`, defaulting `RUST_LOG` when it is not set.
/// Safe to call more than once.
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        #[cfg(debug_assertions)]
        std::env::set_var("RUST_LOG", "debug");
        #[cfg(not(debug_assertions))]
        std::env::set_var("RUST_LOG", "info");
    }

    let _ = env_logger::try_init();
}
