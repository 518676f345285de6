pub mod classifier;
pub mod csv_record;
pub mod manifest;
pub mod rows;
pub mod scheduler;
pub mod schemas;
pub mod service;
pub mod types;
pub mod writer;
pub mod writers;

pub use classifier::{classify, ClassifiedColumns};
pub use manifest::{describe_signals, write_manifest, Manifest, SignalDescriptor};
pub use rows::{materialize, MaterializedSignal, Row, ValuePolicy};
pub use scheduler::ExportScheduler;
pub use service::{dump_signals, BatchReport, ExportService, RecordingReport};
pub use types::{ExportConfig, ExportFormat, ExportRun, ExportSummary, ParquetCompression};
pub use writer::TableSink;
pub use writers::{CompressedCsvWriter, CsvConfig, ParquetPartitionWriter};
