use crate::domains::export::rows::MaterializedSignal;
use crate::errors::ExportResult;
use std::path::PathBuf;

/// Destination for one signal's table in the columnar export.
///
/// Implementations are shared across worker threads and must give every
/// partition a distinct file so concurrent writes never collide. Calls are
/// blocking; the scheduler runs them on the blocking thread pool.
pub trait TableSink: Send + Sync {
    /// Write `signal` as partition number `partition`, returning the rows
    /// written.
    fn write_table(&self, signal: &MaterializedSignal<'_>, partition: usize) -> ExportResult<usize>;

    /// Directory the partitions land in
    fn dataset_dir(&self) -> PathBuf;
}
