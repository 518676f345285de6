use crate::domains::export::rows::{materialize, ValuePolicy};
use crate::domains::export::types::{ExportRun, ExportSummary};
use crate::domains::export::writer::TableSink;
use crate::domains::export::writers::CompressedCsvWriter;
use crate::domains::recording::{resolve, MeasurementContainer, Signal, SourceMetadata};
use crate::errors::{ExportError, ExportResult, SignalFailure};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{spawn_blocking, JoinError};

/// One unit of work: a signal plus everything needed to write it
struct SignalTask {
    index: usize,
    signal: Arc<Signal>,
    metadata: SourceMetadata,
    run: ExportRun,
}

impl SignalTask {
    fn new<C>(container: &C, index: usize, signal: Arc<Signal>, run: &ExportRun) -> Self
    where
        C: MeasurementContainer + ?Sized,
    {
        Self {
            index,
            metadata: resolve(container, signal.group_index),
            signal,
            run: run.clone(),
        }
    }
}

/// Fans the columnar export out over a bounded pool of worker threads.
///
/// Each signal is one task on tokio's blocking pool, gated by a semaphore
/// of `max_workers` permits. A task's error or panic is captured as a
/// [`SignalFailure`] and never affects its siblings.
pub struct ExportScheduler {
    max_workers: usize,
    semaphore: Arc<Semaphore>,
}

impl ExportScheduler {
    pub fn new(max_workers: Option<usize>) -> Self {
        let max_workers = max_workers.unwrap_or_else(Self::host_parallelism).max(1);

        Self {
            max_workers,
            semaphore: Arc::new(Semaphore::new(max_workers)),
        }
    }

    pub fn host_parallelism() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Export every signal of `container` through `sink`, returning once all
    /// dispatched tasks have finished.
    ///
    /// `signal_count` in the summary counts every enumerated signal,
    /// including the ones whose task failed.
    pub async fn export_columnar<C>(
        &self,
        container: &C,
        run: &ExportRun,
        sink: Arc<dyn TableSink>,
    ) -> ExportSummary
    where
        C: MeasurementContainer + ?Sized,
    {
        let mut summary = ExportSummary::default();
        let mut handles = Vec::new();

        for (index, signal) in container.signals().enumerate() {
            summary.signal_count += 1;

            // Waiting for a slot before spawning keeps at most `max_workers`
            // materialized signals in memory.
            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    let failure =
                        failure_for(index, &signal, ExportError::Task(e.to_string()).to_string());
                    log::error!("{}", failure);
                    summary.failed.push(failure);
                    continue;
                }
            };

            let task = SignalTask::new(container, index, signal.clone(), run);
            let sink = sink.clone();
            let handle = spawn_blocking(move || {
                let _permit = permit;
                run_columnar_task(&task, sink.as_ref())
            });
            handles.push((index, signal, handle));
        }

        // Join barrier: nothing is returned until every task has reported
        for (index, signal, handle) in handles {
            summary.record(index, &signal, handle.await);
        }

        log::debug!(
            "Columnar export of {} signals into {} done, {} failed",
            summary.signal_count,
            sink.dataset_dir().display(),
            summary.failed.len()
        );
        summary
    }

    /// Row-oriented export, one signal after another.
    ///
    /// Each signal's gzip writing runs on the blocking pool and is awaited
    /// before the next one starts; failures are still isolated per signal.
    pub async fn export_rows<C>(
        &self,
        container: &C,
        run: &ExportRun,
        writer: &CompressedCsvWriter,
    ) -> ExportSummary
    where
        C: MeasurementContainer + ?Sized,
    {
        let mut summary = ExportSummary::default();

        for (index, signal) in container.signals().enumerate() {
            summary.signal_count += 1;
            let task = SignalTask::new(container, index, signal.clone(), run);
            let writer = writer.clone();
            let outcome = spawn_blocking(move || run_row_task(&task, &writer)).await;
            summary.record(index, &signal, outcome);
        }

        summary
    }
}

impl ExportSummary {
    fn record(
        &mut self,
        index: usize,
        signal: &Signal,
        outcome: Result<Result<usize, SignalFailure>, JoinError>,
    ) {
        match outcome {
            Ok(Ok(rows)) => self.rows_written += rows,
            Ok(Err(failure)) => self.failed.push(failure),
            Err(join_error) => {
                let error = ExportError::Task(format!("worker task panicked: {}", join_error));
                let failure = failure_for(index, signal, error.to_string());
                log::error!("{}", failure);
                self.failed.push(failure);
            }
        }
    }
}

fn run_columnar_task(task: &SignalTask, sink: &dyn TableSink) -> Result<usize, SignalFailure> {
    let started = log_start(task.index, &task.signal);
    let result = materialize(&task.signal, &task.metadata, &task.run, ValuePolicy::Classified)
        .and_then(|materialized| sink.write_table(&materialized, task.index));
    finish_task(task.index, &task.signal, started, result)
}

fn run_row_task(task: &SignalTask, writer: &CompressedCsvWriter) -> Result<usize, SignalFailure> {
    let started = log_start(task.index, &task.signal);
    let result = materialize(&task.signal, &task.metadata, &task.run, ValuePolicy::PerSample)
        .and_then(|materialized| {
            writer.write_delimited_file(&materialized, &writer.file_path(&task.run, task.index))
        });
    finish_task(task.index, &task.signal, started, result)
}

fn log_start(index: usize, signal: &Signal) -> Instant {
    log::info!(
        "Processing signal {}: {} with type {}",
        index,
        signal.name,
        signal.samples.kind_name()
    );
    Instant::now()
}

fn finish_task(
    index: usize,
    signal: &Signal,
    started: Instant,
    result: ExportResult<usize>,
) -> Result<usize, SignalFailure> {
    let outcome = result.map_err(|e| failure_for(index, signal, e.to_string()));
    if let Err(failure) = &outcome {
        log::error!("{}", failure);
    }
    log::info!(
        "Signal {}: {} with {} entries took {:?}",
        index,
        signal.name,
        signal.timestamps.len(),
        started.elapsed()
    );
    outcome
}

fn failure_for(index: usize, signal: &Signal, message: String) -> SignalFailure {
    SignalFailure {
        index,
        name: signal.name.clone(),
        sample_count: signal.timestamps.len(),
        message,
    }
}
