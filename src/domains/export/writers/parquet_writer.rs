use crate::domains::export::rows::{MaterializedSignal, Row};
use crate::domains::export::schemas::partition_schema;
use crate::domains::export::types::{ExportFormat, ParquetCompression};
use crate::domains::export::writer::TableSink;
use crate::errors::ExportResult;
use arrow::array::{ArrayRef, Float64Builder, StringBuilder};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::{WriterProperties, WriterVersion};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Columnar sink writing each signal as its own Parquet partition file
/// inside the run's dataset directory.
#[derive(Debug, Clone)]
pub struct ParquetPartitionWriter {
    dataset_dir: PathBuf,
    compression: ParquetCompression,
}

impl ParquetPartitionWriter {
    pub fn new(dataset_dir: impl Into<PathBuf>, compression: ParquetCompression) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
            compression,
        }
    }

    fn writer_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression.to_parquet())
            .set_dictionary_enabled(true)
            .set_writer_version(WriterVersion::PARQUET_2_0)
            .set_created_by("signal-export".to_string())
            .build()
    }

    /// Partition names combine the signal index with a fresh uuid, so two
    /// writers never pick the same file even within one dataset directory.
    pub fn partition_path(dir: &Path, partition: usize) -> PathBuf {
        dir.join(format!(
            "part-{:06}-{}.{}",
            partition,
            Uuid::new_v4(),
            ExportFormat::Parquet.file_extension()
        ))
    }
}

impl TableSink for ParquetPartitionWriter {
    fn write_table(&self, signal: &MaterializedSignal<'_>, partition: usize) -> ExportResult<usize> {
        let schema = partition_schema(signal.source_uuid(), &signal.signal().name);
        let mut builder = RowBatchBuilder::with_capacity(schema, signal.len());
        for row in signal.rows() {
            builder.append_row(&row);
        }
        let batch = builder.finish()?;

        std::fs::create_dir_all(&self.dataset_dir)?;
        let path = Self::partition_path(&self.dataset_dir, partition);
        // create_new: an existing file is an error, never overwritten
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(self.writer_properties()))?;
        writer.write(&batch)?;
        writer.close()?;

        log::debug!("Wrote partition {} ({} rows)", path.display(), batch.num_rows());
        Ok(batch.num_rows())
    }

    fn dataset_dir(&self) -> PathBuf {
        self.dataset_dir.clone()
    }
}

/// Record batch builder accumulating materialized rows column by column
pub struct RowBatchBuilder {
    schema: SchemaRef,
    source_uuid: StringBuilder,
    name: StringBuilder,
    unit: StringBuilder,
    timestamp: Float64Builder,
    value: Float64Builder,
    value_string: StringBuilder,
    source: StringBuilder,
    channel_group_acq_name: StringBuilder,
    acq_source_name: StringBuilder,
    acq_source_path: StringBuilder,
    source_type: StringBuilder,
    bus_type: StringBuilder,
}

impl RowBatchBuilder {
    pub fn with_capacity(schema: SchemaRef, rows: usize) -> Self {
        let strings = || StringBuilder::with_capacity(rows, rows * 8);
        Self {
            schema,
            source_uuid: strings(),
            name: strings(),
            unit: strings(),
            timestamp: Float64Builder::with_capacity(rows),
            value: Float64Builder::with_capacity(rows),
            value_string: strings(),
            source: strings(),
            channel_group_acq_name: strings(),
            acq_source_name: strings(),
            acq_source_path: strings(),
            source_type: strings(),
            bus_type: strings(),
        }
    }

    pub fn append_row(&mut self, row: &Row<'_>) {
        self.source_uuid.append_value(row.source_uuid);
        self.name.append_value(row.name);
        self.unit.append_value(row.unit);
        self.timestamp.append_value(row.timestamp);
        self.value.append_option(row.value);
        self.value_string.append_value(row.value_string);
        self.source.append_value(row.source);
        self.channel_group_acq_name.append_value(row.channel_group_acq_name);
        self.acq_source_name.append_value(row.acq_source_name);
        self.acq_source_path.append_value(row.acq_source_path);
        self.source_type.append_value(row.source_type);
        self.bus_type.append_value(row.bus_type);
    }

    /// Column order follows the row schema
    pub fn finish(mut self) -> ExportResult<RecordBatch> {
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(self.source_uuid.finish()),
            Arc::new(self.name.finish()),
            Arc::new(self.unit.finish()),
            Arc::new(self.timestamp.finish()),
            Arc::new(self.value.finish()),
            Arc::new(self.value_string.finish()),
            Arc::new(self.source.finish()),
            Arc::new(self.channel_group_acq_name.finish()),
            Arc::new(self.acq_source_name.finish()),
            Arc::new(self.acq_source_path.finish()),
            Arc::new(self.source_type.finish()),
            Arc::new(self.bus_type.finish()),
        ];

        Ok(RecordBatch::try_new(self.schema, arrays)?)
    }
}
