pub mod csv_writer;
pub mod parquet_writer;

pub use csv_writer::{CompressedCsvWriter, CsvConfig};
pub use parquet_writer::{ParquetPartitionWriter, RowBatchBuilder};
