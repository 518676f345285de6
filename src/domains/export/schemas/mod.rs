pub mod parquet;

pub use parquet::{signal_rows_schema, partition_schema};
