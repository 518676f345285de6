use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domains::export::csv_record::ROW_COLUMNS;

static SIGNAL_ROWS_SCHEMA: Lazy<SchemaRef> = Lazy::new(|| Arc::new(build_signal_rows_schema()));

/// Schema of one exported row, shared by every partition of every run
pub fn signal_rows_schema() -> SchemaRef {
    SIGNAL_ROWS_SCHEMA.clone()
}

fn build_signal_rows_schema() -> Schema {
    let fields = ROW_COLUMNS
        .iter()
        .map(|name| match *name {
            "timestamp" => Field::new(*name, DataType::Float64, false),
            // Empty when a sample has no f64 projection
            "value" => Field::new(*name, DataType::Float64, true),
            _ => Field::new(*name, DataType::Utf8, false),
        })
        .collect::<Vec<_>>();

    Schema::new(fields)
}

/// Row schema tagged with the run and signal a partition belongs to
pub fn partition_schema(source_uuid: &str, signal_name: &str) -> SchemaRef {
    let mut metadata = HashMap::new();
    metadata.insert("source_uuid".to_string(), source_uuid.to_string());
    metadata.insert("signal_name".to_string(), signal_name.to_string());

    Arc::new(signal_rows_schema().as_ref().clone().with_metadata(metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_columns() {
        let schema = signal_rows_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, ROW_COLUMNS.to_vec());
        assert_eq!(schema.field_with_name("timestamp").unwrap().data_type(), &DataType::Float64);
        assert!(schema.field_with_name("value").unwrap().is_nullable());
        assert_eq!(schema.field_with_name("bus_type").unwrap().data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_partition_schema_metadata() {
        let schema = partition_schema("abc", "Speed");
        assert_eq!(schema.metadata().get("signal_name").map(String::as_str), Some("Speed"));
        assert_eq!(schema.fields().len(), ROW_COLUMNS.len());
    }
}
