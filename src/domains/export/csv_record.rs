use crate::domains::export::rows::Row;

/// Column order shared by the CSV header and the Parquet schema
pub const ROW_COLUMNS: [&str; 12] = [
    "source_uuid",
    "name",
    "unit",
    "timestamp",
    "value",
    "value_string",
    "source",
    "channel_group_acq_name",
    "acq_source_name",
    "acq_source_path",
    "source_type",
    "bus_type",
];

/// Trait for types that can be exported to CSV
pub trait CsvRecord {
    /// Get CSV headers for this type
    fn headers() -> Vec<&'static str>;

    /// Convert to CSV row
    fn to_csv(&self) -> Vec<String>;
}

/// Float rendering that keeps a fractional part (`10.0`, not `10`)
pub fn csv_float_to_string(value: f64) -> String {
    format!("{:?}", value)
}

pub fn csv_optional_float_to_string(value: Option<f64>) -> String {
    value.map(csv_float_to_string).unwrap_or_default()
}

impl CsvRecord for Row<'_> {
    fn headers() -> Vec<&'static str> {
        ROW_COLUMNS.to_vec()
    }

    fn to_csv(&self) -> Vec<String> {
        vec![
            self.source_uuid.to_string(),
            self.name.to_string(),
            self.unit.to_string(),
            csv_float_to_string(self.timestamp),
            csv_optional_float_to_string(self.value),
            self.value_string.to_string(),
            self.source.to_string(),
            self.channel_group_acq_name.to_string(),
            self.acq_source_name.to_string(),
            self.acq_source_path.to_string(),
            self.source_type.to_string(),
            self.bus_type.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_line() {
        assert_eq!(
            Row::headers().join(","),
            "source_uuid,name,unit,timestamp,value,value_string,source,\
             channel_group_acq_name,acq_source_name,acq_source_path,source_type,bus_type"
        );
    }

    #[test]
    fn test_to_csv_renders_empty_value() {
        let row = Row {
            source_uuid: "run",
            name: "Gear",
            unit: "",
            timestamp: 1.0,
            value: None,
            value_string: "N",
            source: "TCU",
            channel_group_acq_name: "",
            acq_source_name: "",
            acq_source_path: "",
            source_type: "ECU",
            bus_type: "CAN",
        };
        let fields = row.to_csv();
        assert_eq!(fields.len(), Row::headers().len());
        assert_eq!(fields[3], "1.0");
        assert_eq!(fields[4], "");
        assert_eq!(fields[5], "N");
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(csv_float_to_string(20.5), "20.5");
        assert_eq!(csv_float_to_string(0.1), "0.1");
        assert_eq!(csv_optional_float_to_string(Some(30.0)), "30.0");
    }
}
