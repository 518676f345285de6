use crate::domains::recording::{RecordSample, SampleValue, Samples, Signal};
use crate::errors::{ExportError, ExportResult};

/// Numeric and textual projections of a signal's samples.
///
/// Both columns always have one entry per timestamp; whichever column does
/// not carry the signal's meaning holds the neutral value (`0.0` or `""`).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedColumns {
    pub numeric: Vec<f64>,
    pub text: Vec<String>,
}

impl ClassifiedColumns {
    pub fn len(&self) -> usize {
        self.numeric.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty()
    }
}

/// Split a signal's samples into the fixed `(value, value_string)` pair.
///
/// Records render as text with a zero numeric column, numeric kinds cast to
/// f64 with an empty text column, everything else renders as text.
pub fn classify(signal: &Signal) -> ExportResult<ClassifiedColumns> {
    let len = signal.timestamps.len();
    if signal.samples.len() != len {
        return Err(ExportError::LengthMismatch {
            name: signal.name.clone(),
            timestamps: len,
            samples: signal.samples.len(),
        });
    }

    let columns = match &signal.samples {
        Samples::Record(records) => ClassifiedColumns {
            numeric: vec![0.0; len],
            text: records.iter().map(render_record).collect(),
        },
        Samples::Float(values) => numeric(values.clone()),
        Samples::Int(values) => numeric(values.iter().map(|v| *v as f64).collect()),
        Samples::UInt(values) => numeric(values.iter().map(|v| *v as f64).collect()),
        Samples::Bool(values) => {
            textual(values.iter().map(|v| SampleValue::Bool(*v).to_string()).collect())
        }
        Samples::Text(values) => textual(values.clone()),
        Samples::Bytes(values) => textual(values.iter().map(|v| decode_bytes(v)).collect()),
    };

    Ok(columns)
}

fn numeric(values: Vec<f64>) -> ClassifiedColumns {
    let len = values.len();
    ClassifiedColumns {
        numeric: values,
        text: vec![String::new(); len],
    }
}

fn textual(text: Vec<String>) -> ClassifiedColumns {
    ClassifiedColumns {
        numeric: vec![0.0; text.len()],
        text,
    }
}

/// `field: value` lines in field order, field names right-aligned to the
/// longest one
pub fn render_record(record: &RecordSample) -> String {
    let width = record.iter().map(|(field, _)| field.chars().count()).max().unwrap_or(0);
    record
        .iter()
        .map(|(field, value)| format!("{:>width$}: {}", field, value, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fixed-width byte strings decode as text, with trailing NUL padding
/// dropped.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Per-sample f64 coercion used by the row-oriented sink.
///
/// Returns `None` instead of failing so one bad sample cannot abort the
/// remaining rows of its signal.
pub fn coerce_sample(samples: &Samples, index: usize) -> Option<f64> {
    match samples {
        Samples::Float(values) => values.get(index).copied(),
        Samples::Int(values) => values.get(index).map(|v| *v as f64),
        Samples::UInt(values) => values.get(index).map(|v| *v as f64),
        Samples::Bool(values) => values.get(index).map(|v| if *v { 1.0 } else { 0.0 }),
        Samples::Text(values) => values.get(index)?.trim().parse().ok(),
        Samples::Bytes(values) => decode_bytes(values.get(index)?).trim().parse().ok(),
        Samples::Record(_) => None,
    }
}
