use crate::domains::export::classifier::{classify, coerce_sample, ClassifiedColumns};
use crate::domains::export::types::ExportRun;
use crate::domains::recording::{Signal, SourceMetadata};
use crate::errors::ExportResult;

/// How the `value` column of a row is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePolicy {
    /// Take the classifier's numeric column (columnar export)
    Classified,
    /// Coerce each sample on its own, leaving the cell empty on failure
    /// (row export)
    PerSample,
}

/// One exported record. Borrowed from its [`MaterializedSignal`] and
/// consumed by a sink straight away.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub source_uuid: &'a str,
    pub name: &'a str,
    pub unit: &'a str,
    pub timestamp: f64,
    pub value: Option<f64>,
    pub value_string: &'a str,
    pub source: &'a str,
    pub channel_group_acq_name: &'a str,
    pub acq_source_name: &'a str,
    pub acq_source_path: &'a str,
    pub source_type: &'static str,
    pub bus_type: &'static str,
}

/// A signal joined with its lineage, ready to be turned into rows
#[derive(Debug)]
pub struct MaterializedSignal<'a> {
    signal: &'a Signal,
    metadata: &'a SourceMetadata,
    source_uuid: String,
    columns: ClassifiedColumns,
    policy: ValuePolicy,
}

impl<'a> MaterializedSignal<'a> {
    pub fn signal(&self) -> &Signal {
        self.signal
    }

    pub fn source_uuid(&self) -> &str {
        &self.source_uuid
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Rows in the signal's timestamp order; lineage fields are repeated on
    /// every row.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        let signal = self.signal;
        let metadata = self.metadata;

        (0..self.len()).map(move |i| Row {
            source_uuid: &self.source_uuid,
            name: &signal.name,
            unit: &signal.unit,
            timestamp: signal.timestamps[i],
            value: match self.policy {
                ValuePolicy::Classified => Some(self.columns.numeric[i]),
                ValuePolicy::PerSample => coerce_sample(&signal.samples, i),
            },
            value_string: &self.columns.text[i],
            source: &signal.source.name,
            channel_group_acq_name: &metadata.channel_group_acq_name,
            acq_source_name: &metadata.acq_source_name,
            acq_source_path: &metadata.acq_source_path,
            source_type: signal.source.source_type.as_str(),
            bus_type: signal.source.bus_type.as_str(),
        })
    }
}

/// Classify a signal and bind it to its run and source metadata
pub fn materialize<'a>(
    signal: &'a Signal,
    metadata: &'a SourceMetadata,
    run: &ExportRun,
    policy: ValuePolicy,
) -> ExportResult<MaterializedSignal<'a>> {
    let columns = classify(signal)?;

    Ok(MaterializedSignal {
        signal,
        metadata,
        source_uuid: run.id.to_string(),
        columns,
        policy,
    })
}
