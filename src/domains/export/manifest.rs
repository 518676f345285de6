use crate::domains::export::types::ExportRun;
use crate::domains::recording::{resolve, MeasurementContainer, Signal, SourceMetadata};
use crate::errors::ExportResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Identity and provenance of one signal as listed in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDescriptor {
    pub name: String,
    pub unit: String,
    pub comment: String,
    pub group_index: usize,
    pub channel_index: usize,
    pub channel_group_acq_name: String,
    pub acq_source_name: String,
    pub acq_source_path: String,
    pub source: String,
    pub source_type: String,
    pub bus_type: String,
}

impl SignalDescriptor {
    pub fn new(signal: &Signal, metadata: SourceMetadata) -> Self {
        Self {
            name: signal.name.clone(),
            unit: signal.unit.clone(),
            comment: signal.comment.clone(),
            group_index: signal.group_index,
            channel_index: signal.channel_index,
            channel_group_acq_name: metadata.channel_group_acq_name,
            acq_source_name: metadata.acq_source_name,
            acq_source_path: metadata.acq_source_path,
            source: signal.source.name.clone(),
            source_type: signal.source.source_type.as_str().to_string(),
            bus_type: signal.source.bus_type.as_str().to_string(),
        }
    }
}

/// Describe every signal of a recording in enumeration order
pub fn describe_signals<C>(container: &C) -> Vec<SignalDescriptor>
where
    C: MeasurementContainer + ?Sized,
{
    container
        .signals()
        .map(|signal| SignalDescriptor::new(&signal, resolve(container, signal.group_index)))
        .collect()
}

/// JSON summary written once per recording, after every export task is done
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub source_uuid: Uuid,
    pub preparation_start_date: DateTime<Utc>,
    pub signals: Vec<SignalDescriptor>,
    pub comments: String,
    /// Signals processed by the export step, failed ones included
    pub number_of_chunks: usize,
}

impl Manifest {
    pub fn build<C>(run: &ExportRun, container: &C, number_of_chunks: usize) -> Self
    where
        C: MeasurementContainer + ?Sized,
    {
        Self {
            name: run.basename.clone(),
            source_uuid: run.id,
            preparation_start_date: run.started_at,
            signals: describe_signals(container),
            comments: container.header_comment().to_string(),
            number_of_chunks,
        }
    }
}

/// Write `{basename}-{run id}.metadata.json` into `target`
pub fn write_manifest(run: &ExportRun, target: &Path, manifest: &Manifest) -> ExportResult<PathBuf> {
    let path = run.manifest_path(target);
    log::info!("Writing metadata file {}", run.artifact_stem());

    std::fs::create_dir_all(target)?;
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut writer, manifest)?;
    writer.flush()?;

    Ok(path)
}
