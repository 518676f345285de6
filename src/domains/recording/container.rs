use crate::domains::recording::types::{ChannelGroup, Signal};
use crate::errors::{ExportError, ExportResult};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Read-only view of an opened measurement recording.
///
/// Decoding the binary container happens outside this crate; the export
/// engine only needs signal enumeration and channel group lookups.
pub trait MeasurementContainer: Send + Sync {
    /// Signals in the container's native enumeration order
    fn signals(&self) -> Box<dyn Iterator<Item = Arc<Signal>> + Send + '_>;

    /// Channel group entry for `group_index`, if the recording has one
    fn channel_group(&self, group_index: usize) -> Option<&ChannelGroup>;

    /// Free-text comment from the recording header
    fn header_comment(&self) -> &str;
}

/// In-memory recording, either built directly or loaded from a JSON snapshot
#[derive(Debug, Clone, Default)]
pub struct Recording {
    comment: String,
    channel_groups: Vec<ChannelGroup>,
    signals: Vec<Arc<Signal>>,
}

#[derive(Deserialize)]
struct RecordingSnapshot {
    #[serde(default)]
    comment: String,
    #[serde(default)]
    channel_groups: Vec<ChannelGroup>,
    #[serde(default)]
    signals: Vec<Signal>,
}

impl Recording {
    /// Build a recording, rejecting signals whose sample and timestamp
    /// counts disagree.
    pub fn new(
        comment: impl Into<String>,
        channel_groups: Vec<ChannelGroup>,
        signals: Vec<Signal>,
    ) -> ExportResult<Self> {
        for signal in &signals {
            if signal.timestamps.len() != signal.samples.len() {
                return Err(ExportError::LengthMismatch {
                    name: signal.name.clone(),
                    timestamps: signal.timestamps.len(),
                    samples: signal.samples.len(),
                });
            }
        }

        Ok(Self {
            comment: comment.into(),
            channel_groups,
            signals: signals.into_iter().map(Arc::new).collect(),
        })
    }

    /// Open a JSON recording snapshot produced by the container decoder
    pub fn open(path: &Path) -> ExportResult<Self> {
        let data = std::fs::read(path)
            .map_err(|e| ExportError::invalid_recording(path, e.to_string()))?;
        Self::from_json_slice(&data)
            .map_err(|e| ExportError::invalid_recording(path, e.to_string()))
    }

    pub fn from_json_slice(data: &[u8]) -> ExportResult<Self> {
        let snapshot: RecordingSnapshot = serde_json::from_slice(data)?;
        Self::new(snapshot.comment, snapshot.channel_groups, snapshot.signals)
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }
}

impl MeasurementContainer for Recording {
    fn signals(&self) -> Box<dyn Iterator<Item = Arc<Signal>> + Send + '_> {
        Box::new(self.signals.iter().cloned())
    }

    fn channel_group(&self, group_index: usize) -> Option<&ChannelGroup> {
        self.channel_groups.get(group_index)
    }

    fn header_comment(&self) -> &str {
        &self.comment
    }
}
