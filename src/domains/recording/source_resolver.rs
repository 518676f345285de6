use crate::domains::recording::container::MeasurementContainer;
use crate::domains::recording::types::AcquisitionSource;
use serde::Serialize;

/// Frame and bus provenance of a signal, looked up from its channel group.
///
/// Missing entries are empty strings; resolution never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceMetadata {
    pub channel_group_acq_name: String,
    pub acq_source_name: String,
    pub acq_source_path: String,
}

/// Resolve the source metadata of the channel group at `group_index`.
///
/// Each field is looked up on its own so a missing acquisition source does
/// not hide the group's acquisition name, and vice versa.
pub fn resolve<C>(container: &C, group_index: usize) -> SourceMetadata
where
    C: MeasurementContainer + ?Sized,
{
    SourceMetadata {
        channel_group_acq_name: acq_name(container, group_index).unwrap_or_default(),
        acq_source_name: acq_source_name(container, group_index).unwrap_or_default(),
        acq_source_path: acq_source_path(container, group_index).unwrap_or_default(),
    }
}

fn acq_name<C>(container: &C, group_index: usize) -> Option<String>
where
    C: MeasurementContainer + ?Sized,
{
    container.channel_group(group_index)?.acq_name.clone()
}

fn acq_source<C>(container: &C, group_index: usize) -> Option<&AcquisitionSource>
where
    C: MeasurementContainer + ?Sized,
{
    container.channel_group(group_index)?.acq_source.as_ref()
}

fn acq_source_name<C>(container: &C, group_index: usize) -> Option<String>
where
    C: MeasurementContainer + ?Sized,
{
    acq_source(container, group_index)?.name.clone()
}

fn acq_source_path<C>(container: &C, group_index: usize) -> Option<String>
where
    C: MeasurementContainer + ?Sized,
{
    acq_source(container, group_index)?.path.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::recording::container::Recording;
    use crate::domains::recording::types::ChannelGroup;

    fn recording(groups: Vec<ChannelGroup>) -> Recording {
        Recording::new("", groups, vec![]).unwrap()
    }

    #[test]
    fn test_resolve_full_group() {
        let rec = recording(vec![ChannelGroup {
            acq_name: Some("EngineFrame".to_string()),
            acq_source: Some(AcquisitionSource {
                name: Some("CAN1".to_string()),
                path: Some("Vehicle/CAN1".to_string()),
            }),
        }]);

        let meta = resolve(&rec, 0);
        assert_eq!(meta.channel_group_acq_name, "EngineFrame");
        assert_eq!(meta.acq_source_name, "CAN1");
        assert_eq!(meta.acq_source_path, "Vehicle/CAN1");
    }

    #[test]
    fn test_resolve_missing_group() {
        let rec = recording(vec![]);
        assert_eq!(resolve(&rec, 7), SourceMetadata::default());
    }

    #[test]
    fn test_fields_resolve_independently() {
        let rec = recording(vec![
            ChannelGroup {
                acq_name: Some("OnlyName".to_string()),
                acq_source: None,
            },
            ChannelGroup {
                acq_name: None,
                acq_source: Some(AcquisitionSource {
                    name: None,
                    path: Some("Bus/LIN".to_string()),
                }),
            },
        ]);

        let first = resolve(&rec, 0);
        assert_eq!(first.channel_group_acq_name, "OnlyName");
        assert_eq!(first.acq_source_name, "");
        assert_eq!(first.acq_source_path, "");

        let second = resolve(&rec, 1);
        assert_eq!(second.channel_group_acq_name, "");
        assert_eq!(second.acq_source_name, "");
        assert_eq!(second.acq_source_path, "Bus/LIN");
    }
}
