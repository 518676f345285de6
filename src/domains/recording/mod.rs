pub mod container;
pub mod source_resolver;
pub mod types;

pub use container::{MeasurementContainer, Recording};
pub use source_resolver::{resolve, SourceMetadata};
pub use types::{
    AcquisitionSource, BusType, ChannelGroup, RecordSample, SampleValue, Samples, Signal, Source,
    SourceType,
};
