use serde::{Deserialize, Serialize};
use std::fmt;

/// Originating node type of a signal, as stored in the MDF-4 source block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SourceType {
    #[default]
    Other,
    Ecu,
    Bus,
    Io,
    Tool,
    User,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Other => "OTHER",
            SourceType::Ecu => "ECU",
            SourceType::Bus => "BUS",
            SourceType::Io => "I/O",
            SourceType::Tool => "TOOL",
            SourceType::User => "USER",
        }
    }
}

impl TryFrom<u8> for SourceType {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(SourceType::Other),
            1 => Ok(SourceType::Ecu),
            2 => Ok(SourceType::Bus),
            3 => Ok(SourceType::Io),
            4 => Ok(SourceType::Tool),
            5 => Ok(SourceType::User),
            other => Err(format!("unknown source type code {}", other)),
        }
    }
}

impl From<SourceType> for u8 {
    fn from(value: SourceType) -> Self {
        value as u8
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport a signal was captured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BusType {
    #[default]
    None,
    Other,
    Can,
    Lin,
    Most,
    FlexRay,
    KLine,
    Ethernet,
    Usb,
}

impl BusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusType::None => "NONE",
            BusType::Other => "OTHER",
            BusType::Can => "CAN",
            BusType::Lin => "LIN",
            BusType::Most => "MOST",
            BusType::FlexRay => "FLEXRAY",
            BusType::KLine => "K_LINE",
            BusType::Ethernet => "ETHERNET",
            BusType::Usb => "USB",
        }
    }
}

impl TryFrom<u8> for BusType {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(BusType::None),
            1 => Ok(BusType::Other),
            2 => Ok(BusType::Can),
            3 => Ok(BusType::Lin),
            4 => Ok(BusType::Most),
            5 => Ok(BusType::FlexRay),
            6 => Ok(BusType::KLine),
            7 => Ok(BusType::Ethernet),
            8 => Ok(BusType::Usb),
            other => Err(format!("unknown bus type code {}", other)),
        }
    }
}

impl From<BusType> for u8 {
    fn from(value: BusType) -> Self {
        value as u8
    }
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source descriptor attached to every signal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub bus_type: BusType,
}

/// A single scalar field value inside a composite record sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleValue::Bool(v) => f.write_str(if *v { "True" } else { "False" }),
            SampleValue::Int(v) => write!(f, "{}", v),
            SampleValue::UInt(v) => write!(f, "{}", v),
            SampleValue::Float(v) => write!(f, "{}", v),
            SampleValue::Text(v) => f.write_str(v),
        }
    }
}

/// One composite sample: ordered `(field name, value)` pairs
pub type RecordSample = Vec<(String, SampleValue)>;

/// Typed sample column of a signal.
///
/// `Float`, `Int` and `UInt` are the numeric kinds; everything else is
/// exported through its string rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Samples {
    Float(Vec<f64>),
    Int(Vec<i64>),
    #[serde(rename = "uint")]
    UInt(Vec<u64>),
    Bool(Vec<bool>),
    Text(Vec<String>),
    Bytes(Vec<Vec<u8>>),
    Record(Vec<RecordSample>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Float(v) => v.len(),
            Samples::Int(v) => v.len(),
            Samples::UInt(v) => v.len(),
            Samples::Bool(v) => v.len(),
            Samples::Text(v) => v.len(),
            Samples::Bytes(v) => v.len(),
            Samples::Record(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Samples::Float(_) | Samples::Int(_) | Samples::UInt(_))
    }

    /// Element type name used in progress logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            Samples::Float(_) => "float64",
            Samples::Int(_) => "int64",
            Samples::UInt(_) => "uint64",
            Samples::Bool(_) => "bool",
            Samples::Text(_) => "str",
            Samples::Bytes(_) => "bytes",
            Samples::Record(_) => "record",
        }
    }
}

/// One named time series extracted from a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub comment: String,
    pub group_index: usize,
    pub channel_index: usize,
    pub timestamps: Vec<f64>,
    pub samples: Samples,
    #[serde(default)]
    pub source: Source,
}

impl Signal {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        timestamps: Vec<f64>,
        samples: Samples,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            comment: String::new(),
            group_index: 0,
            channel_index: 0,
            timestamps,
            samples,
            source: Source::default(),
        }
    }

    pub fn with_position(mut self, group_index: usize, channel_index: usize) -> Self {
        self.group_index = group_index;
        self.channel_index = channel_index;
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Acquisition source block of a channel group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionSource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Channel group entry; every field may be absent in real recordings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelGroup {
    #[serde(default)]
    pub acq_name: Option<String>,
    #[serde(default)]
    pub acq_source: Option<AcquisitionSource>,
}
