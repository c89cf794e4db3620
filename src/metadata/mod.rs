mod cluster;

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

pub use cluster::{ClusterInfo, MetaStorageInfo, NodeInfo, StorageEngineInfo};

/// Wire type tag declared for every series in a request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    Binary,
}

impl DataType {
    /// Numeric tag used on the wire.
    #[must_use]
    pub const fn tag(self) -> i32 {
        match self {
            Self::Boolean => 0,
            Self::Integer => 1,
            Self::Long => 2,
            Self::Float => 3,
            Self::Double => 4,
            Self::Binary => 5,
        }
    }

    /// Encoded width in bytes, or `None` for length-prefixed types.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Boolean => Some(1),
            Self::Integer | Self::Float => Some(4),
            Self::Long | Self::Double => Some(8),
            Self::Binary => None,
        }
    }

    /// Converts a list of raw wire tags, failing on the first unknown tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] for any tag outside the closed set.
    pub fn from_tags(tags: &[i32]) -> Result<Vec<Self>> {
        tags.iter().map(|&tag| Self::try_from(tag)).collect()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Binary => "BINARY",
        }
    }
}

impl TryFrom<i32> for DataType {
    type Error = Error;

    fn try_from(tag: i32) -> Result<Self> {
        match tag {
            0 => Ok(Self::Boolean),
            1 => Ok(Self::Integer),
            2 => Ok(Self::Long),
            3 => Ok(Self::Float),
            4 => Ok(Self::Double),
            5 => Ok(Self::Binary),
            other => Err(Error::UnsupportedType { tag: other }),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reduction applied by aggregate and downsampling queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregateType {
    Max,
    Min,
    Sum,
    Count,
    Avg,
    FirstValue,
    LastValue,
}

impl AggregateType {
    #[must_use]
    pub const fn tag(self) -> i32 {
        match self {
            Self::Max => 0,
            Self::Min => 1,
            Self::Sum => 2,
            Self::Count => 3,
            Self::Avg => 4,
            Self::FirstValue => 5,
            Self::LastValue => 6,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::Sum => "SUM",
            Self::Count => "COUNT",
            Self::Avg => "AVG",
            Self::FirstValue => "FIRST_VALUE",
            Self::LastValue => "LAST_VALUE",
        }
    }
}

impl TryFrom<i32> for AggregateType {
    type Error = Error;

    fn try_from(tag: i32) -> Result<Self> {
        match tag {
            0 => Ok(Self::Max),
            1 => Ok(Self::Min),
            2 => Ok(Self::Sum),
            3 => Ok(Self::Count),
            4 => Ok(Self::Avg),
            5 => Ok(Self::FirstValue),
            6 => Ok(Self::LastValue),
            other => Err(Error::validation(format!(
                "unknown aggregate type tag {other}"
            ))),
        }
    }
}

impl fmt::Display for AggregateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A series known to the server together with its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub path: String,
    pub data_type: DataType,
}

impl TimeSeries {
    #[must_use]
    pub fn new(path: impl Into<String>, data_type: DataType) -> Self {
        Self {
            path: path.into(),
            data_type,
        }
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path: {}, Type: {}", self.path, self.data_type)
    }
}
