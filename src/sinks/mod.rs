mod csv;

use crate::error::Result;
use crate::metadata::DataType;
use crate::value::Value;

pub use self::csv::{CsvSink, TimestampFormat};

/// Describes the columns of a result to sinks during initialisation.
#[derive(Debug, Clone, Copy)]
pub struct SinkContext<'a> {
    pub paths: &'a [String],
    pub types: &'a [DataType],
    /// Whether rows arrive with a timestamp.
    pub has_timestamps: bool,
}

/// Trait implemented by row sinks that consume decoded result rows.
pub trait RowSink {
    /// Called before any rows are written to allow the sink to initialise internal state.
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()>;

    /// Invoked for every decoded row; `None` cells are absent values.
    fn write_row(&mut self, timestamp: Option<i64>, row: &[Option<Value<'_>>]) -> Result<()>;

    /// Called once all rows have been forwarded to the sink.
    fn finish(&mut self) -> Result<()>;
}
