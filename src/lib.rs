//! Client-side data plane for a time-series database: the binary value
//! codecs, write-path normalization, result assembly and the paged result
//! cursor that sit between an application and the RPC transport.

pub mod api;
pub mod codec;
pub mod dataset;
pub mod error;
pub mod logger;
pub mod metadata;
pub mod request;
pub mod sinks;
pub mod value;

pub use crate::error::{Error, Result};
pub use api::{DEFAULT_FETCH_SIZE, FetchOptions, WriteOptions};
pub use codec::BitMask;
pub use dataset::{
    AggregateResult, FetchState, FetchedPage, LastValue, LastValueResult, PageSource, PagedResult,
    SqlResult, TabularResult, assemble_aggregate, assemble_last_value, assemble_tabular,
};
pub use metadata::{AggregateType, ClusterInfo, DataType, TimeSeries};
pub use request::{
    InsertKind, InsertRecords, Orientation, RecordBatch, encode_records, normalize_for_read,
    normalize_for_write,
};
pub use sinks::{CsvSink, RowSink, SinkContext, TimestampFormat};
pub use value::{Row, Value};
