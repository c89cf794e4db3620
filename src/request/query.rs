use crate::api::FetchOptions;
use crate::error::{Error, Result};
use crate::metadata::AggregateType;

use super::paths::normalize_for_read;

fn merged_paths<S: AsRef<str>>(paths: &[S]) -> Result<Vec<String>> {
    if paths.is_empty() {
        return Err(Error::validation("query requires at least one path"));
    }
    Ok(normalize_for_read(paths))
}

fn check_range(start_time: i64, end_time: i64) -> Result<()> {
    if start_time > end_time {
        return Err(Error::validation(format!(
            "start time {start_time} is after end time {end_time}"
        )));
    }
    Ok(())
}

/// Raw data over `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub paths: Vec<String>,
    pub start_time: i64,
    pub end_time: i64,
}

impl QueryRequest {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty path list or inverted range.
    pub fn new<S: AsRef<str>>(paths: &[S], start_time: i64, end_time: i64) -> Result<Self> {
        check_range(start_time, end_time)?;
        Ok(Self {
            paths: merged_paths(paths)?,
            start_time,
            end_time,
        })
    }
}

/// One aggregated value per series per `precision`-wide window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownsampleQueryRequest {
    pub paths: Vec<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub aggregate_type: AggregateType,
    pub precision: i64,
}

impl DownsampleQueryRequest {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty path list, inverted range or
    /// non-positive precision.
    pub fn new<S: AsRef<str>>(
        paths: &[S],
        start_time: i64,
        end_time: i64,
        aggregate_type: AggregateType,
        precision: i64,
    ) -> Result<Self> {
        check_range(start_time, end_time)?;
        if precision <= 0 {
            return Err(Error::validation(format!(
                "downsample precision must be positive, got {precision}"
            )));
        }
        Ok(Self {
            paths: merged_paths(paths)?,
            start_time,
            end_time,
            aggregate_type,
            precision,
        })
    }
}

/// A single aggregated value per series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateQueryRequest {
    pub paths: Vec<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub aggregate_type: AggregateType,
}

impl AggregateQueryRequest {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty path list or inverted range.
    pub fn new<S: AsRef<str>>(
        paths: &[S],
        start_time: i64,
        end_time: i64,
        aggregate_type: AggregateType,
    ) -> Result<Self> {
        check_range(start_time, end_time)?;
        Ok(Self {
            paths: merged_paths(paths)?,
            start_time,
            end_time,
            aggregate_type,
        })
    }
}

/// Most recent sample at or after `start_time`, per series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastQueryRequest {
    pub paths: Vec<String>,
    pub start_time: i64,
}

impl LastQueryRequest {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty path list.
    pub fn new<S: AsRef<str>>(paths: &[S], start_time: i64) -> Result<Self> {
        Ok(Self {
            paths: merged_paths(paths)?,
            start_time,
        })
    }
}

/// Removes samples of the given series over `[start_time, end_time)`.
///
/// Paths are sent as given and the range is passed through unchecked; the
/// server decides what an inverted range deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDataRequest {
    pub paths: Vec<String>,
    pub start_time: i64,
    pub end_time: i64,
}

impl DeleteDataRequest {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty path list.
    pub fn new<S: AsRef<str>>(paths: &[S], start_time: i64, end_time: i64) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::validation("delete requires at least one path"));
        }
        Ok(Self {
            paths: paths.iter().map(|path| path.as_ref().to_owned()).collect(),
            start_time,
            end_time,
        })
    }
}

/// Asks the server for the next page of an open result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub query_id: i64,
    pub fetch_size: i32,
}

impl FetchRequest {
    #[must_use]
    pub const fn new(query_id: i64, options: &FetchOptions) -> Self {
        Self {
            query_id,
            fetch_size: options.fetch_size(),
        }
    }
}
