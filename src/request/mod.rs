mod paths;
mod permute;
mod query;

use crate::api::WriteOptions;
use crate::codec::{encode_column_at, encode_row_at, encode_timestamps};
use crate::error::{Error, Result};
use crate::metadata::DataType;
use crate::value::Row;

pub use paths::{WILDCARD, normalize_for_read, pattern_prefix};
pub use permute::Permutation;
pub use query::{
    AggregateQueryRequest, DeleteDataRequest, DownsampleQueryRequest, FetchRequest,
    LastQueryRequest, QueryRequest,
};

/// Whether each inner value sequence of a batch is one timestamp or one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `values[t][p]`: one entry per timestamp, each holding every path.
    Row,
    /// `values[p][t]`: one entry per path, each holding every timestamp.
    Column,
}

/// Values to insert, with paths, types and timestamps co-indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch<'v> {
    pub orientation: Orientation,
    pub paths: Vec<String>,
    pub types: Vec<DataType>,
    pub timestamps: Vec<i64>,
    pub values: Vec<Row<'v>>,
}

impl<'v> RecordBatch<'v> {
    #[must_use]
    pub const fn rows(
        paths: Vec<String>,
        types: Vec<DataType>,
        timestamps: Vec<i64>,
        values: Vec<Row<'v>>,
    ) -> Self {
        Self {
            orientation: Orientation::Row,
            paths,
            types,
            timestamps,
            values,
        }
    }

    #[must_use]
    pub const fn columns(
        paths: Vec<String>,
        types: Vec<DataType>,
        timestamps: Vec<i64>,
        values: Vec<Row<'v>>,
    ) -> Self {
        Self {
            orientation: Orientation::Column,
            paths,
            types,
            timestamps,
            values,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.paths.is_empty()
            || self.types.is_empty()
            || self.timestamps.is_empty()
            || self.values.is_empty()
        {
            return Err(Error::validation(
                "paths, types, timestamps and values must all be non-empty",
            ));
        }
        if self.paths.len() != self.types.len() {
            return Err(Error::validation(format!(
                "{} paths but {} data types",
                self.paths.len(),
                self.types.len()
            )));
        }
        let (outer, inner, outer_name, inner_name) = match self.orientation {
            Orientation::Row => (self.timestamps.len(), self.paths.len(), "timestamps", "paths"),
            Orientation::Column => (self.paths.len(), self.timestamps.len(), "paths", "timestamps"),
        };
        if self.values.len() != outer {
            return Err(Error::validation(format!(
                "{} value lists for {outer} {outer_name}",
                self.values.len()
            )));
        }
        if let Some((index, values)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != inner)
        {
            return Err(Error::validation(format!(
                "value list {index} holds {} values for {inner} {inner_name}",
                values.len()
            )));
        }
        Ok(())
    }
}

/// Sorts timestamps ascending and paths byte-wise ascending, moving types and
/// values with them.
///
/// Both sorts are stable. Each permutation is computed once and applied only
/// to the sequences indexed by the dimension it sorts.
///
/// # Errors
///
/// Returns [`Error::Validation`] when any sequence is empty or the parallel
/// arrays disagree in length.
pub fn normalize_for_write(batch: RecordBatch<'_>) -> Result<RecordBatch<'_>> {
    batch.validate()?;
    let RecordBatch {
        orientation,
        paths,
        types,
        timestamps,
        values,
    } = batch;

    let by_time = Permutation::sorting(&timestamps);
    let by_path = Permutation::sorting(&paths);

    let values = match orientation {
        Orientation::Row => by_path.apply_each(by_time.apply(values)?)?,
        Orientation::Column => by_time.apply_each(by_path.apply(values)?)?,
    };

    Ok(RecordBatch {
        orientation,
        paths: by_path.apply(paths)?,
        types: by_path.apply(types)?,
        timestamps: by_time.apply(timestamps)?,
        values,
    })
}

/// Which insert call an encoded batch is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertKind {
    Row,
    NonAlignedRow,
    Column,
    NonAlignedColumn,
}

impl InsertKind {
    const fn from_parts(orientation: Orientation, aligned: bool) -> Self {
        match (orientation, aligned) {
            (Orientation::Row, true) => Self::Row,
            (Orientation::Row, false) => Self::NonAlignedRow,
            (Orientation::Column, true) => Self::Column,
            (Orientation::Column, false) => Self::NonAlignedColumn,
        }
    }
}

/// Fully encoded insert request, ready to hand to the RPC layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertRecords {
    pub kind: InsertKind,
    pub paths: Vec<String>,
    pub timestamps: Vec<u8>,
    pub values_list: Vec<Vec<u8>>,
    pub bitmap_list: Vec<Vec<u8>>,
    pub data_types: Vec<DataType>,
}

impl InsertRecords {
    #[must_use]
    pub fn data_type_tags(&self) -> Vec<i32> {
        self.data_types
            .iter()
            .map(|data_type| data_type.tag())
            .collect()
    }
}

/// Normalizes then encodes a batch into the outbound insert shape.
///
/// Nothing is returned unless every value encodes; positions in errors refer
/// to the normalized (sorted) batch.
///
/// # Errors
///
/// Returns [`Error::Validation`] for malformed batches and
/// [`Error::TypeMismatch`] when a value disagrees with its path's type.
pub fn encode_records(batch: RecordBatch<'_>, options: WriteOptions) -> Result<InsertRecords> {
    let batch = normalize_for_write(batch)?;

    let encoded = match batch.orientation {
        Orientation::Row => batch
            .values
            .iter()
            .enumerate()
            .map(|(row, values)| encode_row_at(row, values, &batch.types))
            .collect::<Result<Vec<_>>>()?,
        Orientation::Column => batch
            .values
            .iter()
            .zip(&batch.types)
            .enumerate()
            .map(|(column, (values, &data_type))| encode_column_at(column, values, data_type))
            .collect::<Result<Vec<_>>>()?,
    };

    let (values_list, bitmap_list) = encoded
        .into_iter()
        .map(|encoded| (encoded.values, encoded.bitmap.into_bytes()))
        .unzip();

    Ok(InsertRecords {
        kind: InsertKind::from_parts(batch.orientation, options.aligned()),
        timestamps: encode_timestamps(&batch.timestamps),
        paths: batch.paths,
        values_list,
        bitmap_list,
        data_types: batch.types,
    })
}
