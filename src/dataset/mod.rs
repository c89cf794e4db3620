//! Reconstruction of query results from raw response buffers.
//!
//! Every assembler here is a pure function of its inputs. Values borrow text
//! from the response buffers; call `into_owned` to detach a result from them.

mod sql;
mod stream;

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::codec::{BitMask, decode_row, decode_timestamps, decode_values};
use crate::error::{Error, Result, Section};
use crate::metadata::{AggregateType, DataType};
use crate::sinks::{RowSink, SinkContext};
use crate::value::{Row, Value};

pub use sql::{SqlKind, SqlPayload, SqlResponse, SqlResult};
pub use stream::{FetchState, FetchedPage, PageSource, PagedResult};

fn shape_error(section: Section, details: String) -> Error {
    Error::Corrupted {
        section,
        details: Cow::Owned(details),
    }
}

fn check_types(paths: &[String], types: &[DataType]) -> Result<()> {
    if paths.len() != types.len() {
        return Err(Error::validation(format!(
            "{} paths but {} data types",
            paths.len(),
            types.len()
        )));
    }
    Ok(())
}

fn fmt_cell(f: &mut fmt::Formatter<'_>, value: Option<&Value<'_>>) -> fmt::Result {
    match value {
        Some(value) => write!(f, "{value}"),
        None => f.write_str("null"),
    }
}

/// Row-major query result: one optional value per path per timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularResult<'a> {
    pub paths: Vec<String>,
    pub types: Vec<DataType>,
    pub timestamps: Vec<i64>,
    pub rows: Vec<Row<'a>>,
}

/// Decodes a row-oriented response.
///
/// `values_list[r]` is replayed against `bitmap_list[r]` and `types`. The
/// timestamp buffer is either empty (results with no time column) or holds
/// exactly one timestamp per row.
///
/// # Errors
///
/// Returns [`Error::Validation`] when paths and types disagree and
/// [`Error::Corrupted`] when buffers do not line up or run short.
pub fn assemble_tabular<'a, V, B>(
    paths: Vec<String>,
    types: Vec<DataType>,
    timestamp_buffer: &'a [u8],
    values_list: &'a [V],
    bitmap_list: &'a [B],
) -> Result<TabularResult<'a>>
where
    V: AsRef<[u8]>,
    B: AsRef<[u8]>,
{
    check_types(&paths, &types)?;
    if values_list.len() != bitmap_list.len() {
        return Err(shape_error(
            Section::Bitmap,
            format!(
                "{} value buffers but {} bitmaps",
                values_list.len(),
                bitmap_list.len()
            ),
        ));
    }
    let timestamps = decode_timestamps(timestamp_buffer)?;
    if !timestamps.is_empty() && timestamps.len() != values_list.len() {
        return Err(shape_error(
            Section::Timestamps,
            format!(
                "{} timestamps for {} rows",
                timestamps.len(),
                values_list.len()
            ),
        ));
    }

    let rows = values_list
        .iter()
        .zip(bitmap_list)
        .enumerate()
        .map(|(row, (values, bitmap))| {
            let bitmap = BitMask::view(types.len(), bitmap.as_ref());
            decode_row(values.as_ref(), &bitmap, &types).map_err(|err| match err {
                Error::Corrupted {
                    section: Section::Cell { column, .. },
                    details,
                } => Error::Corrupted {
                    section: Section::Cell { row, column },
                    details,
                },
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TabularResult {
        paths,
        types,
        timestamps,
        rows,
    })
}

impl TabularResult<'_> {
    #[must_use]
    pub fn into_owned(self) -> TabularResult<'static> {
        TabularResult {
            paths: self.paths,
            types: self.types,
            timestamps: self.timestamps,
            rows: self
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(|v| v.map(Value::into_owned)).collect())
                .collect(),
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `column`); `None` when out of range or absent.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<&Value<'_>> {
        self.rows.get(row)?.get(column)?.as_ref()
    }

    /// Forwards every row, with its timestamp when present, into `sink`.
    ///
    /// # Errors
    ///
    /// Propagates failures reported by the sink.
    pub fn write_to<S: RowSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.begin(SinkContext {
            paths: &self.paths,
            types: &self.types,
            has_timestamps: !self.timestamps.is_empty(),
        })?;
        for (index, row) in self.rows.iter().enumerate() {
            sink.write_row(self.timestamps.get(index).copied(), row)?;
        }
        sink.finish()
    }
}

impl fmt::Display for TabularResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timed = !self.timestamps.is_empty();
        if timed {
            f.write_str("Time")?;
        }
        for (index, path) in self.paths.iter().enumerate() {
            if timed || index > 0 {
                f.write_str(" ")?;
            }
            f.write_str(path)?;
        }
        writeln!(f)?;
        for (index, row) in self.rows.iter().enumerate() {
            if timed {
                match self.timestamps.get(index) {
                    Some(timestamp) => write!(f, "{timestamp}")?,
                    None => f.write_str("null")?,
                }
            }
            for (column, value) in row.iter().enumerate() {
                if timed || column > 0 {
                    f.write_str(" ")?;
                }
                fmt_cell(f, value.as_ref())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Aggregate or downsampled result.
///
/// Without timestamps there is one value per path. With timestamps there is
/// one value per path per window, laid out path-major:
/// `values[path * windows + window]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult<'a> {
    pub paths: Vec<String>,
    pub aggregate_type: AggregateType,
    pub timestamps: Option<Vec<i64>>,
    pub values: Vec<Value<'a>>,
}

/// Decodes a dense, all-present aggregate response.
///
/// `types` either has one entry per decoded value, or one entry per path when
/// windows are present, in which case each path's type covers all its windows.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `types` fits neither layout and
/// [`Error::Corrupted`] when the buffers run short.
pub fn assemble_aggregate<'a>(
    paths: Vec<String>,
    types: &[DataType],
    aggregate_type: AggregateType,
    timestamp_buffer: Option<&[u8]>,
    value_buffer: &'a [u8],
) -> Result<AggregateResult<'a>> {
    let timestamps = timestamp_buffer.map(decode_timestamps).transpose()?;
    let windows = timestamps.as_ref().map_or(1, Vec::len);
    let expected = paths.len() * windows;

    let expanded;
    let value_types = if types.len() == expected {
        types
    } else if timestamps.is_some() && types.len() == paths.len() {
        expanded = types
            .iter()
            .flat_map(|&data_type| std::iter::repeat_n(data_type, windows))
            .collect::<Vec<_>>();
        &expanded[..]
    } else {
        return Err(Error::validation(format!(
            "{} data types for {} paths over {windows} windows",
            types.len(),
            paths.len()
        )));
    };

    Ok(AggregateResult {
        values: decode_values(value_buffer, value_types)?,
        paths,
        aggregate_type,
        timestamps,
    })
}

impl AggregateResult<'_> {
    #[must_use]
    pub fn into_owned(self) -> AggregateResult<'static> {
        AggregateResult {
            paths: self.paths,
            aggregate_type: self.aggregate_type,
            timestamps: self.timestamps,
            values: self.values.into_iter().map(Value::into_owned).collect(),
        }
    }

    #[must_use]
    pub fn window_count(&self) -> usize {
        self.timestamps.as_ref().map_or(1, Vec::len)
    }

    /// Aggregated value of `path` in `window` (window 0 for flat results).
    #[must_use]
    pub fn value(&self, path: usize, window: usize) -> Option<&Value<'_>> {
        let windows = self.window_count();
        if path >= self.paths.len() || window >= windows {
            return None;
        }
        self.values.get(path * windows + window)
    }
}

impl fmt::Display for AggregateResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self
            .paths
            .iter()
            .map(|path| format!("{}({path})", self.aggregate_type))
            .collect::<Vec<_>>()
            .join(" ");
        match &self.timestamps {
            Some(timestamps) => {
                writeln!(f, "Time {header}")?;
                for (window, timestamp) in timestamps.iter().enumerate() {
                    write!(f, "{timestamp}")?;
                    for path in 0..self.paths.len() {
                        f.write_str(" ")?;
                        fmt_cell(f, self.value(path, window))?;
                    }
                    writeln!(f)?;
                }
            }
            None => {
                writeln!(f, "{header}")?;
                for (index, value) in self.values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{value}")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Most recent sample of one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastValue<'a> {
    pub path: String,
    pub data_type: DataType,
    pub timestamp: i64,
    pub value: Value<'a>,
}

/// One entry per series, in path order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastValueResult<'a> {
    pub entries: Vec<LastValue<'a>>,
}

/// Zips paths, types, one timestamp per path and one dense value per path.
///
/// The server has already picked each series' latest sample.
///
/// # Errors
///
/// Returns [`Error::Validation`] when paths and types disagree and
/// [`Error::Corrupted`] when the buffers do not hold one entry per path.
pub fn assemble_last_value<'a>(
    paths: Vec<String>,
    types: Vec<DataType>,
    timestamp_buffer: &[u8],
    value_buffer: &'a [u8],
) -> Result<LastValueResult<'a>> {
    check_types(&paths, &types)?;
    let timestamps = decode_timestamps(timestamp_buffer)?;
    if timestamps.len() != paths.len() {
        return Err(shape_error(
            Section::Timestamps,
            format!("{} timestamps for {} paths", timestamps.len(), paths.len()),
        ));
    }
    let values = decode_values(value_buffer, &types)?;

    let entries = paths
        .into_iter()
        .zip(types)
        .zip(timestamps)
        .zip(values)
        .map(|(((path, data_type), timestamp), value)| LastValue {
            path,
            data_type,
            timestamp,
            value,
        })
        .collect();
    Ok(LastValueResult { entries })
}

impl LastValueResult<'_> {
    #[must_use]
    pub fn into_owned(self) -> LastValueResult<'static> {
        LastValueResult {
            entries: self
                .entries
                .into_iter()
                .map(|entry| LastValue {
                    path: entry.path,
                    data_type: entry.data_type,
                    timestamp: entry.timestamp,
                    value: entry.value.into_owned(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&LastValue<'_>> {
        self.entries.iter().find(|entry| entry.path == path)
    }
}

impl fmt::Display for LastValueResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time Path Value")?;
        for entry in &self.entries {
            writeln!(f, "{} {} {}", entry.timestamp, entry.path, entry.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_row, encode_timestamps, encode_value};

    fn paths(names: &[&str]) -> Vec<String> {
        names.iter().map(|&name| name.to_owned()).collect()
    }

    #[test]
    fn tabular_replays_each_row_bitmap() {
        let types = vec![DataType::Integer, DataType::Binary];
        let first = encode_row(&[Some(Value::Integer(1)), None], &types).unwrap();
        let second = encode_row(&[None, Some(Value::from("b"))], &types).unwrap();
        let values = vec![first.values, second.values];
        let bitmaps = vec![first.bitmap.into_bytes(), second.bitmap.into_bytes()];
        let ts = encode_timestamps(&[10, 20]);

        let table = assemble_tabular(paths(&["s1", "s2"]), types, &ts, &values, &bitmaps).unwrap();
        assert_eq!(table.timestamps, vec![10, 20]);
        assert_eq!(table.rows[0], vec![Some(Value::Integer(1)), None]);
        assert_eq!(table.get(1, 1), Some(&Value::from("b")));
        assert_eq!(table.get(1, 0), None);
        assert_eq!(table.to_string(), "Time s1 s2\n10 1 null\n20 null b\n");
    }

    #[test]
    fn hand_built_table_with_missing_timestamps_still_prints() {
        let table = TabularResult {
            paths: paths(&["s"]),
            types: vec![DataType::Long],
            timestamps: vec![1],
            rows: vec![vec![Some(Value::Long(3))], vec![None]],
        };
        assert_eq!(table.to_string(), "Time s\n1 3\nnull null\n");
    }

    #[test]
    fn tabular_rejects_misaligned_buffers() {
        let types = vec![DataType::Long];
        let ts = encode_timestamps(&[1, 2]);
        let values = vec![vec![0u8; 8]];
        let bitmaps = vec![vec![1u8]];
        let err = assemble_tabular(paths(&["a"]), types.clone(), &ts, &values, &bitmaps);
        assert!(matches!(
            err,
            Err(Error::Corrupted {
                section: Section::Timestamps,
                ..
            })
        ));

        let no_bitmaps: Vec<Vec<u8>> = Vec::new();
        let err = assemble_tabular(paths(&["a"]), types, &[], &values, &no_bitmaps);
        assert!(matches!(
            err,
            Err(Error::Corrupted {
                section: Section::Bitmap,
                ..
            })
        ));
    }

    #[test]
    fn tabular_underrun_names_the_cell() {
        let types = vec![DataType::Integer, DataType::Long];
        let values = vec![vec![0u8; 8], vec![0u8; 4]];
        let bitmaps = vec![vec![0b10u8], vec![0b11u8]];
        let err = assemble_tabular(paths(&["a", "b"]), types, &[], &values, &bitmaps).unwrap_err();
        assert!(matches!(
            err,
            Error::Corrupted {
                section: Section::Cell { row: 1, column: 1 },
                ..
            }
        ));
    }

    #[test]
    fn aggregate_flat_and_windowed() {
        let mut buffer = Vec::new();
        encode_value(&mut buffer, DataType::Long, &Value::Long(5)).unwrap();
        encode_value(&mut buffer, DataType::Double, &Value::Double(2.5)).unwrap();
        let flat = assemble_aggregate(
            paths(&["a", "b"]),
            &[DataType::Long, DataType::Double],
            AggregateType::Max,
            None,
            &buffer,
        )
        .unwrap();
        assert_eq!(flat.value(1, 0), Some(&Value::Double(2.5)));
        assert_eq!(flat.to_string(), "MAX(a) MAX(b)\n5 2.5\n");

        let mut buffer = Vec::new();
        for v in [1i64, 2, 3, 4] {
            encode_value(&mut buffer, DataType::Long, &Value::Long(v)).unwrap();
        }
        let ts = encode_timestamps(&[0, 5]);
        let windowed = assemble_aggregate(
            paths(&["a", "b"]),
            &[DataType::Long, DataType::Long],
            AggregateType::Sum,
            Some(&ts),
            &buffer,
        )
        .unwrap();
        assert_eq!(windowed.window_count(), 2);
        assert_eq!(windowed.value(0, 1), Some(&Value::Long(2)));
        assert_eq!(windowed.value(1, 0), Some(&Value::Long(3)));
        assert_eq!(windowed.value(2, 0), None);
        assert_eq!(windowed.to_string(), "Time SUM(a) SUM(b)\n0 1 3\n5 2 4\n");
    }

    #[test]
    fn aggregate_rejects_unusable_type_lists() {
        let err = assemble_aggregate(
            paths(&["a", "b"]),
            &[DataType::Long],
            AggregateType::Count,
            None,
            &[],
        );
        assert!(matches!(err, Err(Error::Validation { .. })));
    }

    #[test]
    fn aggregate_rejects_values_it_did_not_read() {
        let mut buffer = Vec::new();
        encode_value(&mut buffer, DataType::Long, &Value::Long(5)).unwrap();
        encode_value(&mut buffer, DataType::Long, &Value::Long(6)).unwrap();

        let no_windows = assemble_aggregate(
            paths(&["a", "b"]),
            &[DataType::Long, DataType::Long],
            AggregateType::Max,
            Some(&[]),
            &buffer,
        );
        assert!(matches!(no_windows, Err(Error::Corrupted { .. })));

        let flat = assemble_aggregate(
            paths(&["a"]),
            &[DataType::Long],
            AggregateType::Max,
            None,
            &buffer,
        );
        assert!(matches!(flat, Err(Error::Corrupted { .. })));
    }

    #[test]
    fn last_value_rejects_trailing_value_bytes() {
        let mut buffer = Vec::new();
        encode_value(&mut buffer, DataType::Integer, &Value::Integer(1)).unwrap();
        encode_value(&mut buffer, DataType::Integer, &Value::Integer(2)).unwrap();
        let ts = encode_timestamps(&[4]);
        let err = assemble_last_value(paths(&["a"]), vec![DataType::Integer], &ts, &buffer);
        assert!(matches!(err, Err(Error::Corrupted { .. })));
    }

    #[test]
    fn last_value_zips_parallel_arrays() {
        let mut buffer = Vec::new();
        encode_value(&mut buffer, DataType::Boolean, &Value::Boolean(true)).unwrap();
        encode_value(&mut buffer, DataType::Binary, &Value::from("on")).unwrap();
        let ts = encode_timestamps(&[100, 90]);
        let last = assemble_last_value(
            paths(&["d.flag", "d.mode"]),
            vec![DataType::Boolean, DataType::Binary],
            &ts,
            &buffer,
        )
        .unwrap();
        assert_eq!(last.len(), 2);
        let mode = last.get("d.mode").unwrap();
        assert_eq!(mode.timestamp, 90);
        assert_eq!(mode.value, Value::from("on"));
        assert_eq!(
            last.to_string(),
            "Time Path Value\n100 d.flag true\n90 d.mode on\n"
        );
    }

    #[test]
    fn last_value_requires_one_timestamp_per_path() {
        let ts = encode_timestamps(&[1]);
        let err = assemble_last_value(
            paths(&["a", "b"]),
            vec![DataType::Long, DataType::Long],
            &ts,
            &[0; 16],
        );
        assert!(matches!(err, Err(Error::Corrupted { .. })));
    }

    #[test]
    fn assemblers_are_deterministic() {
        let types = vec![DataType::Double];
        let encoded = encode_row(&[Some(Value::Double(0.1))], &types).unwrap();
        let values = vec![encoded.values];
        let bitmaps = vec![encoded.bitmap.into_bytes()];
        let ts = encode_timestamps(&[7]);
        let once = assemble_tabular(paths(&["x"]), types.clone(), &ts, &values, &bitmaps).unwrap();
        let twice = assemble_tabular(paths(&["x"]), types, &ts, &values, &bitmaps).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.into_owned(), twice);
    }
}
