use std::borrow::Cow;

use byteorder::{BigEndian, ByteOrder};
use smallvec::SmallVec;

use crate::error::{Error, Result, Section};
use crate::metadata::DataType;
use crate::value::{Row, Value};

use super::bitmap::BitMask;
use super::cursor::ByteCursor;
use super::scalar::{decode_value, encode_value};

/// Dense value buffer plus the presence mask needed to replay it.
///
/// The buffer holds only the present values, back to back; absent slots have
/// no placeholder bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub values: Vec<u8>,
    pub bitmap: BitMask<'static>,
}

fn encode_dense<'v, F, S>(
    values: &[Option<Value<'v>>],
    type_at: F,
    section_at: S,
) -> Result<Encoded>
where
    F: Fn(usize) -> DataType,
    S: Fn(usize) -> Section,
{
    let mut bitmap = BitMask::new(values.len());
    let mut buffer = Vec::new();
    for (index, value) in values.iter().enumerate() {
        let Some(value) = value else {
            continue;
        };
        bitmap.mark(index)?;
        encode_value(&mut buffer, type_at(index), value)
            .map_err(|err| err.in_section(section_at(index)))?;
    }
    Ok(Encoded {
        values: buffer,
        bitmap,
    })
}

/// Encodes one row: every path's value at a single timestamp.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `values` and `types` differ in length and
/// [`Error::TypeMismatch`] when a present value disagrees with its column type.
pub fn encode_row(values: &[Option<Value<'_>>], types: &[DataType]) -> Result<Encoded> {
    encode_row_at(0, values, types)
}

pub(crate) fn encode_row_at(
    row: usize,
    values: &[Option<Value<'_>>],
    types: &[DataType],
) -> Result<Encoded> {
    if values.len() != types.len() {
        return Err(Error::validation(format!(
            "row {row} has {} values for {} declared types",
            values.len(),
            types.len()
        )));
    }
    let section_at = |column| Section::Cell { row, column };
    encode_dense(values, |column| types[column], section_at)
}

/// Encodes one column: a single path's values across timestamps.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] when a present value is not `data_type`.
pub fn encode_column(values: &[Option<Value<'_>>], data_type: DataType) -> Result<Encoded> {
    encode_column_at(0, values, data_type)
}

pub(crate) fn encode_column_at(
    column: usize,
    values: &[Option<Value<'_>>],
    data_type: DataType,
) -> Result<Encoded> {
    encode_dense(values, |_| data_type, |row| Section::Cell { row, column })
}

/// Decodes a row by replaying `bitmap` against `types`.
///
/// # Errors
///
/// Returns [`Error::Corrupted`] if the value buffer or bitmask is shorter than
/// the bits it declares present.
pub fn decode_row<'a>(
    buffer: &'a [u8],
    bitmap: &BitMask<'_>,
    types: &[DataType],
) -> Result<Row<'a>> {
    let mut values = SmallVec::<[Option<Value<'a>>; 16]>::new();
    decode_row_into(buffer, bitmap, types, &mut values)?;
    Ok(values.into_vec())
}

/// Decodes a row into the provided buffer, reusing its capacity.
///
/// # Errors
///
/// See [`decode_row`].
pub fn decode_row_into<'a>(
    buffer: &'a [u8],
    bitmap: &BitMask<'_>,
    types: &[DataType],
    values: &mut SmallVec<[Option<Value<'a>>; 16]>,
) -> Result<()> {
    values.clear();
    values.reserve(types.len());
    let mut cursor = ByteCursor::new(buffer);
    for (column, &data_type) in types.iter().enumerate() {
        if bitmap.test(column)? {
            let value = decode_value(&mut cursor, data_type)
                .map_err(|err| err.in_section(Section::Cell { row: 0, column }))?;
            values.push(Some(value));
        } else {
            values.push(None);
        }
    }
    Ok(())
}

/// Decodes `len` cells of a single-typed column by replaying `bitmap`.
///
/// # Errors
///
/// Returns [`Error::Corrupted`] if the buffer ends before the last present value.
pub fn decode_column<'a>(
    buffer: &'a [u8],
    bitmap: &BitMask<'_>,
    data_type: DataType,
) -> Result<Row<'a>> {
    let mut cursor = ByteCursor::new(buffer);
    (0..bitmap.capacity())
        .map(|row| {
            if bitmap.test(row)? {
                decode_value(&mut cursor, data_type)
                    .map(Some)
                    .map_err(|err| err.in_section(Section::Cell { row, column: 0 }))
            } else {
                Ok(None)
            }
        })
        .collect()
}

/// Encodes timestamps as consecutive big-endian longs; they are never null.
#[must_use]
pub fn encode_timestamps(timestamps: &[i64]) -> Vec<u8> {
    let mut buffer = vec![0u8; timestamps.len() * 8];
    BigEndian::write_i64_into(timestamps, &mut buffer);
    buffer
}

/// Decodes an all-present timestamp buffer.
///
/// # Errors
///
/// Returns [`Error::Corrupted`] when the buffer length is not a multiple of 8.
pub fn decode_timestamps(buffer: &[u8]) -> Result<Vec<i64>> {
    if buffer.len() % 8 != 0 {
        return Err(Error::Corrupted {
            section: Section::Timestamps,
            details: Cow::Owned(format!(
                "timestamp buffer of {} bytes is not a whole number of longs",
                buffer.len()
            )),
        });
    }
    let mut timestamps = vec![0i64; buffer.len() / 8];
    BigEndian::read_i64_into(buffer, &mut timestamps);
    Ok(timestamps)
}
