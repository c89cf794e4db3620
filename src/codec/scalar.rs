use std::borrow::Cow;

use byteorder::{BigEndian, WriteBytesExt};
use simdutf8::basic;

use crate::error::{Error, Result, Section};
use crate::metadata::DataType;
use crate::value::Value;

use super::cursor::ByteCursor;

/// Appends the big-endian encoding of `value` as `data_type`.
///
/// Text is written as a 4-byte byte-length prefix followed by its UTF-8 bytes.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] when the runtime variant of `value` is not
/// `data_type`; the declared type is never coerced. Text longer than
/// `i32::MAX` bytes is rejected with [`Error::Validation`].
pub fn encode_value(out: &mut Vec<u8>, data_type: DataType, value: &Value<'_>) -> Result<()> {
    match (data_type, value) {
        (DataType::Boolean, Value::Boolean(v)) => out.write_u8(u8::from(*v))?,
        (DataType::Integer, Value::Integer(v)) => out.write_i32::<BigEndian>(*v)?,
        (DataType::Long, Value::Long(v)) => out.write_i64::<BigEndian>(*v)?,
        (DataType::Float, Value::Float(v)) => out.write_f32::<BigEndian>(*v)?,
        (DataType::Double, Value::Double(v)) => out.write_f64::<BigEndian>(*v)?,
        (DataType::Binary, Value::Binary(text)) => {
            let bytes = text.as_bytes();
            let len = i32::try_from(bytes.len()).map_err(|_| {
                Error::validation(format!("text of {} bytes exceeds i32 length", bytes.len()))
            })?;
            out.reserve(4 + bytes.len());
            out.write_i32::<BigEndian>(len)?;
            out.extend_from_slice(bytes);
        }
        (expected, found) => {
            return Err(Error::TypeMismatch {
                section: Section::Value,
                expected,
                found: found.data_type(),
            });
        }
    }
    Ok(())
}

/// Decodes one value of `data_type` and advances the cursor past it.
///
/// # Errors
///
/// Returns [`Error::Corrupted`] when the buffer ends before the value does or a
/// text length prefix is negative.
pub fn decode_value<'a>(cursor: &mut ByteCursor<'a>, data_type: DataType) -> Result<Value<'a>> {
    let value = match data_type {
        DataType::Boolean => Value::Boolean(cursor.read_u8()? != 0),
        DataType::Integer => Value::Integer(cursor.read_i32()?),
        DataType::Long => Value::Long(cursor.read_i64()?),
        DataType::Float => Value::Float(cursor.read_f32()?),
        DataType::Double => Value::Double(cursor.read_f64()?),
        DataType::Binary => {
            let len = cursor.read_i32()?;
            let len = usize::try_from(len).map_err(|_| Error::Corrupted {
                section: Section::Value,
                details: Cow::Owned(format!("negative text length {len}")),
            })?;
            Value::Binary(decode_text(cursor.take(len)?))
        }
    };
    Ok(value)
}

/// Decodes a dense sequence with one value per entry of `types`.
///
/// # Errors
///
/// Propagates [`Error::Corrupted`] from [`decode_value`], labelled with the
/// offending position, and returns it as well when bytes remain after the
/// last declared value.
pub fn decode_values<'a>(buffer: &'a [u8], types: &[DataType]) -> Result<Vec<Value<'a>>> {
    let mut cursor = ByteCursor::new(buffer);
    let values = types
        .iter()
        .enumerate()
        .map(|(column, &data_type)| {
            decode_value(&mut cursor, data_type)
                .map_err(|err| err.in_section(Section::Cell { row: 0, column }))
        })
        .collect::<Result<Vec<_>>>()?;
    if !cursor.is_empty() {
        return Err(Error::Corrupted {
            section: Section::Value,
            details: Cow::Owned(format!(
                "{} trailing bytes after {} declared values",
                cursor.remaining(),
                types.len()
            )),
        });
    }
    Ok(values)
}

fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    basic::from_utf8(bytes).map_or_else(|_| String::from_utf8_lossy(bytes), Cow::Borrowed)
}
