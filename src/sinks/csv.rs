use std::borrow::Cow;
use std::io::Write;

use csv::{ByteRecord, Writer, WriterBuilder};
use itoa::Buffer as ItoaBuffer;
use ryu::Buffer as RyuBuffer;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};
use crate::sinks::{RowSink, SinkContext};
use crate::value::Value;

/// How the leading time column is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    /// The raw epoch value as sent by the server.
    #[default]
    Raw,
    /// Epoch milliseconds rendered as RFC 3339 in UTC.
    Rfc3339Millis,
}

/// Writes decoded rows into a delimited text file (CSV/TSV).
pub struct CsvSink<W: Write> {
    output: Option<W>,
    writer: Option<Writer<W>>,
    delimiter: u8,
    write_headers: bool,
    timestamp_format: TimestampFormat,
    has_timestamps: bool,
    column_count: usize,
    record: ByteRecord,
    scratch: Vec<u8>,
}

impl<W: Write> CsvSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            output: Some(writer),
            writer: None,
            delimiter: b',',
            write_headers: true,
            timestamp_format: TimestampFormat::Raw,
            has_timestamps: false,
            column_count: 0,
            record: ByteRecord::new(),
            scratch: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub const fn with_headers(mut self, headers: bool) -> Self {
        self.write_headers = headers;
        self
    }

    #[must_use]
    pub const fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Returns the underlying writer once the sink has finished.
    #[must_use]
    pub fn into_inner(self) -> Option<W> {
        self.output
    }

    fn writer(&mut self) -> Result<&mut Writer<W>> {
        self.writer.as_mut().ok_or(Error::Sink {
            details: Cow::Borrowed("CSV sink used before begin"),
        })
    }

    fn encode_value(
        value: Option<&Value<'_>>,
        out: &mut Vec<u8>,
        ryu: &mut RyuBuffer,
        itoa: &mut ItoaBuffer,
    ) {
        out.clear();
        let Some(value) = value else {
            return;
        };
        match value {
            Value::Boolean(v) => out.extend_from_slice(if *v { b"true" } else { b"false" }),
            Value::Integer(v) => out.extend_from_slice(itoa.format(*v).as_bytes()),
            Value::Long(v) => out.extend_from_slice(itoa.format(*v).as_bytes()),
            Value::Float(v) => out.extend_from_slice(ryu.format(*v).as_bytes()),
            Value::Double(v) => out.extend_from_slice(ryu.format(*v).as_bytes()),
            Value::Binary(s) => out.extend_from_slice(s.as_bytes()),
        }
    }

    fn encode_timestamp(
        &self,
        timestamp: i64,
        out: &mut Vec<u8>,
        itoa: &mut ItoaBuffer,
    ) -> Result<()> {
        out.clear();
        match self.timestamp_format {
            TimestampFormat::Raw => out.extend_from_slice(itoa.format(timestamp).as_bytes()),
            TimestampFormat::Rfc3339Millis => {
                let nanos = i128::from(timestamp) * 1_000_000;
                let rendered = OffsetDateTime::from_unix_timestamp_nanos(nanos)
                    .map_err(|e| Error::Sink {
                        details: Cow::Owned(format!("timestamp {timestamp} out of range: {e}")),
                    })?
                    .format(&Rfc3339)
                    .map_err(|e| Error::Sink {
                        details: Cow::Owned(format!("timestamp {timestamp} not formattable: {e}")),
                    })?;
                out.extend_from_slice(rendered.as_bytes());
            }
        }
        Ok(())
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()> {
        if self.writer.is_some() {
            return Err(Error::Sink {
                details: Cow::from("CSV sink cannot be reused without finishing"),
            });
        }
        if context.paths.len() != context.types.len() {
            return Err(Error::Sink {
                details: Cow::from("column metadata length mismatch"),
            });
        }
        let output = self.output.take().ok_or(Error::Sink {
            details: Cow::Borrowed("CSV sink output already taken"),
        })?;
        let writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(output);
        self.writer = Some(writer);
        self.column_count = context.paths.len();
        self.has_timestamps = context.has_timestamps;

        if self.write_headers {
            let mut header = ByteRecord::with_capacity(0, self.column_count + 1);
            if self.has_timestamps {
                header.push_field(b"Time");
            }
            for path in context.paths {
                header.push_field(path.as_bytes());
            }
            self.writer()?.write_byte_record(&header)?;
        }
        Ok(())
    }

    fn write_row(&mut self, timestamp: Option<i64>, row: &[Option<Value<'_>>]) -> Result<()> {
        if row.len() != self.column_count {
            return Err(Error::Sink {
                details: Cow::Owned(format!(
                    "row length {} does not match expected {}",
                    row.len(),
                    self.column_count
                )),
            });
        }
        let mut record = std::mem::take(&mut self.record);
        let mut scratch = std::mem::take(&mut self.scratch);
        record.clear();
        let mut ryu = RyuBuffer::new();
        let mut itoa = ItoaBuffer::new();

        if self.has_timestamps {
            let timestamp = timestamp.ok_or(Error::Sink {
                details: Cow::Borrowed("row without timestamp in a timed result"),
            })?;
            self.encode_timestamp(timestamp, &mut scratch, &mut itoa)?;
            record.push_field(&scratch);
        }
        for value in row {
            Self::encode_value(value.as_ref(), &mut scratch, &mut ryu, &mut itoa);
            record.push_field(&scratch);
        }
        self.writer()?.write_byte_record(&record)?;

        self.record = record;
        self.scratch = scratch;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            let out = writer.into_inner().map_err(|e| Error::Sink {
                details: Cow::Owned(format!("csv into_inner failed: {e}")),
            })?;
            self.output = Some(out);
        }
        self.column_count = 0;
        self.record.clear();
        Ok(())
    }
}
