use std::borrow::Cow;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result, Section};

/// Forward-only reader over a big-endian response buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consumes exactly `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupted`] if fewer than `len` bytes remain.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::Corrupted {
                section: Section::Value,
                details: Cow::Owned(format!(
                    "needed {len} bytes at offset {} but only {} remain",
                    self.position,
                    self.remaining()
                )),
            });
        }
        let start = self.position;
        self.position += len;
        Ok(&self.buffer[start..self.position])
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.take(4).map(BigEndian::read_i32)
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        self.take(8).map(BigEndian::read_i64)
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.take(4).map(BigEndian::read_f32)
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        self.take(8).map(BigEndian::read_f64)
    }
}
