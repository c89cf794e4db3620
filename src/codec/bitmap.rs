use std::borrow::Cow;

use crate::error::{Error, Result, Section};

/// Fixed-capacity presence vector over `[0, capacity)`.
///
/// Bit `i` lives in byte `i / 8` at position `i % 8` (least significant bit
/// first). The mask is either owned and zeroed at construction, or a view over
/// a response buffer; it never grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMask<'a> {
    capacity: usize,
    storage: Cow<'a, [u8]>,
}

#[inline]
#[must_use]
pub const fn storage_len(capacity: usize) -> usize {
    capacity.div_ceil(8)
}

impl BitMask<'static> {
    /// Allocates a zeroed mask able to hold `capacity` bits.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            storage: Cow::Owned(vec![0u8; storage_len(capacity)]),
        }
    }
}

impl<'a> BitMask<'a> {
    /// Wraps an externally supplied buffer without copying.
    ///
    /// The buffer is expected to hold at least `ceil(capacity / 8)` bytes; a
    /// shorter buffer is only detected when an affected bit is accessed.
    #[must_use]
    pub const fn view(capacity: usize, buffer: &'a [u8]) -> Self {
        Self {
            capacity,
            storage: Cow::Borrowed(buffer),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.storage.into_owned()
    }

    const fn check(&self, index: usize) -> Result<()> {
        if index >= self.capacity {
            return Err(Error::Range {
                index,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Sets bit `index`.
    ///
    /// Marking a view copies the borrowed buffer into owned storage first; the
    /// response buffer it was built over is never written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] when `index >= capacity`, and
    /// [`Error::Corrupted`] when a viewed buffer is too short to hold the bit.
    pub fn mark(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        let byte = self
            .storage
            .to_mut()
            .get_mut(index / 8)
            .ok_or_else(|| short_buffer(index))?;
        *byte |= 1 << (index % 8);
        Ok(())
    }

    /// Reports whether bit `index` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] when `index >= capacity`, and
    /// [`Error::Corrupted`] when a viewed buffer is too short to hold the bit.
    pub fn test(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        let byte = self
            .storage
            .get(index / 8)
            .ok_or_else(|| short_buffer(index))?;
        Ok(byte & (1 << (index % 8)) != 0)
    }

    /// Number of set bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupted`] when a viewed buffer is shorter than its
    /// capacity requires.
    pub fn count_marked(&self) -> Result<usize> {
        let mut marked = 0;
        for index in 0..self.capacity {
            if self.test(index)? {
                marked += 1;
            }
        }
        Ok(marked)
    }

    /// Whether the mask still borrows the buffer it was built over.
    #[must_use]
    pub const fn is_view(&self) -> bool {
        matches!(self.storage, Cow::Borrowed(_))
    }
}

fn short_buffer(index: usize) -> Error {
    Error::Corrupted {
        section: Section::Bitmap,
        details: Cow::Owned(format!("bitmap buffer too short for bit {index}")),
    }
}
