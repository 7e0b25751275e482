//! Aligned byte buffers built by over-allocating a plain `Vec<u8>`.

use std::fmt;

use super::MemoryError;

/// `len` bytes whose first byte sits on an `alignment` boundary.
///
/// The backing vector holds `len + alignment - 1` bytes and is never grown,
/// so the aligned window stays put for the buffer's lifetime.
pub struct AlignedBuffer {
    storage: Vec<u8>,
    offset: usize,
    len: usize,
    alignment: usize,
}

impl AlignedBuffer {
    pub(super) fn new(len: usize, alignment: usize) -> Result<Self, MemoryError> {
        if len == 0 {
            return Err(MemoryError::ZeroSize);
        }
        if !alignment.is_power_of_two() {
            return Err(MemoryError::InvalidAlignment { alignment });
        }
        let total = len
            .checked_add(alignment - 1)
            .ok_or(MemoryError::AllocationFailed { size: len })?;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(total)
            .map_err(|_| MemoryError::AllocationFailed { size: total })?;
        storage.resize(total, 0);

        let offset = storage.as_ptr().align_offset(alignment);
        if offset >= alignment {
            return Err(MemoryError::InvalidAlignment { alignment });
        }
        Ok(Self {
            storage,
            offset,
            len,
            alignment,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.offset..self.offset + self.len]
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("ptr", &self.as_ptr())
            .field("len", &self.len)
            .field("alignment", &self.alignment)
            .finish()
    }
}
