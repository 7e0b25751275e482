//! Checked byte-buffer operations.
//!
//! Each operation validates its sizes up front. On failure it returns a
//! [`MemoryError`] and reports a diagnostic naming the operation; nothing is
//! written to the buffers in that case.

pub mod aligned;

pub use aligned::AlignedBuffer;

use std::cmp::Ordering;
use std::fmt::Write as _;

use thiserror::Error;

use crate::diag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("zero size")]
    ZeroSize,
    #[error("{requested} bytes requested but only {available} available")]
    OutOfBounds { requested: usize, available: usize },
    #[error("alignment {alignment} is not a power of two")]
    InvalidAlignment { alignment: usize },
    #[error("allocation of {size} bytes failed")]
    AllocationFailed { size: usize },
}

fn fail<T>(symbol: &'static str, err: MemoryError) -> Result<T, MemoryError> {
    diag::error("memory", symbol, format!("Error: {symbol}() - {err}."));
    Err(err)
}

fn check_size(symbol: &'static str, size: usize, available: usize) -> Result<(), MemoryError> {
    if size == 0 {
        return fail(symbol, MemoryError::ZeroSize);
    }
    if size > available {
        return fail(
            symbol,
            MemoryError::OutOfBounds {
                requested: size,
                available,
            },
        );
    }
    Ok(())
}

fn grow_zeroed(buf: &mut Vec<u8>, size: usize) -> Result<(), MemoryError> {
    if size > buf.len() {
        buf.try_reserve_exact(size - buf.len())
            .map_err(|_| MemoryError::AllocationFailed { size })?;
    }
    buf.resize(size, 0);
    Ok(())
}

/// Zero-filled buffer of `size` bytes. Zero size is an error.
pub fn alloc(size: usize) -> Result<Vec<u8>, MemoryError> {
    const SYMBOL: &str = "fossil_memory_alloc";
    if size == 0 {
        return fail(SYMBOL, MemoryError::ZeroSize);
    }
    let mut buf = Vec::new();
    match grow_zeroed(&mut buf, size) {
        Ok(()) => Ok(buf),
        Err(err) => fail(SYMBOL, err),
    }
}

/// Resize `buf` to `size` bytes, zero-filling any growth.
///
/// Size 0 releases the storage and yields an empty buffer.
pub fn realloc(mut buf: Vec<u8>, size: usize) -> Result<Vec<u8>, MemoryError> {
    if size == 0 {
        return Ok(Vec::new());
    }
    match grow_zeroed(&mut buf, size) {
        Ok(()) => Ok(buf),
        Err(err) => fail("fossil_memory_realloc", err),
    }
}

/// Release a buffer. `None` is accepted.
pub fn free(buf: Option<Vec<u8>>) {
    drop(buf);
}

/// Copy the first `size` bytes of `src` into `dest`.
pub fn copy(dest: &mut [u8], src: &[u8], size: usize) -> Result<(), MemoryError> {
    check_size("fossil_memory_copy", size, dest.len().min(src.len()))?;
    dest[..size].copy_from_slice(&src[..size]);
    Ok(())
}

/// Fill the first `size` bytes of `buf` with `value`.
pub fn set(buf: &mut [u8], value: u8, size: usize) -> Result<(), MemoryError> {
    check_size("fossil_memory_set", size, buf.len())?;
    buf[..size].fill(value);
    Ok(())
}

/// Zero the first `size` bytes of `buf`.
pub fn zero(buf: &mut [u8], size: usize) -> Result<(), MemoryError> {
    check_size("fossil_memory_zero", size, buf.len())?;
    buf[..size].fill(0);
    Ok(())
}

/// New buffer holding the first `size` bytes of `src`.
pub fn dup(src: &[u8], size: usize) -> Result<Vec<u8>, MemoryError> {
    check_size("fossil_memory_dup", size, src.len())?;
    let mut buf = alloc(size)?;
    buf.copy_from_slice(&src[..size]);
    Ok(buf)
}

/// Lexicographic comparison of the first `size` bytes.
pub fn compare(a: &[u8], b: &[u8], size: usize) -> Result<Ordering, MemoryError> {
    check_size("fossil_memory_compare", size, a.len().min(b.len()))?;
    Ok(a[..size].cmp(&b[..size]))
}

/// Copy `size` bytes from offset `src` to offset `dest` inside `buf`.
/// The ranges may overlap.
pub fn move_within(buf: &mut [u8], src: usize, dest: usize, size: usize) -> Result<(), MemoryError> {
    const SYMBOL: &str = "fossil_memory_move";
    if size == 0 {
        return fail(SYMBOL, MemoryError::ZeroSize);
    }
    let end = src.max(dest).checked_add(size);
    match end {
        Some(end) if end <= buf.len() => {
            buf.copy_within(src..src + size, dest);
            Ok(())
        }
        _ => fail(
            SYMBOL,
            MemoryError::OutOfBounds {
                requested: end.unwrap_or(usize::MAX),
                available: buf.len(),
            },
        ),
    }
}

/// Resize in place. New size 0 releases the storage.
///
/// On failure the buffer keeps its previous contents and length.
pub fn resize(buf: &mut Vec<u8>, new_size: usize) -> Result<(), MemoryError> {
    if new_size == 0 {
        *buf = Vec::new();
        return Ok(());
    }
    if let Err(err) = grow_zeroed(buf, new_size) {
        diag::error(
            "memory",
            "fossil_memory_resize",
            "Error: fossil_memory_resize() - Memory resize failed, old memory preserved.",
        );
        return Err(err);
    }
    Ok(())
}

/// Zero-filled buffer of `size` bytes starting on an `alignment` boundary.
/// `alignment` must be a non-zero power of two.
pub fn alloc_aligned(size: usize, alignment: usize) -> Result<AlignedBuffer, MemoryError> {
    AlignedBuffer::new(size, alignment).or_else(|err| fail("fossil_memory_alloc_aligned", err))
}

/// True for any present buffer.
#[must_use]
pub fn is_valid(buf: Option<&[u8]>) -> bool {
    buf.is_some()
}

/// Hex dump of the first `size` bytes: a header line, then 16 uppercase
/// hex bytes per line, each followed by a space.
pub fn hex_dump(buf: &[u8], size: usize) -> Result<String, MemoryError> {
    check_size("fossil_memory_debug", size, buf.len())?;
    let mut out = format!(
        "Memory block at {:p} of size {size} bytes:\n",
        buf.as_ptr()
    );
    for (i, byte) in buf[..size].iter().enumerate() {
        let _ = write!(out, "{byte:02X} ");
        if i % 16 == 15 {
            out.push('\n');
        }
    }
    out.push('\n');
    Ok(out)
}
