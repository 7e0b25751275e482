//! Shared internal utilities for ABI adapters.

use std::ffi::{CStr, c_char};

/// Scan a C string with an optional hard bound.
///
/// Returns `(len, terminated)` where `len` is the byte length before the
/// first NUL or before the bound, and `terminated` tells whether a NUL byte
/// was observed.
///
/// # Safety
///
/// `ptr` must be valid to read up to the discovered length (and bound when given).
pub(crate) unsafe fn scan_c_string(ptr: *const c_char, bound: Option<usize>) -> (usize, bool) {
    match bound {
        Some(limit) => {
            for i in 0..limit {
                if unsafe { *ptr.add(i) } == 0 {
                    return (i, true);
                }
            }
            (limit, false)
        }
        None => {
            let mut i = 0usize;
            while unsafe { *ptr.add(i) } != 0 {
                i += 1;
            }
            (i, true)
        }
    }
}

/// Bytes of a NUL-terminated string, or `None` for a null pointer.
///
/// # Safety
///
/// A non-null `ptr` must point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn c_bytes<'a>(ptr: *const c_char) -> Option<&'a [u8]> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_bytes())
}

/// Like [`c_bytes`], decoded lossily to UTF-8.
///
/// # Safety
///
/// Same contract as [`c_bytes`].
pub(crate) unsafe fn c_string_lossy(ptr: *const c_char) -> Option<String> {
    unsafe { c_bytes(ptr) }.map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

/// Copy `src` into a `cap`-byte C buffer, truncating to `cap - 1` bytes and
/// terminating. Returns the number of bytes copied (excluding the NUL).
///
/// # Safety
///
/// `dest` must be valid for writes of `cap` bytes; `cap` must be at least 1.
pub(crate) unsafe fn write_c_buf(dest: *mut c_char, cap: usize, src: &[u8]) -> usize {
    let n = src.len().min(cap - 1);
    unsafe {
        std::ptr::copy_nonoverlapping(src.as_ptr(), dest.cast::<u8>(), n);
        *dest.add(n) = 0;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_scan_stops_at_limit() {
        let text = c"abcdef";
        assert_eq!(unsafe { scan_c_string(text.as_ptr(), Some(3)) }, (3, false));
        assert_eq!(unsafe { scan_c_string(text.as_ptr(), Some(10)) }, (6, true));
        assert_eq!(unsafe { scan_c_string(text.as_ptr(), None) }, (6, true));
    }

    #[test]
    fn c_bytes_handles_null() {
        assert_eq!(unsafe { c_bytes(std::ptr::null()) }, None);
        assert_eq!(unsafe { c_bytes(c"hi".as_ptr()) }, Some(&b"hi"[..]));
    }

    #[test]
    fn write_truncates_and_terminates() {
        let mut buf = [0x7f as c_char; 4];
        let n = unsafe { write_c_buf(buf.as_mut_ptr(), buf.len(), b"hello") };
        assert_eq!(n, 3);
        assert_eq!(unsafe { CStr::from_ptr(buf.as_ptr()) }.to_bytes(), b"hel");
    }
}
