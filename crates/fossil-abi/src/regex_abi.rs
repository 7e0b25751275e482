//! ABI layer for the regex session (`fossil_regex_*`).
//!
//! The C record borrows both the pattern and the matched text from the
//! caller; nothing is copied. The embedded mutex is the caller's tool for
//! sharing one record between threads: the matcher itself never locks.

use std::ffi::{c_char, c_int};
use std::ptr;

use fossil_core::regex::{self, PATTERN_LIMIT};

use crate::util::scan_c_string;

pub const FOSSIL_REGEX_STATUS_SUCCESS: c_int = 0;
pub const FOSSIL_REGEX_STATUS_FAILURE: c_int = -1;
pub const FOSSIL_REGEX_LIMIT_PATTERN_LENGTH: usize = PATTERN_LIMIT;

/// C-layout regex session.
///
/// [`fossil_regex_create`] initialises every field, the mutex included, so
/// an uninitialised or destroyed record may be passed to it.
#[repr(C)]
#[allow(non_camel_case_types)]
pub struct fossil_regex_t {
    pub pattern: *const c_char,
    pub matched_substring: *const c_char,
    #[cfg(unix)]
    pub mutex: libc::pthread_mutex_t,
    #[cfg(not(unix))]
    pub mutex: *mut std::ffi::c_void,
}

impl fossil_regex_t {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pattern: ptr::null(),
            matched_substring: ptr::null(),
            #[cfg(unix)]
            mutex: libc::PTHREAD_MUTEX_INITIALIZER,
            #[cfg(not(unix))]
            mutex: ptr::null_mut(),
        }
    }
}

impl Default for fossil_regex_t {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates `pattern`, then (re)initialises the record: pattern borrowed,
/// no match recorded, fresh unlocked mutex. A failed call leaves the record
/// untouched. The record must not be locked when this is called.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_regex_create(
    preg: *mut fossil_regex_t,
    pattern: *const c_char,
) -> c_int {
    if preg.is_null() || pattern.is_null() {
        return FOSSIL_REGEX_STATUS_FAILURE;
    }

    // Never read past the limit: an unterminated or overlong pattern is
    // rejected after PATTERN_LIMIT bytes.
    let (len, _) = unsafe { scan_c_string(pattern, Some(PATTERN_LIMIT)) };
    let bytes = unsafe { std::slice::from_raw_parts(pattern.cast::<u8>(), len) };
    if regex::validate_pattern(bytes).is_err() {
        return FOSSIL_REGEX_STATUS_FAILURE;
    }

    #[cfg(unix)]
    {
        // SAFETY: `preg` is non-null and points at a caller-owned record.
        let rc = unsafe { libc::pthread_mutex_init(&raw mut (*preg).mutex, ptr::null()) };
        if rc != 0 {
            return FOSSIL_REGEX_STATUS_FAILURE;
        }
    }

    let preg = unsafe { &mut *preg };
    preg.pattern = pattern;
    preg.matched_substring = ptr::null();
    FOSSIL_REGEX_STATUS_SUCCESS
}

/// Anchored match of `text`. Returns SUCCESS on a match and FAILURE on no
/// match or invalid arguments (including a reset session).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_regex_match(preg: *mut fossil_regex_t, text: *const c_char) -> c_int {
    if preg.is_null() || text.is_null() {
        return FOSSIL_REGEX_STATUS_FAILURE;
    }
    let preg = unsafe { &mut *preg };
    if preg.pattern.is_null() {
        return FOSSIL_REGEX_STATUS_FAILURE;
    }

    let (text_len, _) = unsafe { scan_c_string(text, None) };
    let (pattern_len, _) = unsafe { scan_c_string(preg.pattern, None) };
    let text_bytes = unsafe { std::slice::from_raw_parts(text.cast::<u8>(), text_len) };
    let pattern_bytes = unsafe { std::slice::from_raw_parts(preg.pattern.cast::<u8>(), pattern_len) };

    if regex::is_match(text_bytes, pattern_bytes) {
        preg.matched_substring = text;
        FOSSIL_REGEX_STATUS_SUCCESS
    } else {
        preg.matched_substring = ptr::null();
        FOSSIL_REGEX_STATUS_FAILURE
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_regex_reset(preg: *mut fossil_regex_t) {
    if preg.is_null() {
        return;
    }
    let preg = unsafe { &mut *preg };
    preg.pattern = ptr::null();
    preg.matched_substring = ptr::null();
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_regex_get_matched_substring(
    preg: *mut fossil_regex_t,
) -> *const c_char {
    if preg.is_null() {
        return ptr::null();
    }
    unsafe { (*preg).matched_substring }
}

/// Match, then return the matched text (the whole of `text`) or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_regex_match_and_extract(
    preg: *mut fossil_regex_t,
    text: *const c_char,
) -> *const c_char {
    if preg.is_null() || text.is_null() {
        return ptr::null();
    }
    if unsafe { fossil_regex_match(preg, text) } == FOSSIL_REGEX_STATUS_SUCCESS {
        unsafe { fossil_regex_get_matched_substring(preg) }
    } else {
        ptr::null()
    }
}

#[cfg(unix)]
fn lock_status(rc: c_int) -> c_int {
    if rc == 0 {
        FOSSIL_REGEX_STATUS_SUCCESS
    } else {
        FOSSIL_REGEX_STATUS_FAILURE
    }
}

/// Acquire the record's mutex.
#[cfg(unix)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_regex_lock(preg: *mut fossil_regex_t) -> c_int {
    if preg.is_null() {
        return FOSSIL_REGEX_STATUS_FAILURE;
    }
    lock_status(unsafe { libc::pthread_mutex_lock(&raw mut (*preg).mutex) })
}

/// Try to acquire the record's mutex without blocking.
#[cfg(unix)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_regex_trylock(preg: *mut fossil_regex_t) -> c_int {
    if preg.is_null() {
        return FOSSIL_REGEX_STATUS_FAILURE;
    }
    lock_status(unsafe { libc::pthread_mutex_trylock(&raw mut (*preg).mutex) })
}

#[cfg(unix)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_regex_unlock(preg: *mut fossil_regex_t) -> c_int {
    if preg.is_null() {
        return FOSSIL_REGEX_STATUS_FAILURE;
    }
    lock_status(unsafe { libc::pthread_mutex_unlock(&raw mut (*preg).mutex) })
}

/// Reset the record and destroy its mutex. The record must not be locked.
#[cfg(unix)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_regex_destroy(preg: *mut fossil_regex_t) -> c_int {
    if preg.is_null() {
        return FOSSIL_REGEX_STATUS_FAILURE;
    }
    unsafe { fossil_regex_reset(preg) };
    lock_status(unsafe { libc::pthread_mutex_destroy(&raw mut (*preg).mutex) })
}
