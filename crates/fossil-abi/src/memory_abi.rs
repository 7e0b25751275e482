//! ABI layer for the memory wrappers (`fossil_memory_*`).
//!
//! Storage comes from the C allocator so that blocks can be handed back and
//! forth with C code. Pointer checks happen here; size checks and byte work
//! are delegated to `fossil_core::memory` over slices built from the raw
//! pointers.

use std::cmp::Ordering;
use std::ffi::{c_int, c_void};
use std::ptr;

use fossil_core::diag;
use fossil_core::memory;

fn reject(symbol: &'static str, message: &str) {
    diag::error("memory", symbol, format!("Error: {symbol}() - {message}"));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_alloc(size: usize) -> *mut c_void {
    if size == 0 {
        reject("fossil_memory_alloc", "Cannot allocate zero bytes.");
        return ptr::null_mut();
    }
    let block = unsafe { libc::malloc(size) };
    if block.is_null() {
        reject("fossil_memory_alloc", "Memory allocation failed.");
    }
    block
}

/// `realloc` semantics: a null `block` allocates, size 0 frees.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_realloc(block: *mut c_void, size: usize) -> *mut c_void {
    let resized = unsafe { libc::realloc(block, size) };
    if resized.is_null() && size > 0 {
        reject("fossil_memory_realloc", "Memory reallocation failed.");
    }
    resized
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_free(block: *mut c_void) {
    unsafe { libc::free(block) };
}

/// Copy `size` bytes between non-overlapping blocks. Returns `dest`, or
/// null on invalid arguments.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_copy(
    dest: *mut c_void,
    src: *const c_void,
    size: usize,
) -> *mut c_void {
    if dest.is_null() || src.is_null() {
        reject("fossil_memory_copy", "Source or destination is NULL.");
        return ptr::null_mut();
    }
    if size == 0 {
        reject("fossil_memory_copy", "Cannot copy zero bytes.");
        return ptr::null_mut();
    }
    unsafe { ptr::copy_nonoverlapping(src.cast::<u8>(), dest.cast::<u8>(), size) };
    dest
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_set(block: *mut c_void, value: c_int, size: usize) -> *mut c_void {
    if block.is_null() {
        reject("fossil_memory_set", "Pointer is NULL.");
        return ptr::null_mut();
    }
    if size == 0 {
        reject("fossil_memory_set", "Cannot set zero bytes.");
        return ptr::null_mut();
    }
    let bytes = unsafe { std::slice::from_raw_parts_mut(block.cast::<u8>(), size) };
    // memset semantics: only the low byte of `value` is used.
    match memory::set(bytes, value as u8, size) {
        Ok(()) => block,
        Err(_) => ptr::null_mut(),
    }
}

/// New block holding a copy of the first `size` bytes of `src`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_dup(src: *const c_void, size: usize) -> *mut c_void {
    if src.is_null() || size == 0 {
        reject("fossil_memory_dup", "Invalid source or zero size.");
        return ptr::null_mut();
    }
    let block = unsafe { fossil_memory_alloc(size) };
    if block.is_null() {
        return block;
    }
    unsafe { ptr::copy_nonoverlapping(src.cast::<u8>(), block.cast::<u8>(), size) };
    block
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_zero(block: *mut c_void, size: usize) {
    if block.is_null() || size == 0 {
        reject("fossil_memory_zero", "Invalid pointer or zero size.");
        return;
    }
    let bytes = unsafe { std::slice::from_raw_parts_mut(block.cast::<u8>(), size) };
    let _ = memory::zero(bytes, size);
}

/// Compare `size` bytes. Returns -1, 0 or 1.
///
/// Invalid arguments also return -1, which is indistinguishable from
/// "less than"; callers that can pass null or zero must check first.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_compare(
    a: *const c_void,
    b: *const c_void,
    size: usize,
) -> c_int {
    if a.is_null() || b.is_null() || size == 0 {
        reject("fossil_memory_compare", "Invalid pointers or zero size.");
        return -1;
    }
    let left = unsafe { std::slice::from_raw_parts(a.cast::<u8>(), size) };
    let right = unsafe { std::slice::from_raw_parts(b.cast::<u8>(), size) };
    match memory::compare(left, right, size) {
        Ok(Ordering::Less) | Err(_) => -1,
        Ok(Ordering::Equal) => 0,
        Ok(Ordering::Greater) => 1,
    }
}

/// Overlap-safe copy. Returns `dest`, or null on invalid arguments.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_move(
    dest: *mut c_void,
    src: *const c_void,
    size: usize,
) -> *mut c_void {
    if dest.is_null() || src.is_null() || size == 0 {
        reject(
            "fossil_memory_move",
            "Invalid source or destination pointers, or zero size.",
        );
        return ptr::null_mut();
    }
    unsafe { ptr::copy(src.cast::<u8>(), dest.cast::<u8>(), size) };
    dest
}

/// Resize a block. New size 0 frees it and returns null; on failure the
/// old block is returned unchanged.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_resize(
    block: *mut c_void,
    _old_size: usize,
    new_size: usize,
) -> *mut c_void {
    if new_size == 0 {
        unsafe { fossil_memory_free(block) };
        return ptr::null_mut();
    }
    let resized = unsafe { fossil_memory_realloc(block, new_size) };
    if resized.is_null() {
        reject(
            "fossil_memory_resize",
            "Memory resize failed, old memory preserved.",
        );
        return block;
    }
    resized
}

/// Block of `size` bytes on an `alignment` boundary; release with
/// [`fossil_memory_free`].
#[cfg(unix)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_alloc_aligned(size: usize, alignment: usize) -> *mut c_void {
    if size == 0 || !alignment.is_power_of_two() {
        reject("fossil_memory_alloc_aligned", "Invalid size or alignment.");
        return ptr::null_mut();
    }
    // posix_memalign also wants a multiple of the pointer size.
    let alignment = alignment.max(std::mem::size_of::<*mut c_void>());
    let mut block: *mut c_void = ptr::null_mut();
    let rc = unsafe { libc::posix_memalign(&mut block, alignment, size) };
    if rc != 0 {
        reject("fossil_memory_alloc_aligned", "Memory alignment failed.");
        return ptr::null_mut();
    }
    block
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_is_valid(block: *const c_void) -> bool {
    !block.is_null()
}

/// Print a hex dump of the first `size` bytes to stdout.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_memory_debug(block: *const c_void, size: usize) {
    if block.is_null() || size == 0 {
        reject("fossil_memory_debug", "Invalid pointer or size.");
        return;
    }
    let bytes = unsafe { std::slice::from_raw_parts(block.cast::<u8>(), size) };
    if let Ok(dump) = memory::hex_dump(bytes, size) {
        print!("{dump}");
    }
}
