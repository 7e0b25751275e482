//! ABI layer for command execution (`fossil_command*`).

use std::ffi::c_char;

use fossil_core::command;
use fossil_core::diag;

use crate::util::{c_bytes, c_string_lossy, scan_c_string, write_c_buf};

/// Run `process` through the shell. Returns its exit status, or -1 when
/// it could not be run.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_command(process: *const c_char) -> i32 {
    let Some(process) = (unsafe { c_string_lossy(process) }) else {
        diag::error("command", "fossil_command", "Error: Null command provided.");
        return -1;
    };
    command::run(&process).unwrap_or(-1)
}

/// [`fossil_command`], additionally reporting success or failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_command_success(process: *const c_char) -> i32 {
    let Some(process) = (unsafe { c_string_lossy(process) }) else {
        diag::error("command", "fossil_command_success", "Error: Null command provided.");
        return -1;
    };
    command::run_checked(&process).unwrap_or(-1)
}

/// Capture stdout of `process` into `output` (at most `output_size - 1`
/// bytes plus a terminator). Returns 0 on success, -1 on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_command_output(
    process: *const c_char,
    output: *mut c_char,
    output_size: usize,
) -> i32 {
    if output.is_null() || output_size == 0 {
        diag::error(
            "command",
            "fossil_command_output",
            "Error: Invalid output buffer.",
        );
        return -1;
    }
    let Some(process) = (unsafe { c_string_lossy(process) }) else {
        diag::error("command", "fossil_command_output", "Error: Null command provided.");
        return -1;
    };
    match command::output(&process, output_size) {
        Ok(text) => {
            unsafe { write_c_buf(output, output_size, text.as_bytes()) };
            0
        }
        Err(_) => -1,
    }
}

/// 1 if `process` names an executable file, else 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_command_exists(process: *const c_char) -> i32 {
    match unsafe { c_string_lossy(process) } {
        Some(path) => i32::from(command::exists(path)),
        None => 0,
    }
}

/// 1 if `path` names a directory, else 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_command_erase_exists(path: *const c_char) -> i32 {
    match unsafe { c_string_lossy(path) } {
        Some(path) => i32::from(command::dir_exists(path)),
        None => {
            diag::error(
                "command",
                "fossil_command_erase_exists",
                "Error: Null path provided.",
            );
            0
        }
    }
}

/// Append `src` to the C string in `dest`, a buffer of `dest_size` bytes,
/// never writing past it and always leaving it terminated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_command_strcat_safe(
    dest: *mut c_char,
    src: *const c_char,
    dest_size: usize,
) {
    if dest.is_null() || dest_size == 0 {
        return;
    }
    let Some(src) = (unsafe { c_bytes(src) }) else {
        return;
    };
    let (dest_len, _) = unsafe { scan_c_string(dest, Some(dest_size)) };
    let copy_len = command::append_len(dest_len, src.len(), dest_size);
    unsafe {
        std::ptr::copy_nonoverlapping(src.as_ptr(), dest.add(dest_len).cast::<u8>(), copy_len);
        if dest_len + copy_len < dest_size {
            *dest.add(dest_len + copy_len) = 0;
        }
        *dest.add(dest_size - 1) = 0;
    }
}
