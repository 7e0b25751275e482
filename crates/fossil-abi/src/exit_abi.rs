//! ABI layer for exit handling (`fossil_handle_*`).
//!
//! Handlers live in the core registries. The first successful
//! [`fossil_handle_atexit`] installs one libc `atexit` hook that drains the
//! normal-exit registry, so handlers also run when the host returns from
//! `main` or calls plain `exit`. [`fossil_handle_quick_exit`] and
//! [`fossil_handle__Exit`] end the process with `_exit`, which skips the
//! libc atexit chain.

use std::ffi::c_int;
use std::sync::Once;

use fossil_core::stdlib::exit;

pub const FOSSIL_EXIT_SUCCESS: c_int = 0;
pub const FOSSIL_EXIT_FAILURE: c_int = 1;

fn register(
    func: Option<unsafe extern "C" fn()>,
    symbol: &'static str,
    registry: &'static str,
    add: fn(exit::Handler) -> Result<(), exit::ExitError>,
) -> c_int {
    let Some(func) = func else {
        fossil_core::diag::error(
            "exit",
            symbol,
            format!("Error: NULL function pointer cannot be registered with {registry}."),
        );
        return FOSSIL_EXIT_FAILURE;
    };
    // SAFETY: same signature and calling convention; the handler is only
    // ever invoked with no arguments.
    let handler: exit::Handler = unsafe { std::mem::transmute(func) };
    match add(handler) {
        Ok(()) => FOSSIL_EXIT_SUCCESS,
        Err(_) => FOSSIL_EXIT_FAILURE,
    }
}

static DRAIN_HOOK: Once = Once::new();

extern "C" fn drain_exit_handlers() {
    exit::run_exit_handlers();
}

fn install_drain_hook() {
    DRAIN_HOOK.call_once(|| {
        // SAFETY: the hook takes no arguments and only touches the core
        // registry, which is valid for the whole process lifetime.
        if unsafe { libc::atexit(drain_exit_handlers) } != 0 {
            fossil_core::diag::error(
                "exit",
                "fossil_handle_atexit",
                "Error: could not install the exit handler hook.",
            );
        }
    });
}

/// Register `func` to run on normal termination: [`fossil_handle_exit`],
/// libc `exit` or a return from `main`. Returns `FOSSIL_EXIT_FAILURE` for a
/// null, duplicate or excess handler.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_handle_atexit(func: Option<unsafe extern "C" fn()>) -> c_int {
    let status = register(func, "fossil_handle_atexit", "atexit", exit::atexit);
    if status == FOSSIL_EXIT_SUCCESS {
        install_drain_hook();
    }
    status
}

/// Register `func` to run on [`fossil_handle_quick_exit`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_handle_at_quick_exit(func: Option<unsafe extern "C" fn()>) -> c_int {
    register(
        func,
        "fossil_handle_at_quick_exit",
        "at_quick_exit",
        exit::at_quick_exit,
    )
}

#[unsafe(no_mangle)]
pub extern "C" fn fossil_handle_exit(status: c_int) -> ! {
    exit::exit(status)
}

/// Runs the quick-exit handlers, then `_exit`. Normal-exit handlers and
/// stdio flushing are skipped.
#[unsafe(no_mangle)]
pub extern "C" fn fossil_handle_quick_exit(status: c_int) -> ! {
    exit::begin_quick_exit(status);
    // SAFETY: `_exit` has no preconditions.
    unsafe { libc::_exit(status) }
}

/// Terminates at once: no handler of either kind runs.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "C" fn fossil_handle__Exit(status: c_int) -> ! {
    exit::begin_immediate_exit(status);
    // SAFETY: `_exit` has no preconditions.
    unsafe { libc::_exit(status) }
}

#[unsafe(no_mangle)]
pub extern "C" fn fossil_handle_abort() -> ! {
    exit::abort()
}
