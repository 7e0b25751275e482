//! Process termination and cleanup-handler registration.
//!
//! Two independent registries: handlers for normal exit ([`atexit`]) and for
//! quick exit ([`at_quick_exit`]). Each holds at most [`HANDLER_LIMIT`]
//! distinct functions and rejects duplicates. Handlers run in reverse
//! registration order.

use parking_lot::Mutex;
use thiserror::Error;

use crate::diag;

/// Maximum number of handlers per registry.
pub const HANDLER_LIMIT: usize = 100;

/// A no-argument cleanup callback.
pub type Handler = extern "C" fn();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExitError {
    #[error("function already registered")]
    Duplicate,
    #[error("maximum number of handlers ({limit}) reached")]
    LimitReached { limit: usize },
}

/// Bounded, duplicate-free list of cleanup handlers.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: Vec<Handler>,
}

impl HandlerRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register(&mut self, handler: Handler) -> Result<(), ExitError> {
        if self.contains(handler) {
            return Err(ExitError::Duplicate);
        }
        if self.handlers.len() >= HANDLER_LIMIT {
            return Err(ExitError::LimitReached {
                limit: HANDLER_LIMIT,
            });
        }
        self.handlers.push(handler);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, handler: Handler) -> bool {
        self.handlers
            .iter()
            .any(|&known| std::ptr::fn_addr_eq(known, handler))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Empties the registry and returns its handlers in run order
    /// (most recently registered first).
    pub fn take_in_run_order(&mut self) -> Vec<Handler> {
        let mut handlers = std::mem::take(&mut self.handlers);
        handlers.reverse();
        handlers
    }
}

static ATEXIT_HANDLERS: Mutex<HandlerRegistry> = Mutex::new(HandlerRegistry::new());
static QUICK_EXIT_HANDLERS: Mutex<HandlerRegistry> = Mutex::new(HandlerRegistry::new());

fn register_into(
    registry: &Mutex<HandlerRegistry>,
    handler: Handler,
    symbol: &'static str,
) -> Result<(), ExitError> {
    let result = registry.lock().register(handler);
    if let Err(err) = result {
        diag::error("exit", symbol, format!("Error: {err}."));
    }
    result
}

/// Register a handler to run on [`exit`].
pub fn atexit(handler: Handler) -> Result<(), ExitError> {
    register_into(&ATEXIT_HANDLERS, handler, "fossil_handle_atexit")
}

/// Register a handler to run on [`quick_exit`].
pub fn at_quick_exit(handler: Handler) -> Result<(), ExitError> {
    register_into(&QUICK_EXIT_HANDLERS, handler, "fossil_handle_at_quick_exit")
}

/// Runs and removes every registered exit handler. Returns how many ran.
///
/// The registry lock is released before any handler runs, so handlers may
/// register further handlers or query the registry.
pub fn run_exit_handlers() -> usize {
    run_all(&ATEXIT_HANDLERS)
}

/// Runs and removes every registered quick-exit handler.
pub fn run_quick_exit_handlers() -> usize {
    run_all(&QUICK_EXIT_HANDLERS)
}

fn run_all(registry: &Mutex<HandlerRegistry>) -> usize {
    let handlers = registry.lock().take_in_run_order();
    for handler in &handlers {
        handler();
    }
    handlers.len()
}

/// Normal termination: report, run exit handlers, exit with `status`.
///
/// The handlers are drained before libc `exit` runs, so a drain hook
/// installed with libc `atexit` finds the registry empty.
pub fn exit(status: i32) -> ! {
    diag::info(
        "exit",
        "fossil_handle_exit",
        format!("Program exiting with status: {status}"),
    );
    run_exit_handlers();
    std::process::exit(status)
}

/// Reports a quick exit and runs the quick-exit handlers. Returns how many
/// ran.
///
/// Process termination is left to the caller: `std` can only exit through
/// libc `exit`, which would also run the normal atexit chain. The ABI layer
/// follows this with `_exit`.
pub fn begin_quick_exit(status: i32) -> usize {
    diag::info(
        "exit",
        "fossil_handle_quick_exit",
        format!("Program quickly exiting with status: {status}"),
    );
    run_quick_exit_handlers()
}

/// Reports an `_Exit`. No handler of either registry runs; the caller ends
/// the process with `_exit`.
pub fn begin_immediate_exit(status: i32) {
    diag::info(
        "exit",
        "fossil_handle__Exit",
        format!("Program exiting without cleanup, status: {status}"),
    );
}

/// Abnormal termination.
pub fn abort() -> ! {
    diag::error("exit", "fossil_handle_abort", "Program aborted unexpectedly.");
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Distinct bodies keep the linker from folding them to one address.
    extern "C" fn first() {
        std::hint::black_box("first");
    }
    extern "C" fn second() {
        std::hint::black_box("second");
    }
    extern "C" fn third() {
        std::hint::black_box("third");
    }

    static ORDER: Mutex<Vec<u8>> = Mutex::new(Vec::new());
    static QUICK_RUNS: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn record_a() {
        ORDER.lock().push(b'a');
    }
    extern "C" fn record_b() {
        ORDER.lock().push(b'b');
    }
    extern "C" fn count_quick() {
        QUICK_RUNS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn registry_rejects_duplicates() {
        let mut registry = HandlerRegistry::new();
        assert_eq!(registry.register(first), Ok(()));
        assert_eq!(registry.register(second), Ok(()));
        assert_eq!(registry.register(first), Err(ExitError::Duplicate));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(second));
        assert!(!registry.contains(third));
    }

    #[test]
    fn registry_runs_in_reverse_order() {
        let mut registry = HandlerRegistry::new();
        registry.register(first).unwrap();
        registry.register(second).unwrap();
        registry.register(third).unwrap();
        let order = registry.take_in_run_order();
        assert!(std::ptr::fn_addr_eq(order[0], third as Handler));
        assert!(std::ptr::fn_addr_eq(order[2], first as Handler));
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_limit() {
        macro_rules! handlers {
            ($($name:ident),*) => {{
                $(extern "C" fn $name() {
                    std::hint::black_box(stringify!($name));
                })*
                vec![$($name as Handler),*]
            }};
        }
        let mut many = handlers!(
            h0, h1, h2, h3, h4, h5, h6, h7, h8, h9, h10, h11, h12, h13, h14, h15, h16, h17, h18,
            h19, h20, h21, h22, h23, h24, h25, h26, h27, h28, h29, h30, h31, h32, h33, h34, h35,
            h36, h37, h38, h39, h40, h41, h42, h43, h44, h45, h46, h47, h48, h49, h50, h51, h52,
            h53, h54, h55, h56, h57, h58, h59, h60, h61, h62, h63, h64, h65, h66, h67, h68, h69,
            h70, h71, h72, h73, h74, h75, h76, h77, h78, h79, h80, h81, h82, h83, h84, h85, h86,
            h87, h88, h89, h90, h91, h92, h93, h94, h95, h96, h97, h98, h99
        );
        assert_eq!(many.len(), HANDLER_LIMIT);

        let mut registry = HandlerRegistry::new();
        for handler in many.drain(..) {
            registry.register(handler).unwrap();
        }
        assert_eq!(
            registry.register(first),
            Err(ExitError::LimitReached { limit: 100 })
        );
    }

    #[test]
    fn global_exit_registry_runs_and_drains() {
        ORDER.lock().clear();
        atexit(record_a).unwrap();
        atexit(record_b).unwrap();
        let ((), records) = diag::capture(|| {
            assert_eq!(atexit(record_a), Err(ExitError::Duplicate));
        });
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "fossil_handle_atexit");

        assert_eq!(run_exit_handlers(), 2);
        assert_eq!(*ORDER.lock(), vec![b'b', b'a']);
        assert_eq!(run_exit_handlers(), 0);
    }

    #[test]
    fn quick_exit_registry_is_independent() {
        at_quick_exit(count_quick).unwrap();
        let (ran, records) = diag::capture(|| begin_quick_exit(3));
        assert_eq!(ran, 1);
        assert_eq!(QUICK_RUNS.load(Ordering::SeqCst), 1);
        assert_eq!(run_quick_exit_handlers(), 0);
        assert!(
            records
                .iter()
                .all(|record| record.symbol == "fossil_handle_quick_exit")
        );
    }
}
