//! Standard-library style helpers: numeric conversion and process exit.

pub mod conversion;
pub mod exit;

pub use conversion::{ConversionStatus, atoi, parse_decimal_prefix};
pub use exit::{
    ExitError, HANDLER_LIMIT, Handler, HandlerRegistry, abort, at_quick_exit, atexit,
    begin_immediate_exit, begin_quick_exit, exit,
};
