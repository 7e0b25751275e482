//! Runtime diagnostic configuration.
//!
//! The diagnostic level is set via the `FOSSIL_DIAG` environment variable:
//! - `errors` (default): failures of memory, command, exit and argument
//!   operations are reported on the diagnostic channel.
//! - `verbose`: informational messages (successful commands, probe results)
//!   are reported as well.
//! - `quiet`: nothing is reported. Results and errors are still returned to
//!   the caller unchanged.

use std::sync::atomic::{AtomicU8, Ordering};

/// How much the library reports on its diagnostic channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagLevel {
    /// Report nothing.
    Quiet,
    /// Report failures only.
    #[default]
    Errors,
    /// Report failures and informational messages.
    Verbose,
}

impl DiagLevel {
    /// Parse from string (case-insensitive). Unknown values fall back to `Errors`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "off" | "none" | "silent" => Self::Quiet,
            "verbose" | "all" | "debug" | "info" => Self::Verbose,
            _ => Self::Errors,
        }
    }

    /// Returns true if failures are reported.
    #[must_use]
    pub const fn reports_errors(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Returns true if informational messages are reported.
    #[must_use]
    pub const fn reports_info(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

// Atomic cache: 0=unresolved, 1=Quiet, 2=Errors, 3=Verbose, 255=resolving.
// A diagnostic emitted while the env var is being read sees RESOLVING and
// falls back to the default level instead of blocking.
static CACHED_LEVEL: AtomicU8 = AtomicU8::new(0);

const LEVEL_UNRESOLVED: u8 = 0;
const LEVEL_QUIET: u8 = 1;
const LEVEL_ERRORS: u8 = 2;
const LEVEL_VERBOSE: u8 = 3;
const LEVEL_RESOLVING: u8 = 255;

fn level_to_u8(level: DiagLevel) -> u8 {
    match level {
        DiagLevel::Quiet => LEVEL_QUIET,
        DiagLevel::Errors => LEVEL_ERRORS,
        DiagLevel::Verbose => LEVEL_VERBOSE,
    }
}

fn u8_to_level(v: u8) -> DiagLevel {
    match v {
        LEVEL_QUIET => DiagLevel::Quiet,
        LEVEL_VERBOSE => DiagLevel::Verbose,
        _ => DiagLevel::Errors,
    }
}

/// Get the configured diagnostic level (reads `FOSSIL_DIAG` on first call,
/// caches thereafter).
#[must_use]
pub fn diag_level() -> DiagLevel {
    let cached = CACHED_LEVEL.load(Ordering::Relaxed);

    if cached != LEVEL_UNRESOLVED && cached != LEVEL_RESOLVING {
        return u8_to_level(cached);
    }
    if cached == LEVEL_RESOLVING {
        return DiagLevel::default();
    }

    if CACHED_LEVEL
        .compare_exchange(
            LEVEL_UNRESOLVED,
            LEVEL_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        let v = CACHED_LEVEL.load(Ordering::Relaxed);
        return if v != LEVEL_UNRESOLVED && v != LEVEL_RESOLVING {
            u8_to_level(v)
        } else {
            DiagLevel::default()
        };
    }

    let level = std::env::var("FOSSIL_DIAG")
        .map(|v| DiagLevel::from_str_loose(&v))
        .unwrap_or_default();
    CACHED_LEVEL.store(level_to_u8(level), Ordering::Release);
    level
}

/// Override the cached level for the rest of the process.
///
/// Used by the harness CLI (`--diag`) and by tests that need a fixed level.
pub fn set_diag_level(level: DiagLevel) {
    CACHED_LEVEL.store(level_to_u8(level), Ordering::Release);
}
