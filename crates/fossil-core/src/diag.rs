//! Diagnostic channel.
//!
//! Every fallible wrapper in this crate returns a typed error to its caller
//! and additionally reports a [`Diagnostic`] here, so that a process using the
//! C ABI (which only sees sentinel return values) still gets a readable
//! explanation. Records are JSONL-serializable.
//!
//! Routing:
//! - [`capture`] collects records emitted on the current thread (tests).
//! - otherwise the process-wide sink receives them ([`StderrSink`] by default,
//!   replaceable with [`set_sink`]).
//!
//! The [`crate::config::diag_level`] gate is applied before routing.

use std::cell::RefCell;
use std::io::Write;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::config::{self, DiagLevel};

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    fn enabled_at(self, level: DiagLevel) -> bool {
        match self {
            Self::Info => level.reports_info(),
            Self::Warn | Self::Error => level.reports_errors(),
        }
    }
}

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Subsystem (`memory`, `command`, `exit`, `args`, `hostsys`, `regex`).
    pub subsystem: &'static str,
    /// Operation that produced the record (`fossil_memory_alloc`, ...).
    pub symbol: &'static str,
    pub message: String,
}

impl Diagnostic {
    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Destination for diagnostic records.
pub trait DiagSink: Send + Sync {
    fn record(&self, diagnostic: &Diagnostic);
}

/// Writes one JSONL line per record to stderr.
#[derive(Debug, Default)]
pub struct StderrSink;

impl DiagSink for StderrSink {
    fn record(&self, diagnostic: &Diagnostic) {
        if let Ok(line) = diagnostic.to_jsonl() {
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the collected records.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl DiagSink for MemorySink {
    fn record(&self, diagnostic: &Diagnostic) {
        self.records.lock().push(diagnostic.clone());
    }
}

static SINK: RwLock<Option<Arc<dyn DiagSink>>> = RwLock::new(None);

thread_local! {
    static CAPTURE: RefCell<Option<Vec<Diagnostic>>> = const { RefCell::new(None) };
}

/// Install a process-wide sink. `None` restores the stderr default.
pub fn set_sink(sink: Option<Arc<dyn DiagSink>>) {
    *SINK.write() = sink;
}

/// Report a record, subject to the configured diagnostic level.
pub fn emit(
    severity: Severity,
    subsystem: &'static str,
    symbol: &'static str,
    message: impl Into<String>,
) {
    if !severity.enabled_at(config::diag_level()) {
        return;
    }
    let diagnostic = Diagnostic {
        severity,
        subsystem,
        symbol,
        message: message.into(),
    };

    let captured = CAPTURE.with(|slot| match slot.borrow_mut().as_mut() {
        Some(buffer) => {
            buffer.push(diagnostic.clone());
            true
        }
        None => false,
    });
    if captured {
        return;
    }

    match SINK.read().as_ref() {
        Some(sink) => sink.record(&diagnostic),
        None => StderrSink.record(&diagnostic),
    }
}

/// Shorthand for an error-severity record.
pub fn error(subsystem: &'static str, symbol: &'static str, message: impl Into<String>) {
    emit(Severity::Error, subsystem, symbol, message);
}

/// Shorthand for an info-severity record.
pub fn info(subsystem: &'static str, symbol: &'static str, message: impl Into<String>) {
    emit(Severity::Info, subsystem, symbol, message);
}

/// Run `f` and return its result together with every record it emitted on
/// this thread. Nested captures are flattened into the outermost one.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<Diagnostic>) {
    let outer = CAPTURE.with(|slot| slot.borrow_mut().replace(Vec::new()));
    let result = f();
    let records = CAPTURE.with(|slot| {
        let mut slot = slot.borrow_mut();
        let mine = slot.take().unwrap_or_default();
        if let Some(mut outer) = outer {
            outer.extend(mine.iter().cloned());
            *slot = Some(outer);
        }
        mine
    });
    (result, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_collects_errors() {
        let ((), records) = capture(|| {
            error("memory", "fossil_memory_alloc", "Cannot allocate zero bytes.");
        });
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Error);
        assert_eq!(records[0].subsystem, "memory");
        assert_eq!(records[0].symbol, "fossil_memory_alloc");
    }

    #[test]
    fn nested_capture_propagates_outward() {
        let (inner, outer) = capture(|| {
            let ((), inner) = capture(|| error("exit", "fossil_handle_atexit", "dup"));
            inner
        });
        assert_eq!(inner.len(), 1);
        assert_eq!(outer.len(), 1);
    }

    #[test]
    fn diagnostic_serializes_as_jsonl() {
        let diagnostic = Diagnostic {
            severity: Severity::Warn,
            subsystem: "command",
            symbol: "fossil_command",
            message: "status 1".to_string(),
        };
        let line = diagnostic.to_jsonl().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["severity"], "warn");
        assert_eq!(parsed["subsystem"], "command");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn memory_sink_drains() {
        let sink = MemorySink::new();
        sink.record(&Diagnostic {
            severity: Severity::Error,
            subsystem: "args",
            symbol: "fossil_arg_parse",
            message: "missing".to_string(),
        });
        assert_eq!(sink.drain().len(), 1);
        assert!(sink.drain().is_empty());
    }
}
