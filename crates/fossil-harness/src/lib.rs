//! Conformance harness for the fossil utility library.
//!
//! This crate provides:
//! - Fixture sets: expected behavior of the library recorded as JSON
//! - Fixture verify: run fixture cases against `fossil-core`
//! - Report generation: human-readable + machine-readable conformance reports
//! - Structured JSONL logging for harness runs

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
