// All extern "C" exports accept raw pointers from C callers and check them
// for null before use, so per-function safety docs would only repeat that.
#![allow(clippy::missing_safety_doc)]
//! # fossil-abi
//!
//! C ABI for the Fossil Logic utility library.
//!
//! This crate produces a `cdylib` exposing the `fossil_*` symbols. Every entry
//! point checks its pointers, then delegates to the safe implementations in
//! `fossil-core`.
//!
//! ```text
//! C caller -> ABI entry (this crate) -> pointer checks -> core impl -> status code
//! ```
//!
//! Failures are reported twice: through the C return convention of each
//! function, and as a record on the `fossil_core::diag` channel.

mod util;

pub mod command_abi;
pub mod exit_abi;
pub mod hostsys_abi;
pub mod memory_abi;
pub mod regex_abi;
