//! # fossil-core
//!
//! Safe Rust implementations of the Fossil Logic utility library.
//!
//! The centerpiece is [`regex`], a minimal anchored matcher (`.` and `*`)
//! with a match session. Around it sit small utility modules for option
//! tables ([`args`]), shell commands ([`command`]), host introspection
//! ([`hostsys`]), checked buffers ([`memory`]) and exit handlers
//! ([`stdlib::exit`]). No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod args;
pub mod command;
pub mod config;
pub mod diag;
pub mod hostsys;
pub mod memory;
pub mod regex;
pub mod stdlib;

pub use regex::{RegexError, Session, SharedSession};
