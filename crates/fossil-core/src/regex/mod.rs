//! Minimal anchored regular expressions.
//!
//! Literal bytes, `.` and postfix `*`; nothing else is special. A pattern
//! always has to consume the entire text.
//!
//! - [`matcher::is_match`]: the recursive recognizer.
//! - [`program::Program`]: the same language compiled to atoms and evaluated
//!   without native recursion.
//! - [`session::Session`]: create / match / extract / reset lifecycle.
//! - [`shared::SharedSession`]: lock-guarded session for multi-threaded use.

pub mod matcher;
pub mod program;
pub mod session;
pub mod shared;

pub use matcher::{is_match, is_match_str};
pub use program::{Atom, Program};
pub use session::{Session, SessionState};
pub use shared::SharedSession;

use thiserror::Error;

/// Patterns must be strictly shorter than this many bytes.
pub const PATTERN_LIMIT: usize = 255;

/// Invalid-argument conditions of the regex API. A text that does not match
/// is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegexError {
    #[error("pattern is empty")]
    EmptyPattern,
    #[error("pattern is {len} bytes; it must be shorter than {limit}")]
    PatternTooLong { len: usize, limit: usize },
    #[error("session has no pattern")]
    NoPattern,
}

/// Length check applied at session creation. Content is never inspected.
pub fn validate_pattern(pattern: &[u8]) -> Result<(), RegexError> {
    if pattern.is_empty() {
        return Err(RegexError::EmptyPattern);
    }
    if pattern.len() >= PATTERN_LIMIT {
        return Err(RegexError::PatternTooLong {
            len: pattern.len(),
            limit: PATTERN_LIMIT,
        });
    }
    Ok(())
}
