//! Match session: a validated pattern plus the outcome of the latest match.
//!
//! State machine:
//!
//! ```text
//!            match ok
//! Unmatched ---------> Matched
//!     ^  <--------------- |  match fails / reset
//!     |___________________|
//!           reset
//! ```
//!
//! The session owns copies of its pattern and of the last matched text, so it
//! never outlives a borrowed buffer. It carries no lock; see
//! [`super::shared::SharedSession`] for cross-thread use.

use super::program::Program;
use super::{RegexError, validate_pattern};

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state, and the state after `reset` or a failed match.
    Unmatched,
    /// The most recent match call succeeded.
    Matched,
}

/// Pattern plus latest match outcome.
///
/// Patterns and texts are byte strings; the `&str` methods are conveniences
/// over the `_bytes` ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pattern: Option<Vec<u8>>,
    program: Option<Program>,
    matched: Option<Vec<u8>>,
}

impl Session {
    /// Create a session for `pattern`.
    ///
    /// Fails if the pattern is empty or at least
    /// [`super::PATTERN_LIMIT`] bytes long. Pattern content is not inspected.
    pub fn create(pattern: &str) -> Result<Self, RegexError> {
        Self::create_bytes(pattern.as_bytes())
    }

    /// [`Session::create`] for a pattern that need not be UTF-8.
    pub fn create_bytes(pattern: &[u8]) -> Result<Self, RegexError> {
        validate_pattern(pattern)?;
        Ok(Self {
            pattern: Some(pattern.to_vec()),
            program: Some(Program::compile(pattern)),
            matched: None,
        })
    }

    /// The session pattern, or `None` after [`Session::reset`] or when the
    /// pattern is not UTF-8.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    #[must_use]
    pub fn pattern_bytes(&self) -> Option<&[u8]> {
        self.pattern.as_deref()
    }

    /// Match `text` as a whole against the pattern.
    ///
    /// Returns `Ok(true)` and records `text` on success, `Ok(false)` and
    /// clears the recorded text on failure. A reset session has no pattern
    /// and yields [`RegexError::NoPattern`].
    pub fn match_text(&mut self, text: &str) -> Result<bool, RegexError> {
        self.match_bytes(text.as_bytes())
    }

    /// [`Session::match_text`] over raw bytes.
    pub fn match_bytes(&mut self, text: &[u8]) -> Result<bool, RegexError> {
        let program = self.program.as_ref().ok_or(RegexError::NoPattern)?;
        let hit = program.matches(text);
        self.matched = hit.then(|| text.to_vec());
        Ok(hit)
    }

    /// [`Session::match_text`] followed by [`Session::matched_substring`].
    ///
    /// Matching is anchored, so on success this is the entire `text`.
    pub fn match_and_extract(&mut self, text: &str) -> Result<Option<&str>, RegexError> {
        if self.match_text(text)? {
            Ok(self.matched_substring())
        } else {
            Ok(None)
        }
    }

    /// [`Session::match_and_extract`] over raw bytes.
    pub fn match_and_extract_bytes(&mut self, text: &[u8]) -> Result<Option<&[u8]>, RegexError> {
        if self.match_bytes(text)? {
            Ok(self.matched_bytes())
        } else {
            Ok(None)
        }
    }

    /// Text of the latest successful match, if it is UTF-8.
    #[must_use]
    pub fn matched_substring(&self) -> Option<&str> {
        self.matched_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    #[must_use]
    pub fn matched_bytes(&self) -> Option<&[u8]> {
        self.matched.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.matched.is_some() {
            SessionState::Matched
        } else {
            SessionState::Unmatched
        }
    }

    /// Clear pattern and matched text. Idempotent.
    pub fn reset(&mut self) {
        self.pattern = None;
        self.program = None;
        self.matched = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::PATTERN_LIMIT;

    #[test]
    fn create_sets_pattern() {
        let session = Session::create("test").unwrap();
        assert_eq!(session.pattern(), Some("test"));
        assert_eq!(session.matched_substring(), None);
        assert_eq!(session.state(), SessionState::Unmatched);
    }

    #[test]
    fn create_rejects_empty() {
        assert_eq!(Session::create(""), Err(RegexError::EmptyPattern));
    }

    #[test]
    fn create_length_boundary() {
        let ok = "a".repeat(PATTERN_LIMIT - 1);
        assert!(Session::create(&ok).is_ok());

        let too_long = "a".repeat(PATTERN_LIMIT);
        assert_eq!(
            Session::create(&too_long),
            Err(RegexError::PatternTooLong {
                len: PATTERN_LIMIT,
                limit: PATTERN_LIMIT
            })
        );
        assert!(Session::create(&"a".repeat(PATTERN_LIMIT + 9)).is_err());
    }

    #[test]
    fn malformed_patterns_are_accepted() {
        let mut session = Session::create("*[(").unwrap();
        assert_eq!(session.match_text("x"), Ok(false));
    }

    #[test]
    fn match_records_and_clears() {
        let mut session = Session::create("pat.ern").unwrap();
        assert_eq!(session.match_text("pattern"), Ok(true));
        assert_eq!(session.matched_substring(), Some("pattern"));
        assert_eq!(session.state(), SessionState::Matched);

        assert_eq!(session.match_text("no match here"), Ok(false));
        assert_eq!(session.matched_substring(), None);
        assert_eq!(session.state(), SessionState::Unmatched);
    }

    #[test]
    fn match_is_anchored() {
        let mut session = Session::create("pattern").unwrap();
        assert_eq!(session.match_text("this is a pattern"), Ok(false));
    }

    #[test]
    fn extract_returns_whole_text() {
        let mut session = Session::create("extract.*").unwrap();
        assert_eq!(
            session.match_and_extract("extract this text"),
            Ok(Some("extract this text"))
        );
        assert_eq!(session.match_and_extract("no match"), Ok(None));
        assert_eq!(session.matched_substring(), None);
    }

    #[test]
    fn extract_does_not_locate_fragments() {
        let mut session = Session::create("extract").unwrap();
        assert_eq!(session.match_and_extract("extract this text"), Ok(None));
        assert_eq!(session.match_and_extract("extract"), Ok(Some("extract")));
    }

    #[test]
    fn reset_clears_and_is_idempotent() {
        let mut session = Session::create("reset").unwrap();
        assert_eq!(session.match_and_extract("reset"), Ok(Some("reset")));

        session.reset();
        assert_eq!(session.matched_substring(), None);
        assert_eq!(session.pattern(), None);
        assert_eq!(session.state(), SessionState::Unmatched);

        session.reset();
        assert_eq!(session.pattern(), None);
    }

    #[test]
    fn reset_session_refuses_to_match() {
        let mut session = Session::create("a*").unwrap();
        session.reset();
        assert_eq!(session.match_text(""), Err(RegexError::NoPattern));
        assert_eq!(session.match_and_extract("aaa"), Err(RegexError::NoPattern));
    }

    #[test]
    fn byte_sessions_match_non_utf8() {
        let mut session = Session::create_bytes(b"\xff.*").unwrap();
        assert_eq!(session.pattern(), None);
        assert_eq!(session.pattern_bytes(), Some(&b"\xff.*"[..]));

        assert_eq!(
            session.match_and_extract_bytes(b"\xff\xfe\x80"),
            Ok(Some(&b"\xff\xfe\x80"[..]))
        );
        assert_eq!(session.state(), SessionState::Matched);
        assert_eq!(session.matched_substring(), None);

        assert_eq!(session.match_bytes(b"\xfe\xff"), Ok(false));
        assert_eq!(session.matched_bytes(), None);

        assert_eq!(
            Session::create_bytes(&[0x80; PATTERN_LIMIT]),
            Err(RegexError::PatternTooLong {
                len: PATTERN_LIMIT,
                limit: PATTERN_LIMIT
            })
        );
    }
}
