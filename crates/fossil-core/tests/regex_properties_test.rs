//! Matcher and session properties checked across both evaluators.

use fossil_core::regex::{PATTERN_LIMIT, Program, RegexError, Session, SessionState, is_match};

/// Deterministic xorshift so failures reproduce.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn pick(&mut self, alphabet: &[u8]) -> u8 {
        alphabet[(self.next() % alphabet.len() as u64) as usize]
    }

    fn bytes(&mut self, alphabet: &[u8], max_len: u64) -> Vec<u8> {
        let len = self.next() % (max_len + 1);
        (0..len).map(|_| self.pick(alphabet)).collect()
    }
}

fn both(text: &[u8], pattern: &[u8]) -> bool {
    let recursive = is_match(text, pattern);
    let compiled = Program::compile(pattern).matches(text);
    assert_eq!(
        recursive,
        compiled,
        "evaluators disagree: text={:?} pattern={:?}",
        String::from_utf8_lossy(text),
        String::from_utf8_lossy(pattern)
    );
    recursive
}

#[test]
fn literal_patterns_match_only_themselves() {
    for (text, pattern) in [
        ("abc", "abc"),
        ("abc", "abd"),
        ("ab", "abc"),
        ("abcd", "abc"),
        ("^a$", "^a$"),
        ("a|b", "a|b"),
        ("{x}", "{x}"),
        ("\\d", "\\d"),
    ] {
        assert_eq!(both(text.as_bytes(), pattern.as_bytes()), text == pattern);
    }
}

#[test]
fn empty_pattern_and_empty_text() {
    assert!(both(b"", b""));
    assert!(!both(b"a", b""));
    assert!(both(b"", b"a*"));
    assert!(both(b"", b".*"));
    assert!(both(b"", b"a*b*c*"));
    assert!(!both(b"", b"."));
}

#[test]
fn wildcard_matches_exactly_one_byte() {
    for byte in 0u8..=255 {
        assert!(both(&[byte], b"."));
    }
    assert!(!both(b"ab", b"."));
    assert!(both(b"ab", b".."));
}

#[test]
fn star_repeats_preceding_atom() {
    assert!(both(b"aaa", b"a*"));
    assert!(both(b"aab", b"a*b"));
    assert!(!both(b"aab", b"a*c"));
    assert!(both(b"b", b"a*b"));
    assert!(both(b"xyz", b".*"));
    assert!(both(b"abcabc", b"a.*c"));
    assert!(!both(b"abcabd", b"a.*c"));
}

#[test]
fn leading_star_is_a_literal() {
    assert!(both(b"*", b"*"));
    assert!(!both(b"", b"*"));
    assert!(both(b"***", b"**"));
    assert!(both(b"*", b"**"));
}

#[test]
fn evaluators_agree_on_random_inputs() {
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
    for _ in 0..5_000 {
        let text = rng.bytes(b"ab*.", 8);
        let pattern = rng.bytes(b"ab.*", 6);
        both(&text, &pattern);
    }
}

#[test]
fn session_boundary_and_lifecycle() {
    assert!(Session::create(&"x".repeat(PATTERN_LIMIT - 1)).is_ok());
    assert!(matches!(
        Session::create(&"x".repeat(PATTERN_LIMIT)),
        Err(RegexError::PatternTooLong { .. })
    ));

    let mut session = Session::create("f.o*").unwrap();
    assert_eq!(session.match_and_extract("fxooo"), Ok(Some("fxooo")));
    assert_eq!(session.state(), SessionState::Matched);
    assert_eq!(session.match_and_extract("fxooox"), Ok(None));
    assert_eq!(session.state(), SessionState::Unmatched);

    session.reset();
    session.reset();
    assert_eq!(session.match_text("fx"), Err(RegexError::NoPattern));
}
