//! Recursive backtracking recognizer for the two-operator dialect.
//!
//! Dialect: literal bytes, `.` (any single byte) and postfix `*` (zero or more
//! of the preceding atom). Matching is anchored at both ends: the whole text
//! must be consumed by the whole pattern.
//!
//! Worst-case running time is exponential in the number of starred atoms
//! (`a*a*a*a*b` against a long run of `a`). Recursion depth is bounded by
//! `text.len() + pattern.len()`; very long inputs can exhaust the native stack.
//! [`super::program::Program`] evaluates the same language without native
//! recursion.

/// Quantifier byte.
pub const STAR: u8 = b'*';
/// Wildcard byte.
pub const WILDCARD: u8 = b'.';

/// Returns true if the atom `atom` accepts the text byte `c`.
#[inline]
#[must_use]
pub const fn atom_accepts(atom: u8, c: u8) -> bool {
    atom == WILDCARD || atom == c
}

/// Returns true if `pattern` matches the entire `text`.
#[must_use]
pub fn is_match(text: &[u8], pattern: &[u8]) -> bool {
    let Some((&atom, rest)) = pattern.split_first() else {
        return text.is_empty();
    };

    if rest.first() == Some(&STAR) {
        let after_star = &rest[1..];
        is_match(text, after_star)
            || matches!(text.split_first(), Some((&c, tail)) if atom_accepts(atom, c) && is_match(tail, pattern))
    } else {
        matches!(text.split_first(), Some((&c, tail)) if atom_accepts(atom, c) && is_match(tail, rest))
    }
}

/// `&str` convenience over [`is_match`].
#[must_use]
pub fn is_match_str(text: &str, pattern: &str) -> bool {
    is_match(text.as_bytes(), pattern.as_bytes())
}
