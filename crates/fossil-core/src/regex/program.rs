//! Compiled form of a pattern.
//!
//! A pattern is lowered once into a flat list of [`Atom`]s and evaluated with
//! an explicit work stack instead of native recursion. Visited `(text, atom)`
//! positions are remembered, so evaluation is `O(text.len() * atoms.len())`
//! in time and memory and cannot overflow the call stack. Results are
//! identical to [`super::matcher::is_match`] for every input.

use super::matcher::{STAR, WILDCARD};

/// One matchable unit of a compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atom {
    /// Exactly this byte.
    Literal(u8),
    /// Any single byte.
    Wildcard,
    /// Zero or more of this byte.
    StarLiteral(u8),
    /// Zero or more of any byte.
    StarWildcard,
}

impl Atom {
    #[inline]
    const fn accepts(self, c: u8) -> bool {
        match self {
            Self::Literal(b) | Self::StarLiteral(b) => b == c,
            Self::Wildcard | Self::StarWildcard => true,
        }
    }

    #[inline]
    const fn is_star(self) -> bool {
        matches!(self, Self::StarLiteral(_) | Self::StarWildcard)
    }
}

/// A pattern lowered to atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    atoms: Vec<Atom>,
}

impl Program {
    /// Lower `pattern` into atoms. Never fails: every byte sequence has an
    /// interpretation, even if it can never match anything.
    #[must_use]
    pub fn compile(pattern: &[u8]) -> Self {
        let mut atoms = Vec::with_capacity(pattern.len());
        let mut i = 0;
        while i < pattern.len() {
            let b = pattern[i];
            let starred = pattern.get(i + 1) == Some(&STAR);
            let atom = match (b == WILDCARD, starred) {
                (true, true) => Atom::StarWildcard,
                (true, false) => Atom::Wildcard,
                (false, true) => Atom::StarLiteral(b),
                (false, false) => Atom::Literal(b),
            };
            atoms.push(atom);
            i += if starred { 2 } else { 1 };
        }
        Self { atoms }
    }

    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Shortest text length that can possibly match.
    #[must_use]
    pub fn min_len(&self) -> usize {
        self.atoms.iter().filter(|atom| !atom.is_star()).count()
    }

    /// Returns true if the program matches the entire `text`.
    #[must_use]
    pub fn matches(&self, text: &[u8]) -> bool {
        if text.len() < self.min_len() {
            return false;
        }

        let width = self.atoms.len() + 1;
        let mut visited = vec![false; (text.len() + 1) * width];
        let mut stack = vec![(0_usize, 0_usize)];

        while let Some((ti, ai)) = stack.pop() {
            let slot = ti * width + ai;
            if visited[slot] {
                continue;
            }
            visited[slot] = true;

            let Some(&atom) = self.atoms.get(ai) else {
                if ti == text.len() {
                    return true;
                }
                continue;
            };

            let consumes = text.get(ti).is_some_and(|&c| atom.accepts(c));
            if atom.is_star() {
                if consumes {
                    stack.push((ti + 1, ai));
                }
                stack.push((ti, ai + 1));
            } else if consumes {
                stack.push((ti + 1, ai + 1));
            }
        }
        false
    }
}
