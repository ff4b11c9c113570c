use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two player inputs, and the direction of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    L,
    R,
}

impl Side {
    /// The other button.
    pub fn opposite(self) -> Side {
        match self {
            Self::L => Self::R,
            Self::R => Self::L,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::R => "R",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Side> for Symbol {
    fn from(side: Side) -> Self {
        match side {
            Side::L => Symbol::L,
            Side::R => Symbol::R,
        }
    }
}

/// A single position in a level layout: no branch (`N`) or a branch
/// to the left or right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    N,
    L,
    R,
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Self::N => 'N',
            Self::L => 'L',
            Self::R => 'R',
        }
    }

    /// Branch direction, if this is a branch.
    pub fn side(self) -> Option<Side> {
        match self {
            Self::N => None,
            Self::L => Some(Side::L),
            Self::R => Some(Side::R),
        }
    }

    pub fn is_branch(self) -> bool {
        self.side().is_some()
    }

    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            'N' => Some(Self::N),
            'L' => Some(Self::L),
            'R' => Some(Self::R),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The 3-symbol lookahead `(current, next, next_next)` that selects a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window(pub Symbol, pub Symbol, pub Symbol);

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.0, self.1, self.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite() {
        assert_eq!(Side::L.opposite(), Side::R);
        assert_eq!(Side::R.opposite(), Side::L);
    }

    #[test]
    fn symbol_char_round_trip() {
        for s in [Symbol::N, Symbol::L, Symbol::R] {
            assert_eq!(Symbol::from_char(s.as_char()), Some(s));
        }
        assert_eq!(Symbol::from_char('x'), None);
    }

    #[test]
    fn only_l_and_r_are_branches() {
        assert!(!Symbol::N.is_branch());
        assert_eq!(Symbol::L.side(), Some(Side::L));
        assert_eq!(Symbol::R.side(), Some(Side::R));
    }

    #[test]
    fn window_display() {
        let w = Window(Symbol::R, Symbol::N, Symbol::L);
        assert_eq!(w.to_string(), "(R,N,L)");
    }
}
