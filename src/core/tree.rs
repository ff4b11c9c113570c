/// Tree generator — constrained random level layouts.
///
/// A tree alternates `N` with a branch (`L` or `R`), starting and ending
/// on `N`. The branch just before the final `N` is the victory branch.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::schema::symbol::{Side, Symbol};

/// Smallest tree that still has a branch before the victory branch.
pub const MIN_LENGTH: i64 = 5;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("invalid tree length {0}: must be an odd number and at least 5")]
    InvalidLength(i64),
    #[error("invalid symbol '{found}' at index {index}: expected N, L or R")]
    InvalidSymbol { index: usize, found: char },
    #[error("tree invariant broken at index {index}: {reason}")]
    Invariant { index: usize, reason: &'static str },
    #[error("victory branch at index {index} is {found}, but only the R victory frame is in use")]
    VictorySide { index: usize, found: Side },
}

/// How the victory branch (second-to-last symbol) is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VictoryRule {
    /// Always `R`, so a single victory animation suffices.
    #[default]
    FixedRight,
    /// A fair coin flip like every other branch; needs both victory assets.
    Random,
}

/// An immutable level layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    symbols: Vec<Symbol>,
}

impl Tree {
    /// Generate a tree of `length` symbols with the reference victory rule.
    pub fn generate(length: i64, rng: &mut StdRng) -> Result<Tree, TreeError> {
        Self::generate_with(length, VictoryRule::FixedRight, rng)
    }

    /// Generate a tree of `length` symbols.
    ///
    /// Starts from `N`, then appends a random branch after every `N` and an
    /// `N` after every branch until `length - 2` symbols exist. The victory
    /// branch and the closing `N` are appended last.
    pub fn generate_with(
        length: i64,
        victory: VictoryRule,
        rng: &mut StdRng,
    ) -> Result<Tree, TreeError> {
        check_length(length)?;
        let length = length as usize;

        let mut symbols = Vec::with_capacity(length);
        symbols.push(Symbol::N);
        while symbols.len() < length - 2 {
            let next: Symbol = match symbols[symbols.len() - 1] {
                Symbol::N => coin_flip(rng).into(),
                Symbol::L | Symbol::R => Symbol::N,
            };
            symbols.push(next);
        }

        let victory_side = match victory {
            VictoryRule::FixedRight => Side::R,
            VictoryRule::Random => coin_flip(rng),
        };
        symbols.push(victory_side.into());
        symbols.push(Symbol::N);

        Ok(Tree { symbols })
    }

    /// Check the looser layout invariants only: odd length of at least
    /// [`MIN_LENGTH`], `N` at both ends, and every branch followed by `N`.
    /// Runs of `N` are allowed; their windows match no step.
    pub fn validate_layout(&self) -> Result<(), TreeError> {
        check_length(self.symbols.len() as i64)?;

        let last = self.symbols.len() - 1;
        if self.symbols[0].is_branch() {
            return Err(TreeError::Invariant {
                index: 0,
                reason: "tree must start and end with N",
            });
        }
        if self.symbols[last].is_branch() {
            return Err(TreeError::Invariant {
                index: last,
                reason: "tree must start and end with N",
            });
        }
        for (index, pair) in self.symbols.windows(2).enumerate() {
            if pair[0].is_branch() && pair[1].is_branch() {
                return Err(TreeError::Invariant {
                    index: index + 1,
                    reason: "branch must be followed by N",
                });
            }
        }
        Ok(())
    }

    /// Check the victory branch against the rule the assets were made for.
    pub fn check_victory(&self, rule: VictoryRule) -> Result<(), TreeError> {
        let index = self.symbols.len().saturating_sub(2);
        match (rule, self.penultimate()) {
            (_, None) => Err(TreeError::Invariant {
                index,
                reason: "second-to-last symbol must be a branch",
            }),
            (VictoryRule::FixedRight, Some(Side::L)) => Err(TreeError::VictorySide {
                index,
                found: Side::L,
            }),
            _ => Ok(()),
        }
    }

    /// Check the layout invariants: odd length of at least [`MIN_LENGTH`],
    /// `N` at both ends, and strict alternation between `N` and branches.
    pub fn validate(&self) -> Result<(), TreeError> {
        check_length(self.symbols.len() as i64)?;

        for (index, symbol) in self.symbols.iter().enumerate() {
            let expect_branch = index % 2 == 1;
            if expect_branch && !symbol.is_branch() {
                return Err(TreeError::Invariant {
                    index,
                    reason: "expected a branch (L or R) after N",
                });
            }
            if !expect_branch && symbol.is_branch() {
                let reason = if index == 0 || index == self.symbols.len() - 1 {
                    "tree must start and end with N"
                } else {
                    "branch must be followed by N"
                };
                return Err(TreeError::Invariant { index, reason });
            }
        }
        Ok(())
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The victory branch direction, if the tree has one.
    pub fn penultimate(&self) -> Option<Side> {
        let idx = self.symbols.len().checked_sub(2)?;
        self.symbols[idx].side()
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.symbols {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

impl FromStr for Tree {
    type Err = TreeError;

    /// Parse the symbol alphabet only; call [`Tree::validate`] for structure.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols = s
            .chars()
            .enumerate()
            .map(|(index, c)| {
                Symbol::from_char(c).ok_or(TreeError::InvalidSymbol { index, found: c })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Tree { symbols })
    }
}

fn check_length(length: i64) -> Result<(), TreeError> {
    if length < MIN_LENGTH || length % 2 == 0 {
        return Err(TreeError::InvalidLength(length));
    }
    Ok(())
}

fn coin_flip(rng: &mut StdRng) -> Side {
    if rng.gen_bool(0.5) {
        Side::R
    } else {
        Side::L
    }
}
