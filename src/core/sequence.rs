/// Sequence builder — walks a tree and derives the per-step button and
/// animation mapping from a fixed 3-symbol lookaside table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::tree::Tree;
use crate::schema::step::{CopyRequest, StepDescriptor};
use crate::schema::symbol::{Side, Symbol, Window};

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("no step matches window {window} at index {index}")]
    UnmatchedWindow { index: usize, window: Window },
}

/// What to do when a window has no row in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnmatchedPolicy {
    /// Abort the build; an unmatched window means the tree is malformed.
    #[default]
    Fail,
    /// Leave the position out of the sequence and copy nothing for it.
    Skip,
}

/// One row of the lookaside table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRule {
    pub window: Window,
    /// The input that survives this animation. Deliberately the opposite of
    /// the animation's own direction.
    pub correct: Side,
    pub success_asset: &'static str,
    pub failure_asset: &'static str,
}

impl WindowRule {
    pub fn wrong(&self) -> Side {
        self.correct.opposite()
    }
}

const fn rule(
    window: (Symbol, Symbol, Symbol),
    correct: Side,
    success_asset: &'static str,
    failure_asset: &'static str,
) -> WindowRule {
    WindowRule {
        window: Window(window.0, window.1, window.2),
        correct,
        success_asset,
        failure_asset,
    }
}

use Symbol::{L, N, R};

pub const WINDOW_TABLE: [WindowRule; 6] = [
    rule((L, N, L), Side::R, "LNL", "LN_DEATH"),
    rule((L, N, R), Side::R, "LNR", "LN_DEATH"),
    rule((R, N, L), Side::L, "RNL", "RN_DEATH"),
    rule((R, N, R), Side::L, "RNR", "RN_DEATH"),
    rule((N, L, N), Side::R, "NLN", "NLN_DEATH"),
    rule((N, R, N), Side::L, "NRN", "NRN_DEATH"),
];

/// Find the table row for a window.
pub fn lookup(window: Window) -> Option<&'static WindowRule> {
    WINDOW_TABLE.iter().find(|r| r.window == window)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceOptions {
    /// Stand-in for the symbol after the last one, used by the final window.
    pub terminal_lookahead: Side,
    pub on_unmatched: UnmatchedPolicy,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            terminal_lookahead: Side::L,
            on_unmatched: UnmatchedPolicy::Fail,
        }
    }
}

/// Ordered steps, one per matched tree position except the victory position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    pub steps: Vec<StepDescriptor>,
    /// Indices left out under [`UnmatchedPolicy::Skip`].
    pub skipped: Vec<usize>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// One numbered copy of the success asset per step, in step order.
    pub fn copy_requests(&self) -> Vec<CopyRequest> {
        self.steps
            .iter()
            .map(|step| CopyRequest {
                source: step.success_asset.to_string(),
                index: step.index,
            })
            .collect()
    }
}

/// Walk `tree` and build its step sequence.
///
/// The last index is the victory position and gets no step. The window at
/// the second-to-last index has no real third symbol, so
/// `options.terminal_lookahead` stands in for it.
pub fn build_sequence(
    tree: &Tree,
    options: &SequenceOptions,
) -> Result<Sequence, SequenceError> {
    let symbols = tree.symbols();
    let last_step = symbols.len().saturating_sub(1);
    let mut sequence = Sequence::default();

    for index in 0..last_step {
        let next_next: Symbol = if index + 2 == symbols.len() {
            options.terminal_lookahead.into()
        } else {
            symbols[index + 2]
        };
        let window = Window(symbols[index], symbols[index + 1], next_next);

        let Some(rule) = lookup(window) else {
            match options.on_unmatched {
                UnmatchedPolicy::Fail => {
                    return Err(SequenceError::UnmatchedWindow { index, window });
                }
                UnmatchedPolicy::Skip => {
                    sequence.skipped.push(index);
                    continue;
                }
            }
        };

        sequence.steps.push(StepDescriptor {
            index,
            correct_choice: rule.correct,
            success_asset: rule.success_asset,
            wrong_choice: rule.wrong(),
            failure_asset: rule.failure_asset,
        });
    }

    Ok(sequence)
}
