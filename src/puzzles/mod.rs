//! Puzzle validators.
//!
//! Validators are pure functions over puzzle data and an attempted answer.
//! They carry no attempt counters or timing state, so re-evaluating the
//! same attempt always yields the same verdict. Retry pacing is a
//! presentation concern.

mod lock;
mod quiz;
mod sort;

pub use lock::{LockEntry, evaluate_lock};
pub use quiz::evaluate_quiz;
pub use sort::{SortAttempt, evaluate_sort};

use crate::rooms::{PuzzleData, PuzzleKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Verdict of a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The attempt solves the puzzle.
    Solved {
        /// Success feedback, where the puzzle defines one.
        feedback: Option<String>,
    },
    /// The attempt is complete but wrong.
    NotSolved,
    /// The attempt does not yet cover the whole puzzle
    /// (only produced by partition-style puzzles).
    Incomplete,
}

impl Verdict {
    /// Returns true for `Solved`.
    pub fn is_solved(&self) -> bool {
        matches!(self, Verdict::Solved { .. })
    }
}

/// A player's attempted answer, one variant per puzzle kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Selected option index for a quiz.
    Quiz {
        /// Index into the quiz options.
        selected: usize,
    },
    /// Accumulated digit string for a lock.
    Lock {
        /// The entered code.
        entry: String,
    },
    /// Bin assignment for a sorting puzzle.
    Sort(SortAttempt),
}

/// An attempt referencing data not present in the puzzle.
///
/// Malformed input is never folded into a wrong-answer verdict; the
/// presentation layer treats it as a rejected input instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Quiz option index outside the option list.
    InvalidOption {
        /// The selected index.
        selected: usize,
        /// Number of options in the quiz.
        option_count: usize,
    },
    /// Lock entry contains a non-digit character.
    InvalidDigit {
        /// The offending character.
        ch: char,
    },
    /// Sort attempt references an item id not in the puzzle.
    UnknownItem {
        /// The offending id.
        id: String,
    },
    /// The attempt variant does not match the puzzle kind.
    KindMismatch {
        /// The kind the active puzzle expects.
        expected: PuzzleKind,
    },
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::InvalidOption {
                selected,
                option_count,
            } => write!(
                f,
                "option index {} out of range (quiz has {} options)",
                selected, option_count
            ),
            AttemptError::InvalidDigit { ch } => {
                write!(f, "'{}' is not a decimal digit", ch)
            }
            AttemptError::UnknownItem { id } => {
                write!(f, "item '{}' is not part of this puzzle", id)
            }
            AttemptError::KindMismatch { expected } => {
                write!(f, "attempt does not match puzzle kind '{}'", expected)
            }
        }
    }
}

impl std::error::Error for AttemptError {}

/// Evaluates an attempt against puzzle data, dispatching on the kind tag.
///
/// # Errors
///
/// Returns `AttemptError` when the attempt references data the puzzle
/// does not contain, or when the attempt variant does not match the
/// puzzle kind.
#[instrument(skip(puzzle, attempt), fields(kind = %puzzle.kind()))]
pub fn evaluate(puzzle: &PuzzleData, attempt: &Attempt) -> Result<Verdict, AttemptError> {
    debug!("Evaluating attempt");
    match (puzzle, attempt) {
        (PuzzleData::Quiz(quiz), Attempt::Quiz { selected }) => evaluate_quiz(quiz, *selected),
        (PuzzleData::Lock(lock), Attempt::Lock { entry }) => evaluate_lock(lock, entry),
        (PuzzleData::Sort { items }, Attempt::Sort(placement)) => {
            evaluate_sort(items, placement)
        }
        (puzzle, _) => Err(AttemptError::KindMismatch {
            expected: puzzle.kind(),
        }),
    }
}
