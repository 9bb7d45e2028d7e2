//! Core domain types for rooms and puzzles.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Maximum length of a lock code (and of the accumulated entry).
pub const MAX_CODE_LEN: usize = 8;

/// The two bins of a sorting puzzle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Bin {
    /// Bin A (displayed as "INPUT" in the reference game).
    Input,
    /// Bin B (displayed as "OUTPUT" in the reference game).
    Output,
}

/// The closed set of puzzle variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PuzzleKind {
    /// Multiple-choice quiz.
    Quiz,
    /// Numeric code lock.
    Lock,
    /// Two-bin sorting exercise.
    Sort,
}

/// Data for a multiple-choice quiz puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct QuizData {
    /// The question shown to the player.
    question: String,
    /// Answer options in display order (at least two).
    options: Vec<String>,
    /// Index of the correct option.
    correct_index: usize,
    /// Feedback shown on a correct answer.
    feedback: String,
}

/// Data for a numeric code lock puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct LockData {
    /// The digit string that opens the lock.
    code: String,
    /// Static hint displayed next to the lock.
    hint_text: String,
}

/// One item of a sorting puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct SortItem {
    /// Unique id within the puzzle.
    id: String,
    /// Label shown on the item card.
    label: String,
    /// The bin this item belongs in.
    correct_bin: Bin,
}

/// Puzzle payload, tagged by kind.
///
/// The set of kinds is fixed at build time, so puzzles are a closed
/// discriminated union rather than an open plugin interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PuzzleData {
    /// Multiple-choice quiz.
    Quiz(QuizData),
    /// Numeric code lock.
    Lock(LockData),
    /// Two-bin sorting exercise.
    Sort {
        /// Items to be sorted; ids are unique within the set.
        items: Vec<SortItem>,
    },
}

impl PuzzleData {
    /// Returns the kind tag of this payload.
    pub fn kind(&self) -> PuzzleKind {
        match self {
            PuzzleData::Quiz(_) => PuzzleKind::Quiz,
            PuzzleData::Lock(_) => PuzzleKind::Lock,
            PuzzleData::Sort { .. } => PuzzleKind::Sort,
        }
    }
}

/// One stage of the linear game sequence.
///
/// Rooms are immutable once loaded; the catalog is their only owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
pub struct Room {
    /// Ordinal position, 0-based and contiguous across the catalog.
    id: usize,
    /// Room title.
    title: String,
    /// In-universe description shown to the player.
    description: String,
    /// Prompt handed to the content gateway for the room illustration.
    illustration_prompt: String,
    /// The puzzle bound to this room.
    puzzle: PuzzleData,
}

impl Room {
    /// Returns the kind of this room's puzzle.
    pub fn puzzle_kind(&self) -> PuzzleKind {
        self.puzzle.kind()
    }
}
