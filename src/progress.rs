//! Typestate-based progression state machine.
//!
//! The game phase is encoded in a type parameter, so operations that are
//! invalid for a phase simply do not exist on it. A serializable dynamic
//! wrapper ([`GameProgress`]) is provided for session storage, since
//! typestate phases cannot be stored directly.
//!
//! The machine tracks bookkeeping only: it never validates puzzles.
//! Callers invoke [`GameProgress::advance`] after the active room's
//! validator returns `Solved`, keeping puzzle semantics independent from
//! progression.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::{debug, instrument, warn};

/// Phase marker: the game has not been started yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotStarted;

/// Phase marker: the player is inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InProgress;

/// Phase marker: the last room has been cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finished;

/// Progression state with typestate phase encoding.
///
/// - `Progress<NotStarted>` only offers `start()`
/// - `Progress<InProgress>` only offers `advance()`
/// - `Progress<Finished>` is terminal
#[derive(Debug, Clone)]
pub struct Progress<S> {
    current_room: usize,
    unlocked: Vec<usize>,
    _phase: PhantomData<S>,
}

/// Result of advancing - explicit state transition.
#[derive(Debug)]
pub enum AdvanceTransition {
    /// The next room is now current.
    InProgress(Progress<InProgress>),
    /// The cleared room was the last one.
    Finished(Progress<Finished>),
}

// ─────────────────────────────────────────────────────────────
//  NotStarted - entry point
// ─────────────────────────────────────────────────────────────

impl Progress<NotStarted> {
    /// Creates fresh, unstarted progress.
    pub fn new() -> Self {
        Self {
            current_room: 0,
            unlocked: Vec::new(),
            _phase: PhantomData,
        }
    }

    /// Starts the game, unlocking room 0.
    #[instrument(skip(self))]
    pub fn start(self) -> Progress<InProgress> {
        debug!("Game started");
        Progress {
            current_room: 0,
            unlocked: vec![0],
            _phase: PhantomData,
        }
    }
}

impl Default for Progress<NotStarted> {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────
//  InProgress - the only phase that can advance
// ─────────────────────────────────────────────────────────────

impl Progress<InProgress> {
    /// Advances past the current room, consuming the phase.
    ///
    /// If the current room is the last one the game finishes with
    /// `current_room` unchanged and no new unlocked entry; otherwise
    /// the next index becomes current and is appended to the unlocked
    /// prefix.
    #[instrument(skip(self), fields(current_room = self.current_room))]
    pub fn advance(mut self, room_count: usize) -> AdvanceTransition {
        if self.current_room + 1 >= room_count {
            debug!("Last room cleared, finishing");
            return AdvanceTransition::Finished(Progress {
                current_room: self.current_room,
                unlocked: self.unlocked,
                _phase: PhantomData,
            });
        }

        self.current_room += 1;
        self.unlocked.push(self.current_room);
        debug!(current_room = self.current_room, "Advanced to next room");
        AdvanceTransition::InProgress(Progress {
            current_room: self.current_room,
            unlocked: self.unlocked,
            _phase: PhantomData,
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  Common accessors
// ─────────────────────────────────────────────────────────────

impl<S> Progress<S> {
    /// Index of the current room.
    pub fn current_room(&self) -> usize {
        self.current_room
    }

    /// Unlocked room indices - always the prefix `[0..=current_room]`
    /// once started.
    pub fn unlocked(&self) -> &[usize] {
        &self.unlocked
    }
}

/// Errors raised by invalid phase transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressError {
    /// `start()` called outside `NotStarted`.
    AlreadyStarted,
    /// `advance()` called outside `InProgress`.
    NotInProgress,
}

impl std::fmt::Display for ProgressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressError::AlreadyStarted => write!(f, "the game has already been started"),
            ProgressError::NotInProgress => write!(f, "the game is not in progress"),
        }
    }
}

impl std::error::Error for ProgressError {}

/// Outcome of a successful advance, for callers of the dynamic wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the room at this index.
    Moved(usize),
    /// The game is now finished.
    Finished,
}

/// Serializable wrapper for `Progress<S>` in any phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameProgress {
    /// Fresh progress, nothing unlocked.
    NotStarted,
    /// The player is inside a room.
    InProgress {
        /// Index of the current room.
        current_room: usize,
        /// Unlocked room indices (prefix of the catalog order).
        unlocked: Vec<usize>,
    },
    /// All rooms cleared.
    Finished {
        /// Index of the last room.
        current_room: usize,
        /// Unlocked room indices.
        unlocked: Vec<usize>,
    },
}

impl GameProgress {
    /// Creates fresh, unstarted progress.
    pub fn new() -> Self {
        GameProgress::NotStarted
    }

    /// Starts the game.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::AlreadyStarted` outside `NotStarted`.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), ProgressError> {
        match self {
            GameProgress::NotStarted => {
                let started = Progress::new().start();
                *self = GameProgress::InProgress {
                    current_room: started.current_room(),
                    unlocked: started.unlocked().to_vec(),
                };
                Ok(())
            }
            _ => {
                warn!("start() called on a started game");
                Err(ProgressError::AlreadyStarted)
            }
        }
    }

    /// Advances past the current room.
    ///
    /// The wrapper reconstructs the typestate phase, applies the
    /// consuming transition and stores the result back.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotInProgress` outside `InProgress`.
    #[instrument(skip(self))]
    pub fn advance(&mut self, room_count: usize) -> Result<Advance, ProgressError> {
        match self {
            GameProgress::InProgress {
                current_room,
                unlocked,
            } => {
                let phase = Progress::<InProgress> {
                    current_room: *current_room,
                    unlocked: std::mem::take(unlocked),
                    _phase: PhantomData,
                };
                match phase.advance(room_count) {
                    AdvanceTransition::InProgress(next) => {
                        let to = next.current_room();
                        *self = GameProgress::InProgress {
                            current_room: to,
                            unlocked: next.unlocked().to_vec(),
                        };
                        Ok(Advance::Moved(to))
                    }
                    AdvanceTransition::Finished(done) => {
                        *self = GameProgress::Finished {
                            current_room: done.current_room(),
                            unlocked: done.unlocked().to_vec(),
                        };
                        Ok(Advance::Finished)
                    }
                }
            }
            _ => {
                warn!("advance() called outside InProgress");
                Err(ProgressError::NotInProgress)
            }
        }
    }

    /// Returns to fresh, unstarted progress. Valid from any phase.
    #[instrument(skip(self))]
    pub fn restart(&mut self) {
        debug!("Progress reset");
        *self = GameProgress::NotStarted;
    }

    /// Index of the current room, if the game has started.
    pub fn current_room(&self) -> Option<usize> {
        match self {
            GameProgress::NotStarted => None,
            GameProgress::InProgress { current_room, .. }
            | GameProgress::Finished { current_room, .. } => Some(*current_room),
        }
    }

    /// Unlocked room indices for any phase.
    pub fn unlocked(&self) -> &[usize] {
        match self {
            GameProgress::NotStarted => &[],
            GameProgress::InProgress { unlocked, .. }
            | GameProgress::Finished { unlocked, .. } => unlocked,
        }
    }

    /// Returns true once `start()` has been called.
    pub fn has_started(&self) -> bool {
        !matches!(self, GameProgress::NotStarted)
    }

    /// Returns true once the last room has been cleared.
    pub fn is_finished(&self) -> bool {
        matches!(self, GameProgress::Finished { .. })
    }
}

impl Default for GameProgress {
    fn default() -> Self {
        Self::new()
    }
}
