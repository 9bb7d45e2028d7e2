//! Protocol: OMEGA - a linear, room-based educational escape-room engine.
//!
//! The player progresses through a fixed sequence of rooms, each binding
//! one puzzle (quiz, code lock or sorting exercise). Solving a puzzle
//! unlocks the next room; clearing the last room reveals a completion
//! code. Room illustrations and free-text hints come from an external
//! generative-content gateway with graceful degradation.
//!
//! # Architecture
//!
//! - **Rooms**: immutable catalog of room and puzzle definitions
//! - **Puzzles**: pure validators, one per puzzle kind
//! - **Progress**: typestate progression state machine
//! - **Gateway**: content enrichment boundary (Gemini-backed)
//! - **Session**: owns all mutable state, serves the presentation layer
//!
//! # Example
//!
//! ```no_run
//! use protocol_omega::{Attempt, Catalog, EscapeSession, GeminiClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), protocol_omega::SessionError> {
//! let session = EscapeSession::new(Catalog::builtin(), Arc::new(GeminiClient::from_env()));
//! session.start()?;
//!
//! let verdict = session.submit_attempt(Attempt::Quiz { selected: 3 })?;
//! if verdict.is_solved() {
//!     session.advance()?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod enrichment;
mod gateway;
mod progress;
mod puzzles;
mod rooms;
mod session;

// Crate-level exports - Rooms and catalog
pub use rooms::{
    Bin, Catalog, CatalogError, LockData, MAX_CODE_LEN, PuzzleData, PuzzleKind, QuizData, Room,
    SortItem,
};

// Crate-level exports - Puzzle validators
pub use puzzles::{
    Attempt, AttemptError, LockEntry, SortAttempt, Verdict, evaluate, evaluate_lock,
    evaluate_quiz, evaluate_sort,
};

// Crate-level exports - Progression state machine
pub use progress::{
    Advance, AdvanceTransition, Finished, GameProgress, InProgress, NotStarted, Progress,
    ProgressError,
};

// Crate-level exports - Content gateway
pub use gateway::{ContentGateway, GatewayError, GeminiClient, GeminiConfig, ImageRef};

// Crate-level exports - Enrichment state
pub use enrichment::{HINT_FAILURE_MESSAGE, HintState, IllustrationCache, PLACEHOLDER_IMAGE};

// Crate-level exports - Session
pub use session::{EscapeSession, SessionError};
