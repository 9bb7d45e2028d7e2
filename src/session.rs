//! Escape-game session: owns progression, enrichment state and the
//! gateway handle, and serves snapshots and operations to the
//! presentation layer.

use crate::enrichment::{HINT_FAILURE_MESSAGE, HintState, IllustrationCache};
use crate::gateway::{ContentGateway, ImageRef};
use crate::progress::{Advance, GameProgress, ProgressError};
use crate::puzzles::{self, Attempt, AttemptError, LockEntry, Verdict};
use crate::rooms::{Catalog, CatalogError, PuzzleData, Room};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Errors surfaced to the presentation layer.
#[derive(Debug)]
pub enum SessionError {
    /// The game has not been started yet.
    NotStarted,
    /// A hint request for this room is already in flight.
    HintPending,
    /// Invalid progression transition.
    Progress(ProgressError),
    /// The attempt referenced data not present in the puzzle.
    Attempt(AttemptError),
    /// Catalog misuse or invalid catalog data.
    Catalog(CatalogError),
    /// Failed to serialize the puzzle into hint context.
    Context(serde_json::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotStarted => write!(f, "the game has not been started"),
            SessionError::HintPending => {
                write!(f, "a hint request is already in flight for this room")
            }
            SessionError::Progress(e) => write!(f, "{}", e),
            SessionError::Attempt(e) => write!(f, "{}", e),
            SessionError::Catalog(e) => write!(f, "{}", e),
            SessionError::Context(e) => write!(f, "failed to build hint context: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Progress(e) => Some(e),
            SessionError::Attempt(e) => Some(e),
            SessionError::Catalog(e) => Some(e),
            SessionError::Context(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProgressError> for SessionError {
    fn from(e: ProgressError) -> Self {
        SessionError::Progress(e)
    }
}

impl From<AttemptError> for SessionError {
    fn from(e: AttemptError) -> Self {
        SessionError::Attempt(e)
    }
}

impl From<CatalogError> for SessionError {
    fn from(e: CatalogError) -> Self {
        SessionError::Catalog(e)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Context(e)
    }
}

/// Mutable session state, guarded by the session mutex.
#[derive(Debug)]
struct SessionState {
    progress: GameProgress,
    illustrations: IllustrationCache,
    hint: HintState,
    /// Room index of the in-flight hint request, if any. Cleared when
    /// the room changes so the stale result is discarded on arrival.
    hint_epoch: Option<usize>,
    lock_entry: LockEntry,
    /// Bumped on restart so in-flight gateway results from the previous
    /// session are discarded instead of repopulating cleared state.
    generation: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            progress: GameProgress::new(),
            illustrations: IllustrationCache::new(),
            hint: HintState::new(),
            hint_epoch: None,
            lock_entry: LockEntry::new(),
            generation: 0,
        }
    }

    /// Index of the current room, failing outside `InProgress`.
    fn active_room(&self) -> Result<usize, SessionError> {
        match &self.progress {
            GameProgress::InProgress { current_room, .. } => Ok(*current_room),
            GameProgress::NotStarted => Err(SessionError::NotStarted),
            GameProgress::Finished { .. } => {
                Err(SessionError::Progress(ProgressError::NotInProgress))
            }
        }
    }
}

/// Clonable handle to one game session.
///
/// All player-triggered transitions are serialized through a single
/// mutex; the two asynchronous gateway calls release it across their
/// suspension points and revalidate state afterwards.
#[derive(Clone)]
pub struct EscapeSession {
    catalog: Arc<Catalog>,
    state: Arc<Mutex<SessionState>>,
    gateway: Arc<dyn ContentGateway>,
}

impl std::fmt::Debug for EscapeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscapeSession")
            .field("game_title", self.catalog.game_title())
            .finish_non_exhaustive()
    }
}

impl EscapeSession {
    /// Creates a new session over a catalog and gateway.
    #[instrument(skip(catalog, gateway), fields(game_title = %catalog.game_title()))]
    pub fn new(catalog: Catalog, gateway: Arc<dyn ContentGateway>) -> Self {
        info!("Creating game session");
        Self {
            catalog: Arc::new(catalog),
            state: Arc::new(Mutex::new(SessionState::new())),
            gateway,
        }
    }

    /// The room catalog backing this session.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Snapshot of the progression state.
    pub fn progress(&self) -> GameProgress {
        self.state.lock().unwrap().progress.clone()
    }

    /// Snapshot of the hint state for the current room.
    pub fn hint(&self) -> HintState {
        self.state.lock().unwrap().hint.clone()
    }

    /// Cached illustration for a room index, if one has arrived.
    pub fn illustration(&self, index: usize) -> Option<ImageRef> {
        self.state.lock().unwrap().illustrations.get(index).cloned()
    }

    /// Returns true while an illustration fetch for the index is in flight.
    pub fn is_illustration_pending(&self, index: usize) -> bool {
        self.state.lock().unwrap().illustrations.is_pending(index)
    }

    /// The accumulated lock entry for the current room.
    pub fn lock_entry(&self) -> String {
        self.state.lock().unwrap().lock_entry.as_str().to_string()
    }

    /// The completion code, revealed only once the game is finished.
    pub fn completion_code(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .progress
            .is_finished()
            .then(|| self.catalog.completion_code().clone())
    }

    /// Snapshot of the current room.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before `start()`.
    pub fn current_room(&self) -> Result<Room, SessionError> {
        let state = self.state.lock().unwrap();
        let index = state
            .progress
            .current_room()
            .ok_or(SessionError::NotStarted)?;
        Ok(self.catalog.room_at(index)?.clone())
    }

    /// Starts the game, making room 0 current.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::AlreadyStarted` if called twice; the
    /// presentation is expected to disable the start control instead.
    #[instrument(skip(self))]
    pub fn start(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.progress.start()?;
        info!(game_title = %self.catalog.game_title(), "Game started");
        Ok(())
    }

    /// Appends one digit to the lock entry of the current room.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::KindMismatch` on non-lock rooms and
    /// `AttemptError::InvalidDigit` for non-digit characters.
    #[instrument(skip(self))]
    pub fn press_digit(&self, ch: char) -> Result<String, SessionError> {
        let mut state = self.state.lock().unwrap();
        let index = state.active_room()?;
        let room = self.catalog.room_at(index)?;
        if !matches!(room.puzzle(), PuzzleData::Lock(_)) {
            return Err(AttemptError::KindMismatch {
                expected: room.puzzle_kind(),
            }
            .into());
        }
        state.lock_entry.press(ch)?;
        Ok(state.lock_entry.as_str().to_string())
    }

    /// Clears the lock entry of the current room.
    #[instrument(skip(self))]
    pub fn clear_code(&self) {
        self.state.lock().unwrap().lock_entry.clear();
    }

    /// Submits the accumulated lock entry against the current room.
    ///
    /// Sugar over [`submit_attempt`](Self::submit_attempt) for keypad
    /// front-ends.
    #[instrument(skip(self))]
    pub fn submit_code(&self) -> Result<Verdict, SessionError> {
        let entry = self.lock_entry();
        self.submit_attempt(Attempt::Lock { entry })
    }

    /// Evaluates an attempt against the current room's puzzle.
    ///
    /// A wrong lock code clears the accumulated entry, forcing full
    /// re-entry. The session never advances by itself: the caller
    /// invokes [`advance`](Self::advance) after a `Solved` verdict.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Attempt` for malformed input (never folded
    /// into a `NotSolved` verdict) and progression errors outside
    /// `InProgress`.
    #[instrument(skip(self, attempt))]
    pub fn submit_attempt(&self, attempt: Attempt) -> Result<Verdict, SessionError> {
        let mut state = self.state.lock().unwrap();
        let index = state.active_room()?;
        let room = self.catalog.room_at(index)?;

        let verdict = puzzles::evaluate(room.puzzle(), &attempt)?;

        if matches!(room.puzzle(), PuzzleData::Lock(_)) && verdict == Verdict::NotSolved {
            debug!(room = index, "Wrong code, clearing entry");
            state.lock_entry.clear();
        }

        info!(room = index, verdict = ?verdict, "Attempt evaluated");
        Ok(verdict)
    }

    /// Advances past the current room after a `Solved` verdict.
    ///
    /// Clears the transient hint state and lock entry for the prior
    /// room; an in-flight hint result for it will be discarded on
    /// arrival.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotInProgress` outside `InProgress`.
    #[instrument(skip(self))]
    pub fn advance(&self) -> Result<Advance, SessionError> {
        let mut state = self.state.lock().unwrap();
        let advance = state.progress.advance(self.catalog.room_count())?;
        state.hint.reset();
        state.hint_epoch = None;
        state.lock_entry.clear();

        match advance {
            Advance::Moved(to) => info!(room = to, "Advanced to next room"),
            Advance::Finished => info!("All rooms cleared, game finished"),
        }
        Ok(advance)
    }

    /// Resets the session to a fresh, unstarted game.
    ///
    /// Clears progression, the illustration cache and the hint state.
    /// In-flight gateway results from before the restart are discarded
    /// when they arrive.
    #[instrument(skip(self))]
    pub fn restart(&self) {
        let mut state = self.state.lock().unwrap();
        state.progress.restart();
        state.illustrations.clear();
        state.hint.reset();
        state.hint_epoch = None;
        state.lock_entry.clear();
        state.generation += 1;
        info!("Session restarted");
    }

    /// Ensures the current room's illustration is fetched, at most once
    /// per room index per session.
    ///
    /// Returns the cached or freshly stored image, or `None` when a
    /// fetch for the index is already in flight. A failed fetch caches
    /// the fixed placeholder; a result arriving after the player moved
    /// on is still stored under the requesting index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before `start()`.
    #[instrument(skip(self))]
    pub async fn ensure_illustration(&self) -> Result<Option<ImageRef>, SessionError> {
        let (index, prompt, generation) = {
            let mut state = self.state.lock().unwrap();
            let index = state
                .progress
                .current_room()
                .ok_or(SessionError::NotStarted)?;
            if let Some(image) = state.illustrations.get(index) {
                return Ok(Some(image.clone()));
            }
            let room = self.catalog.room_at(index)?;
            if !state.illustrations.begin_fetch(index) {
                return Ok(None);
            }
            (index, room.illustration_prompt().clone(), state.generation)
        };

        let fetched = match self.gateway.illustration(&prompt).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(room = index, error = %e, "Illustration fetch failed, substituting placeholder");
                None
            }
        };

        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            debug!(room = index, "Discarding illustration from a restarted session");
            return Ok(None);
        }
        Ok(Some(state.illustrations.complete_fetch(index, fetched).clone()))
    }

    /// Requests a hint for the current room.
    ///
    /// The request is tagged with the room index current at issuance;
    /// if the room changes while the fetch is in flight, the stale
    /// result is discarded (`Ok(None)`) instead of being shown against
    /// the new room. Gateway failures yield the fixed in-universe
    /// failure message, never an error.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::HintPending` while a request is already in
    /// flight, and progression errors outside `InProgress`.
    #[instrument(skip(self))]
    pub async fn request_hint(&self) -> Result<Option<String>, SessionError> {
        let (index, context, generation) = {
            let mut state = self.state.lock().unwrap();
            let index = state.active_room()?;
            if state.hint.is_loading() {
                warn!(room = index, "Rejecting duplicate hint request");
                return Err(SessionError::HintPending);
            }
            let room = self.catalog.room_at(index)?;
            let puzzle_json = serde_json::to_string(room.puzzle())?;
            let context = format!("{} Task: {}", room.description(), puzzle_json);
            state.hint.begin();
            state.hint_epoch = Some(index);
            (index, context, state.generation)
        };

        let text = match self.gateway.hint(&context).await {
            Ok(text) => text,
            Err(e) => {
                warn!(room = index, error = %e, "Hint fetch failed, substituting failure message");
                HINT_FAILURE_MESSAGE.to_string()
            }
        };

        let mut state = self.state.lock().unwrap();
        if state.generation != generation || state.hint_epoch != Some(index) {
            debug!(room = index, "Discarding stale hint result");
            return Ok(None);
        }
        state.hint_epoch = None;
        state.hint.apply(text.clone());
        info!(room = index, "Hint applied");
        Ok(Some(text))
    }
}
