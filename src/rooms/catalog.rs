//! Immutable room catalog, the single source of truth for puzzle content.

use super::types::{MAX_CODE_LEN, PuzzleData, Room};
use derive_getters::Getters;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Errors raised by catalog loading or lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Index outside `[0, room_count)`. Programmer error, not player-facing.
    OutOfRange {
        /// The requested index.
        index: usize,
        /// Number of rooms in the catalog.
        room_count: usize,
    },
    /// The catalog file could not be parsed.
    Parse(String),
    /// A room violates a data invariant.
    Invalid(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::OutOfRange { index, room_count } => {
                write!(f, "room index {} out of range (0..{})", index, room_count)
            }
            CatalogError::Parse(msg) => write!(f, "failed to parse catalog: {}", msg),
            CatalogError::Invalid(msg) => write!(f, "invalid catalog: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

/// On-disk shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    game_title: String,
    completion_code: String,
    rooms: Vec<Room>,
}

/// Ordered, immutable list of room definitions.
///
/// Constructed once at process start and never mutated at runtime.
#[derive(Debug, Clone, Getters)]
pub struct Catalog {
    /// Title of the game this catalog describes.
    game_title: String,
    /// Secret code revealed after the last room is cleared.
    completion_code: String,
    #[getter(skip)]
    rooms: Vec<Room>,
}

impl Catalog {
    /// Parses and validates a catalog from TOML.
    #[instrument(skip(input))]
    pub fn from_toml_str(input: &str) -> Result<Self, CatalogError> {
        debug!("Parsing catalog");
        let file: CatalogFile =
            toml::from_str(input).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let catalog = Self {
            game_title: file.game_title,
            completion_code: file.completion_code,
            rooms: file.rooms,
        };
        catalog.validate()?;

        info!(
            game_title = %catalog.game_title,
            room_count = catalog.rooms.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Returns the built-in five-room reference game.
    pub fn builtin() -> Self {
        Self::from_toml_str(include_str!("../../data/rooms.toml"))
            .expect("built-in catalog must be valid")
    }

    /// Number of rooms in the catalog.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Looks up the room at the given index.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::OutOfRange` if `index` is outside
    /// `[0, room_count)`.
    pub fn room_at(&self, index: usize) -> Result<&Room, CatalogError> {
        self.rooms.get(index).ok_or(CatalogError::OutOfRange {
            index,
            room_count: self.rooms.len(),
        })
    }

    /// Checks every data invariant the engine relies on.
    fn validate(&self) -> Result<(), CatalogError> {
        if self.rooms.is_empty() {
            return Err(CatalogError::Invalid("catalog has no rooms".to_string()));
        }

        for (position, room) in self.rooms.iter().enumerate() {
            if *room.id() != position {
                return Err(CatalogError::Invalid(format!(
                    "room at position {} has id {} (ids must be 0-based and contiguous)",
                    position,
                    room.id()
                )));
            }

            match room.puzzle() {
                PuzzleData::Quiz(quiz) => {
                    if quiz.options().len() < 2 {
                        return Err(CatalogError::Invalid(format!(
                            "room {}: quiz needs at least 2 options",
                            position
                        )));
                    }
                    if *quiz.correct_index() >= quiz.options().len() {
                        return Err(CatalogError::Invalid(format!(
                            "room {}: correct_index {} out of bounds for {} options",
                            position,
                            quiz.correct_index(),
                            quiz.options().len()
                        )));
                    }
                }
                PuzzleData::Lock(lock) => {
                    if lock.code().is_empty() || lock.code().len() > MAX_CODE_LEN {
                        return Err(CatalogError::Invalid(format!(
                            "room {}: lock code must be 1..={} characters",
                            position, MAX_CODE_LEN
                        )));
                    }
                    if !lock.code().chars().all(|c| c.is_ascii_digit()) {
                        return Err(CatalogError::Invalid(format!(
                            "room {}: lock code must be decimal digits",
                            position
                        )));
                    }
                }
                PuzzleData::Sort { items } => {
                    if items.is_empty() {
                        return Err(CatalogError::Invalid(format!(
                            "room {}: sorting puzzle has no items",
                            position
                        )));
                    }
                    let mut seen = HashSet::new();
                    for item in items {
                        if !seen.insert(item.id().as_str()) {
                            return Err(CatalogError::Invalid(format!(
                                "room {}: duplicate sort item id '{}'",
                                position,
                                item.id()
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
