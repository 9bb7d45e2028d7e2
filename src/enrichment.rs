//! Session-local state around the content gateway: the per-room
//! illustration cache and the transient hint state.

use crate::gateway::ImageRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Fixed placeholder substituted when illustration generation fails.
pub const PLACEHOLDER_IMAGE: &str = "https://picsum.photos/1200/600?grayscale&blur=2";

/// In-universe message rendered when hint generation fails.
pub const HINT_FAILURE_MESSAGE: &str = "Connection to the server lost. Try again.";

/// Per-room-index illustration cache with an idempotent fetch guard.
///
/// An index is fetched at most once per session. A failed fetch caches
/// the placeholder at that index, so there is no automatic retry. The
/// cache is keyed by room index rather than by the current room, so a
/// late-arriving result for a room the player has already left is still
/// stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IllustrationCache {
    images: HashMap<usize, ImageRef>,
    pending: HashSet<usize>,
}

impl IllustrationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached image for a room index, if present.
    pub fn get(&self, index: usize) -> Option<&ImageRef> {
        self.images.get(&index)
    }

    /// Returns true while a fetch for this index is in flight.
    pub fn is_pending(&self, index: usize) -> bool {
        self.pending.contains(&index)
    }

    /// Marks an index as being fetched.
    ///
    /// Returns false if the index is already cached or already pending,
    /// in which case the caller must not fetch.
    #[instrument(skip(self))]
    pub fn begin_fetch(&mut self, index: usize) -> bool {
        if self.images.contains_key(&index) || self.pending.contains(&index) {
            debug!(index, "Illustration already cached or pending");
            return false;
        }
        self.pending.insert(index);
        true
    }

    /// Stores the fetch result for an index, substituting the
    /// placeholder on failure, and returns the stored reference.
    #[instrument(skip(self, fetched))]
    pub fn complete_fetch(&mut self, index: usize, fetched: Option<ImageRef>) -> &ImageRef {
        self.pending.remove(&index);
        let image = fetched.unwrap_or_else(|| {
            debug!(index, "Caching placeholder for failed fetch");
            ImageRef::new(PLACEHOLDER_IMAGE)
        });
        self.images.entry(index).or_insert(image)
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Drops all cached images and pending markers.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        debug!(cached = self.images.len(), "Clearing illustration cache");
        self.images.clear();
        self.pending.clear();
    }
}

/// Transient hint state, scoped to the currently displayed room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintState {
    text: Option<String>,
    loading: bool,
}

impl HintState {
    /// Creates empty hint state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The hint text, once one has arrived.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns true while a hint request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Marks a hint request as in flight.
    pub fn begin(&mut self) {
        self.loading = true;
    }

    /// Applies an arrived hint and clears the loading flag.
    pub fn apply(&mut self, text: String) {
        self.text = Some(text);
        self.loading = false;
    }

    /// Resets to empty state (used when the room changes).
    pub fn reset(&mut self) {
        self.text = None;
        self.loading = false;
    }
}
