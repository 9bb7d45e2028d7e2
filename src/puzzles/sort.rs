//! Two-bin sorting puzzle validation.

use super::{AttemptError, Verdict};
use crate::rooms::{Bin, SortItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// A partition of item ids into observed bins.
///
/// Placing an item that is already placed moves it; taking an item back
/// removes it from the partition entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortAttempt {
    placements: HashMap<String, Bin>,
}

impl SortAttempt {
    /// Creates an empty partition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places (or moves) an item into a bin.
    pub fn place(&mut self, id: impl Into<String>, bin: Bin) {
        self.placements.insert(id.into(), bin);
    }

    /// Takes an item back out of its bin.
    pub fn take_back(&mut self, id: &str) {
        self.placements.remove(id);
    }

    /// Returns the observed bin for an item, if it has been placed.
    pub fn bin_of(&self, id: &str) -> Option<Bin> {
        self.placements.get(id).copied()
    }

    /// Number of placed items.
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }
}

/// Evaluates a partition against the item set.
///
/// Returns `Incomplete` while any item is still unplaced, `Solved` only
/// when every observed bin matches the item's correct bin, and a bare
/// `NotSolved` otherwise. Which specific items are wrong is deliberately
/// not reported, to preserve puzzle difficulty.
///
/// # Errors
///
/// Returns `AttemptError::UnknownItem` if the partition references an id
/// that is not part of the item set.
#[instrument(skip(items, attempt), fields(item_count = items.len()))]
pub fn evaluate_sort(items: &[SortItem], attempt: &SortAttempt) -> Result<Verdict, AttemptError> {
    for id in attempt.placements.keys() {
        if !items.iter().any(|item| item.id() == id) {
            return Err(AttemptError::UnknownItem { id: id.clone() });
        }
    }

    if items.iter().any(|item| attempt.bin_of(item.id()).is_none()) {
        debug!(
            placed = attempt.placed_count(),
            total = items.len(),
            "Sort attempt incomplete"
        );
        return Ok(Verdict::Incomplete);
    }

    let all_correct = items
        .iter()
        .all(|item| attempt.bin_of(item.id()) == Some(*item.correct_bin()));

    if all_correct {
        debug!("Sort solved");
        Ok(Verdict::Solved { feedback: None })
    } else {
        debug!("Sort attempt wrong");
        Ok(Verdict::NotSolved)
    }
}
