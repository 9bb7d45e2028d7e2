//! Numeric code lock validation and digit entry accumulation.

use super::{AttemptError, Verdict};
use crate::rooms::{LockData, MAX_CODE_LEN};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Accumulated digit entry for a lock keypad.
///
/// Digits are appended one at a time; the entry never grows past
/// [`MAX_CODE_LEN`], and extra presses on a full entry are ignored the
/// way a physical keypad would ignore them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    digits: String,
}

impl LockEntry {
    /// Creates an empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one digit to the entry.
    ///
    /// A press on a full entry is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidDigit` if `ch` is not a decimal digit.
    pub fn press(&mut self, ch: char) -> Result<(), AttemptError> {
        if !ch.is_ascii_digit() {
            return Err(AttemptError::InvalidDigit { ch });
        }
        if self.digits.len() < MAX_CODE_LEN {
            self.digits.push(ch);
        }
        Ok(())
    }

    /// Clears the entry for full re-entry.
    pub fn clear(&mut self) {
        self.digits.clear();
    }

    /// Returns the accumulated digit string.
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Returns true if nothing has been entered.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

/// Compares an entered digit string against the lock code.
///
/// Comparison is exact string equality: `"05"` does not open a lock
/// whose code is `"5"`. The caller clears the accumulated entry on
/// `NotSolved` so there is no partial-credit memory.
///
/// # Errors
///
/// Returns `AttemptError::InvalidDigit` if the entry contains a
/// character that is not a decimal digit.
#[instrument(skip(lock, entry))]
pub fn evaluate_lock(lock: &LockData, entry: &str) -> Result<Verdict, AttemptError> {
    if let Some(ch) = entry.chars().find(|c| !c.is_ascii_digit()) {
        return Err(AttemptError::InvalidDigit { ch });
    }

    if entry == lock.code() {
        debug!("Lock opened");
        Ok(Verdict::Solved { feedback: None })
    } else {
        debug!(entry_len = entry.len(), "Wrong code");
        Ok(Verdict::NotSolved)
    }
}
