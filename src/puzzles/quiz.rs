//! Multiple-choice quiz validation.

use super::{AttemptError, Verdict};
use crate::rooms::QuizData;
use tracing::{debug, instrument};

/// Evaluates a selected option index against a quiz.
///
/// The validator is stateless: a wrong answer leaves no attempt counter
/// behind, and the same selection re-evaluates fresh on every call.
///
/// # Errors
///
/// Returns `AttemptError::InvalidOption` if `selected` is outside the
/// option list.
#[instrument(skip(quiz))]
pub fn evaluate_quiz(quiz: &QuizData, selected: usize) -> Result<Verdict, AttemptError> {
    if selected >= quiz.options().len() {
        return Err(AttemptError::InvalidOption {
            selected,
            option_count: quiz.options().len(),
        });
    }

    if selected == *quiz.correct_index() {
        debug!("Quiz solved");
        Ok(Verdict::Solved {
            feedback: Some(quiz.feedback().clone()),
        })
    } else {
        debug!(selected, "Wrong quiz option");
        Ok(Verdict::NotSolved)
    }
}
