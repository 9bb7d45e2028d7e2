//! Tests for the three puzzle validators.

use protocol_omega::{
    Attempt, AttemptError, Bin, LockData, PuzzleData, PuzzleKind, QuizData, SortAttempt,
    SortItem, Verdict, evaluate, evaluate_lock, evaluate_quiz, evaluate_sort,
};

fn sample_quiz() -> QuizData {
    QuizData::new(
        "Which password is strongest?".to_string(),
        vec![
            "123456".to_string(),
            "Password123".to_string(),
            "JohnSmith".to_string(),
            "K$8m#P9z!L2q".to_string(),
        ],
        3,
        "Correct!".to_string(),
    )
}

/// The six-item hardware set from the reference game.
fn hardware_items() -> Vec<SortItem> {
    vec![
        SortItem::new("keyboard".to_string(), "Keyboard".to_string(), Bin::Input),
        SortItem::new("monitor".to_string(), "Monitor".to_string(), Bin::Output),
        SortItem::new("mouse".to_string(), "Mouse".to_string(), Bin::Input),
        SortItem::new("printer".to_string(), "Printer".to_string(), Bin::Output),
        SortItem::new("microphone".to_string(), "Microphone".to_string(), Bin::Input),
        SortItem::new("speakers".to_string(), "Speakers".to_string(), Bin::Output),
    ]
}

fn correct_hardware_attempt() -> SortAttempt {
    let mut attempt = SortAttempt::new();
    for item in hardware_items() {
        attempt.place(item.id().clone(), *item.correct_bin());
    }
    attempt
}

// ─── Quiz ────────────────────────────────────────────────────

#[test]
fn test_quiz_correct_index_solves() {
    let quiz = sample_quiz();
    let verdict = evaluate_quiz(&quiz, 3).unwrap();
    assert_eq!(
        verdict,
        Verdict::Solved {
            feedback: Some("Correct!".to_string())
        }
    );
}

#[test]
fn test_quiz_every_other_valid_index_is_not_solved() {
    let quiz = sample_quiz();
    for selected in [0, 1, 2] {
        assert_eq!(evaluate_quiz(&quiz, selected).unwrap(), Verdict::NotSolved);
    }
}

#[test]
fn test_quiz_out_of_range_index_is_invalid_attempt() {
    let quiz = sample_quiz();
    let err = evaluate_quiz(&quiz, 4).unwrap_err();
    assert_eq!(
        err,
        AttemptError::InvalidOption {
            selected: 4,
            option_count: 4
        }
    );
}

#[test]
fn test_quiz_is_stateless_across_wrong_answers() {
    let quiz = sample_quiz();
    assert_eq!(evaluate_quiz(&quiz, 0).unwrap(), Verdict::NotSolved);
    assert!(evaluate_quiz(&quiz, 3).unwrap().is_solved());
}

// ─── Lock ────────────────────────────────────────────────────

#[test]
fn test_lock_exact_match_solves() {
    let lock = LockData::new("5".to_string(), "binary 101".to_string());
    assert!(evaluate_lock(&lock, "5").unwrap().is_solved());
}

#[test]
fn test_lock_is_exact_string_equality() {
    let lock = LockData::new("5".to_string(), "binary 101".to_string());
    for entry in ["05", "50", ""] {
        assert_eq!(evaluate_lock(&lock, entry).unwrap(), Verdict::NotSolved);
    }
}

#[test]
fn test_lock_rejects_non_digits() {
    let lock = LockData::new("5".to_string(), "binary 101".to_string());
    let err = evaluate_lock(&lock, "5a").unwrap_err();
    assert_eq!(err, AttemptError::InvalidDigit { ch: 'a' });
}

// ─── Sort ────────────────────────────────────────────────────

#[test]
fn test_sort_unplaced_item_is_incomplete() {
    let items = hardware_items();
    let mut attempt = correct_hardware_attempt();
    attempt.take_back("printer");
    assert_eq!(evaluate_sort(&items, &attempt).unwrap(), Verdict::Incomplete);
}

#[test]
fn test_sort_empty_attempt_is_incomplete() {
    let items = hardware_items();
    assert_eq!(
        evaluate_sort(&items, &SortAttempt::new()).unwrap(),
        Verdict::Incomplete
    );
}

#[test]
fn test_sort_fully_correct_assignment_solves() {
    let items = hardware_items();
    let attempt = correct_hardware_attempt();
    assert!(evaluate_sort(&items, &attempt).unwrap().is_solved());
}

#[test]
fn test_sort_any_single_swap_is_not_solved() {
    let items = hardware_items();
    for item in &items {
        let mut attempt = correct_hardware_attempt();
        let wrong_bin = match item.correct_bin() {
            Bin::Input => Bin::Output,
            Bin::Output => Bin::Input,
        };
        attempt.place(item.id().clone(), wrong_bin);
        assert_eq!(
            evaluate_sort(&items, &attempt).unwrap(),
            Verdict::NotSolved,
            "swapping '{}' must not solve",
            item.id()
        );
    }
}

#[test]
fn test_sort_unknown_item_is_invalid_attempt() {
    let items = hardware_items();
    let mut attempt = correct_hardware_attempt();
    attempt.place("webcam".to_string(), Bin::Input);
    let err = evaluate_sort(&items, &attempt).unwrap_err();
    assert_eq!(
        err,
        AttemptError::UnknownItem {
            id: "webcam".to_string()
        }
    );
}

// ─── Kind dispatch ───────────────────────────────────────────

#[test]
fn test_evaluate_dispatches_by_kind() {
    let puzzle = PuzzleData::Quiz(sample_quiz());
    let verdict = evaluate(&puzzle, &Attempt::Quiz { selected: 3 }).unwrap();
    assert!(verdict.is_solved());
}

#[test]
fn test_evaluate_rejects_mismatched_attempt() {
    let puzzle = PuzzleData::Quiz(sample_quiz());
    let err = evaluate(
        &puzzle,
        &Attempt::Lock {
            entry: "5".to_string(),
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        AttemptError::KindMismatch {
            expected: PuzzleKind::Quiz
        }
    );
}
