//! Tests for the game session: gateway caching, hint epoch discarding,
//! lock entry handling and restart semantics.

use async_trait::async_trait;
use protocol_omega::{
    Advance, Attempt, AttemptError, Bin, Catalog, ContentGateway, EscapeSession, GameProgress,
    GatewayError, ImageRef, PLACEHOLDER_IMAGE, SessionError, SortAttempt, Verdict,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Scripted gateway with call counters and optional gates that hold a
/// fetch in flight until the test releases it.
#[derive(Default)]
struct MockGateway {
    illustration_calls: AtomicUsize,
    hint_calls: AtomicUsize,
    fail_illustrations: bool,
    illustration_gate: Option<Arc<Notify>>,
    hint_gate: Option<Arc<Notify>>,
}

#[async_trait]
impl ContentGateway for MockGateway {
    async fn illustration(&self, prompt: &str) -> Result<ImageRef, GatewayError> {
        self.illustration_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.illustration_gate {
            gate.notified().await;
        }
        if self.fail_illustrations {
            return Err(GatewayError::new("image service down".to_string()));
        }
        Ok(ImageRef::new(format!("mock://{}", prompt.len())))
    }

    async fn hint(&self, context: &str) -> Result<String, GatewayError> {
        self.hint_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.hint_gate {
            gate.notified().await;
        }
        Ok(format!("mock hint ({} chars of context)", context.len()))
    }
}

fn session_with(gateway: MockGateway) -> (EscapeSession, Arc<MockGateway>) {
    let gateway = Arc::new(gateway);
    let session = EscapeSession::new(Catalog::builtin(), gateway.clone());
    (session, gateway)
}

fn correct_sort_attempt(session: &EscapeSession) -> SortAttempt {
    let room = session.current_room().unwrap();
    let protocol_omega::PuzzleData::Sort { items } = room.puzzle() else {
        panic!("current room is not a sorting puzzle");
    };
    let mut attempt = SortAttempt::new();
    for item in items {
        attempt.place(item.id().clone(), *item.correct_bin());
    }
    attempt
}

/// Solves the current builtin room and advances.
fn solve_and_advance(session: &EscapeSession) -> Advance {
    let room = session.current_room().unwrap();
    let attempt = match room.puzzle() {
        protocol_omega::PuzzleData::Quiz(quiz) => Attempt::Quiz {
            selected: *quiz.correct_index(),
        },
        protocol_omega::PuzzleData::Lock(lock) => Attempt::Lock {
            entry: lock.code().clone(),
        },
        protocol_omega::PuzzleData::Sort { .. } => Attempt::Sort(correct_sort_attempt(session)),
    };
    assert!(session.submit_attempt(attempt).unwrap().is_solved());
    session.advance().unwrap()
}

// ─── Lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_full_playthrough_reveals_completion_code() {
    let (session, _) = session_with(MockGateway::default());
    assert!(session.completion_code().is_none());
    session.start().unwrap();

    for _ in 0..4 {
        assert!(matches!(solve_and_advance(&session), Advance::Moved(_)));
        assert!(session.completion_code().is_none());
    }
    assert_eq!(solve_and_advance(&session), Advance::Finished);

    assert!(session.progress().is_finished());
    assert_eq!(session.progress().unlocked(), &[0, 1, 2, 3, 4]);
    assert_eq!(session.completion_code().as_deref(), Some("9erAmE./a*3Q"));
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let (session, _) = session_with(MockGateway::default());
    session.start().unwrap();
    assert!(matches!(
        session.start(),
        Err(SessionError::Progress(_))
    ));
}

#[tokio::test]
async fn test_operations_before_start_are_rejected() {
    let (session, _) = session_with(MockGateway::default());
    assert!(matches!(
        session.current_room(),
        Err(SessionError::NotStarted)
    ));
    assert!(matches!(
        session.submit_attempt(Attempt::Quiz { selected: 0 }),
        Err(SessionError::NotStarted)
    ));
    assert!(matches!(
        session.ensure_illustration().await,
        Err(SessionError::NotStarted)
    ));
    assert!(matches!(session.advance(), Err(SessionError::Progress(_))));
}

#[tokio::test]
async fn test_mismatched_attempt_is_rejected_not_wrong() {
    let (session, _) = session_with(MockGateway::default());
    session.start().unwrap();

    // Room 0 is a quiz; a lock attempt is malformed input, not NotSolved.
    let err = session
        .submit_attempt(Attempt::Lock {
            entry: "5".to_string(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Attempt(AttemptError::KindMismatch { .. })
    ));
}

// ─── Lock entry ──────────────────────────────────────────────

fn session_at_lock_room() -> (EscapeSession, Arc<MockGateway>) {
    let (session, gateway) = session_with(MockGateway::default());
    session.start().unwrap();
    solve_and_advance(&session); // quiz
    solve_and_advance(&session); // sort
    assert!(matches!(
        session.current_room().unwrap().puzzle(),
        protocol_omega::PuzzleData::Lock(_)
    ));
    (session, gateway)
}

#[tokio::test]
async fn test_lock_entry_accumulates_and_is_bounded() {
    let (session, _) = session_at_lock_room();
    for _ in 0..12 {
        session.press_digit('1').unwrap();
    }
    assert_eq!(session.lock_entry(), "11111111", "entry is capped at 8 digits");

    let err = session.press_digit('x').unwrap_err();
    assert!(matches!(
        err,
        SessionError::Attempt(AttemptError::InvalidDigit { ch: 'x' })
    ));
}

#[tokio::test]
async fn test_wrong_code_clears_accumulated_entry() {
    let (session, _) = session_at_lock_room();
    // Room 2's code is "5"; "05" is wrong under exact equality.
    session.press_digit('0').unwrap();
    session.press_digit('5').unwrap();
    assert_eq!(session.submit_code().unwrap(), Verdict::NotSolved);
    assert_eq!(session.lock_entry(), "", "wrong code forces full re-entry");

    session.press_digit('5').unwrap();
    assert!(session.submit_code().unwrap().is_solved());
}

#[tokio::test]
async fn test_press_digit_on_non_lock_room_is_rejected() {
    let (session, _) = session_with(MockGateway::default());
    session.start().unwrap();
    let err = session.press_digit('1').unwrap_err();
    assert!(matches!(
        err,
        SessionError::Attempt(AttemptError::KindMismatch { .. })
    ));
}

// ─── Illustration cache ──────────────────────────────────────

#[tokio::test]
async fn test_illustration_fetched_at_most_once_per_room() {
    let (session, gateway) = session_with(MockGateway::default());
    session.start().unwrap();

    let first = session.ensure_illustration().await.unwrap().unwrap();
    // Re-renders of the same room must hit the cache.
    for _ in 0..5 {
        let again = session.ensure_illustration().await.unwrap().unwrap();
        assert_eq!(again, first);
    }
    assert_eq!(gateway.illustration_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_illustration_caches_placeholder_without_retry() {
    let (session, gateway) = session_with(MockGateway {
        fail_illustrations: true,
        ..MockGateway::default()
    });
    session.start().unwrap();

    let image = session.ensure_illustration().await.unwrap().unwrap();
    assert_eq!(image.as_str(), PLACEHOLDER_IMAGE);

    // The substitution itself is cached: no automatic retry.
    let again = session.ensure_illustration().await.unwrap().unwrap();
    assert_eq!(again.as_str(), PLACEHOLDER_IMAGE);
    assert_eq!(gateway.illustration_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_illustration_request_is_deduplicated() {
    let gate = Arc::new(Notify::new());
    let (session, gateway) = session_with(MockGateway {
        illustration_gate: Some(gate.clone()),
        ..MockGateway::default()
    });
    session.start().unwrap();

    let background = {
        let session = session.clone();
        tokio::spawn(async move { session.ensure_illustration().await })
    };
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert!(session.is_illustration_pending(0));

    // A second request while the first is in flight must not re-fetch.
    assert!(session.ensure_illustration().await.unwrap().is_none());

    gate.notify_one();
    let image = background.await.unwrap().unwrap().unwrap();
    assert_eq!(session.illustration(0), Some(image));
    assert_eq!(gateway.illustration_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_late_illustration_is_still_cached_for_its_room() {
    let gate = Arc::new(Notify::new());
    let (session, _) = session_with(MockGateway {
        illustration_gate: Some(gate.clone()),
        ..MockGateway::default()
    });
    session.start().unwrap();

    let background = {
        let session = session.clone();
        tokio::spawn(async move { session.ensure_illustration().await })
    };
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    // The player solves room 0 while the fetch is still in flight.
    solve_and_advance(&session);

    gate.notify_one();
    let image = background.await.unwrap().unwrap().unwrap();

    // The cache is keyed by room index, so the result lands at index 0.
    assert_eq!(session.illustration(0), Some(image));
}

// ─── Hints ───────────────────────────────────────────────────

#[tokio::test]
async fn test_hint_is_applied_for_current_room() {
    let (session, gateway) = session_with(MockGateway::default());
    session.start().unwrap();

    let text = session.request_hint().await.unwrap().unwrap();
    assert!(text.starts_with("mock hint"));
    assert_eq!(session.hint().text(), Some(text.as_str()));
    assert!(!session.hint().is_loading());
    assert_eq!(gateway.hint_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_duplicate_hint_request_is_rejected_while_loading() {
    let gate = Arc::new(Notify::new());
    let (session, _) = session_with(MockGateway {
        hint_gate: Some(gate.clone()),
        ..MockGateway::default()
    });
    session.start().unwrap();

    let background = {
        let session = session.clone();
        tokio::spawn(async move { session.request_hint().await })
    };
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert!(session.hint().is_loading());

    assert!(matches!(
        session.request_hint().await,
        Err(SessionError::HintPending)
    ));

    gate.notify_one();
    assert!(background.await.unwrap().unwrap().is_some());
}

#[tokio::test]
async fn test_stale_hint_is_discarded_after_advance() {
    let gate = Arc::new(Notify::new());
    let (session, _) = session_with(MockGateway {
        hint_gate: Some(gate.clone()),
        ..MockGateway::default()
    });
    session.start().unwrap();

    let background = {
        let session = session.clone();
        tokio::spawn(async move { session.request_hint().await })
    };
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert!(session.hint().is_loading());

    // The room changes while the hint request is outstanding.
    solve_and_advance(&session);
    assert!(!session.hint().is_loading());

    gate.notify_one();
    let outcome = background.await.unwrap().unwrap();
    assert_eq!(outcome, None, "stale hint must be discarded");
    assert_eq!(
        session.hint().text(),
        None,
        "hint state of the new room must stay empty"
    );
}

#[tokio::test]
async fn test_hint_failure_yields_fixed_message() {
    struct FailingGateway;

    #[async_trait]
    impl ContentGateway for FailingGateway {
        async fn illustration(&self, _prompt: &str) -> Result<ImageRef, GatewayError> {
            Err(GatewayError::new("down".to_string()))
        }

        async fn hint(&self, _context: &str) -> Result<String, GatewayError> {
            Err(GatewayError::new("down".to_string()))
        }
    }

    let session = EscapeSession::new(Catalog::builtin(), Arc::new(FailingGateway));
    session.start().unwrap();

    let text = session.request_hint().await.unwrap().unwrap();
    assert_eq!(text, protocol_omega::HINT_FAILURE_MESSAGE);
    assert_eq!(session.hint().text(), Some(text.as_str()));
}

// ─── Restart ─────────────────────────────────────────────────

#[tokio::test]
async fn test_restart_resets_progress_cache_and_hint() {
    let (session, _) = session_with(MockGateway::default());
    session.start().unwrap();
    session.ensure_illustration().await.unwrap();
    session.request_hint().await.unwrap();
    solve_and_advance(&session);

    session.restart();

    assert_eq!(session.progress(), GameProgress::NotStarted);
    assert!(session.illustration(0).is_none());
    assert_eq!(session.hint().text(), None);
    assert!(!session.hint().is_loading());
    assert!(session.completion_code().is_none());
    assert_eq!(session.lock_entry(), "");

    // The session is playable again from scratch.
    session.start().unwrap();
    assert_eq!(*session.current_room().unwrap().id(), 0);
}

#[tokio::test]
async fn test_in_flight_illustration_from_before_restart_is_discarded() {
    let gate = Arc::new(Notify::new());
    let (session, _) = session_with(MockGateway {
        illustration_gate: Some(gate.clone()),
        ..MockGateway::default()
    });
    session.start().unwrap();

    let background = {
        let session = session.clone();
        tokio::spawn(async move { session.ensure_illustration().await })
    };
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    session.restart();
    gate.notify_one();

    let outcome = background.await.unwrap().unwrap();
    assert_eq!(outcome, None);
    assert!(
        session.illustration(0).is_none(),
        "cleared cache must not be repopulated by a stale result"
    );
}

// ─── Sort via session ────────────────────────────────────────

#[tokio::test]
async fn test_sort_room_incomplete_then_solved() {
    let (session, _) = session_with(MockGateway::default());
    session.start().unwrap();
    solve_and_advance(&session); // quiz, room 1 is the sort

    let mut partial = correct_sort_attempt(&session);
    partial.take_back("speakers");
    assert_eq!(
        session.submit_attempt(Attempt::Sort(partial)).unwrap(),
        Verdict::Incomplete
    );

    let mut wrong = correct_sort_attempt(&session);
    wrong.place("keyboard".to_string(), Bin::Output);
    assert_eq!(
        session.submit_attempt(Attempt::Sort(wrong)).unwrap(),
        Verdict::NotSolved
    );

    let correct = correct_sort_attempt(&session);
    assert!(
        session
            .submit_attempt(Attempt::Sort(correct))
            .unwrap()
            .is_solved()
    );
}
