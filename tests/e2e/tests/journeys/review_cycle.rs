//! Review cycle journey
//!
//! One word followed through weeks of study on a hand-driven clock.

use chrono::Duration;
use lexicon_core::{record_review, Clock, WordInput, WordStatus, WordStore};
use lexicon_e2e_tests::harness::TestDatabaseManager;

fn due_ids(db: &TestDatabaseManager) -> Vec<i64> {
    db.storage
        .select_due_for_review(db.clock.now(), 20)
        .unwrap()
        .into_iter()
        .map(|w| w.id)
        .collect()
}

#[test]
fn test_word_climbs_the_interval_table() {
    let db = TestDatabaseManager::new_temp();
    let start = db.clock.now();
    let word = db
        .storage
        .create_word(WordInput::new("assiduous", "showing great care"), start)
        .unwrap();
    assert_eq!(word.status, WordStatus::New);

    // (days to wait before the review, stage after, status after, next interval)
    let steps = [
        (1, 1, WordStatus::Review, 2),
        (2, 2, WordStatus::Review, 4),
        (4, 3, WordStatus::Mastered, 7),
        (7, 4, WordStatus::Mastered, 15),
        (15, 5, WordStatus::Mastered, 30),
        (30, 5, WordStatus::Mastered, 30),
    ];

    for (review_count, (wait, stage, status, interval)) in (1..).zip(steps) {
        // Due exactly when scheduled, not a minute earlier
        db.clock.advance(Duration::days(wait) - Duration::minutes(1));
        assert!(due_ids(&db).is_empty());
        db.clock.advance(Duration::minutes(1));
        assert_eq!(due_ids(&db), vec![word.id]);

        let outcome = record_review(db.storage.as_ref(), word.id, true, db.clock.as_ref()).unwrap();
        assert_eq!(outcome.memory_stage, stage);
        assert_eq!(outcome.status, status);
        assert_eq!(outcome.review_count, review_count);
        assert_eq!(outcome.last_review, db.clock.now());
        assert_eq!(outcome.next_review_at, db.clock.now() + Duration::days(interval));
    }
}

#[test]
fn test_miss_steps_back_one_stage() {
    let db = TestDatabaseManager::new_temp();
    let word = db.seed_words(1).remove(0);
    db.clock.advance_days(1);

    for _ in 0..3 {
        record_review(db.storage.as_ref(), word.id, true, db.clock.as_ref()).unwrap();
    }
    let mastered = db.storage.get_word(word.id).unwrap().unwrap();
    assert_eq!(mastered.memory_stage, 3);
    assert_eq!(mastered.status, WordStatus::Mastered);

    let outcome = record_review(db.storage.as_ref(), word.id, false, db.clock.as_ref()).unwrap();
    assert_eq!(outcome.memory_stage, 2);
    assert_eq!(outcome.status, WordStatus::Review);
    assert_eq!(outcome.review_count, 3);
    assert_eq!(outcome.next_review_at, db.clock.now() + Duration::days(4));
}

#[test]
fn test_repeated_misses_floor_at_stage_zero() {
    let db = TestDatabaseManager::new_temp();
    let word = db.seed_words(1).remove(0);

    for _ in 0..4 {
        db.clock.advance_days(1);
        let outcome = record_review(db.storage.as_ref(), word.id, false, db.clock.as_ref()).unwrap();
        assert_eq!(outcome.memory_stage, 0);
        assert_eq!(outcome.status, WordStatus::Learning);
        assert_eq!(outcome.review_count, 0);
        assert_eq!(outcome.next_review_at, db.clock.now() + Duration::days(1));
    }
}

#[test]
fn test_long_overdue_word_is_scheduled_from_now() {
    let db = TestDatabaseManager::new_temp();
    let word = db.seed_words(1).remove(0);
    db.clock.advance_days(1);
    for _ in 0..3 {
        record_review(db.storage.as_ref(), word.id, true, db.clock.as_ref()).unwrap();
    }

    // Ignored for a hundred days: the miss still only costs one stage
    db.clock.advance_days(100);
    let outcome = record_review(db.storage.as_ref(), word.id, false, db.clock.as_ref()).unwrap();
    assert_eq!(outcome.memory_stage, 2);
    assert_eq!(outcome.next_review_at, db.clock.now() + Duration::days(4));
}

#[test]
fn test_review_of_deleted_word_is_not_found() {
    let db = TestDatabaseManager::new_temp();
    let word = db.seed_words(1).remove(0);
    db.storage.delete_word(word.id).unwrap();

    let err = record_review(db.storage.as_ref(), word.id, true, db.clock.as_ref()).unwrap_err();
    assert!(matches!(err, lexicon_core::StorageError::NotFound(id) if id == word.id));
}

#[test]
fn test_editing_a_word_keeps_its_schedule() {
    let db = TestDatabaseManager::new_temp();
    let word = db.seed_words(1).remove(0);
    db.clock.advance_days(1);
    let outcome = record_review(db.storage.as_ref(), word.id, true, db.clock.as_ref()).unwrap();

    db.clock.advance(Duration::hours(1));
    let edited = db
        .storage
        .update_word(word.id, WordInput::new(word.word.clone(), "a better definition"), db.clock.now())
        .unwrap();

    assert_eq!(edited.definition, "a better definition");
    assert_eq!(edited.memory_stage, outcome.memory_stage);
    assert_eq!(edited.next_review_at, Some(outcome.next_review_at));
    assert_eq!(edited.review_count, 1);
}
