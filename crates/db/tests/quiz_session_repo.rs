//! Repository and store tests against a real database.
//!
//! Run with `DATABASE_URL` pointing at a disposable PostgreSQL instance:
//! `cargo test -p duet-db -- --ignored`.

use std::sync::Arc;

use duet_core::partner_token;
use duet_core::questions::QUESTION_BANK;
use duet_core::scoring::{compute_combined, compute_individual, Answer};
use duet_core::session::{SessionLookup, SessionService};
use duet_core::store::{NewSession, SessionStore, StoreError};
use duet_db::repositories::QuizSessionRepo;
use duet_db::PgSessionStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn uniform_answers(value: i32) -> Vec<Answer> {
    QUESTION_BANK
        .iter()
        .map(|q| Answer {
            question_id: q.id,
            value,
        })
        .collect()
}

fn new_session(token: &str) -> NewSession {
    let answers = uniform_answers(3);
    NewSession {
        id: uuid::Uuid::new_v4(),
        first_participant_name: "Ada".into(),
        second_participant_name: "Grace".into(),
        first_participant_result: compute_individual(&answers),
        first_participant_answers: answers,
        partner_token: token.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn insert_and_lookup_round_trip(pool: PgPool) {
    let store = PgSessionStore::new(pool);
    let input = new_session(&partner_token::issue());
    let created = store.insert(input.clone()).await.unwrap();

    assert_eq!(created.id, input.id);
    assert_eq!(created.first_participant_result, input.first_participant_result);
    assert!(!created.paid);

    let by_token = store.find_by_token(&input.partner_token).await.unwrap().unwrap();
    assert_eq!(by_token.id, created.id);
    assert_eq!(by_token.first_participant_answers, input.first_participant_answers);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_token_maps_to_duplicate(pool: PgPool) {
    let store = PgSessionStore::new(pool);
    store.insert(new_session("same-token")).await.unwrap();
    let err = store.insert(new_session("same-token")).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn conditional_updates(pool: PgPool) {
    let created = QuizSessionRepo::create(&pool, &new_session("tok"))
        .await
        .unwrap();
    let answers = uniform_answers(1);
    let combined = compute_combined(&created.person_a_results.0, &answers);

    // Unpaid: the partner slot cannot be filled.
    assert!(!QuizSessionRepo::complete_partner(&pool, created.id, &answers, &combined)
        .await
        .unwrap());

    assert!(QuizSessionRepo::mark_paid(&pool, created.id, "cs_1").await.unwrap());
    assert!(!QuizSessionRepo::mark_paid(&pool, created.id, "cs_2").await.unwrap());

    assert!(QuizSessionRepo::complete_partner(&pool, created.id, &answers, &combined)
        .await
        .unwrap());
    assert!(!QuizSessionRepo::complete_partner(&pool, created.id, &answers, &combined)
        .await
        .unwrap());

    let row = QuizSessionRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.payment_reference.as_deref(), Some("cs_1"));
    assert_eq!(row.combined_results.unwrap().0, combined);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn half_written_partner_slot_is_rejected_by_schema(pool: PgPool) {
    let created = QuizSessionRepo::create(&pool, &new_session("tok"))
        .await
        .unwrap();
    QuizSessionRepo::mark_paid(&pool, created.id, "cs_1").await.unwrap();

    let result = sqlx::query("UPDATE quiz_sessions SET person_b_answers = '[]' WHERE id = $1")
        .bind(created.id)
        .execute(&pool)
        .await;
    assert!(result.is_err(), "answers without a combined result must be rejected");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_partner_submissions_complete_once(pool: PgPool) {
    let service = SessionService::new(Arc::new(PgSessionStore::new(pool.clone())));
    let record = service
        .create("Ada", "Grace", uniform_answers(4))
        .await
        .unwrap();
    service.mark_paid(record.id, "cs_1").await.unwrap();

    let handles: Vec<_> = [1, 2, 3, 4]
        .into_iter()
        .map(|value| {
            let service = service.clone();
            let token = record.partner_token.clone();
            tokio::spawn(async move { service.submit_second(&token, uniform_answers(value)).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), record.id);
    }

    let view = service.read(&SessionLookup::Id(record.id)).await.unwrap();
    assert!(view.partner_completed);
    let stored = QuizSessionRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .unwrap();
    let answers = stored.person_b_answers.unwrap().0;
    assert_eq!(
        view.combined_results.unwrap(),
        compute_combined(&record.first_participant_result, &answers)
    );
}
