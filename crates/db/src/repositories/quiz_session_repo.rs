//! Repository for the `quiz_sessions` table.

use duet_core::scoring::{Answer, CombinedResult};
use duet_core::store::NewSession;
use duet_core::types::SessionId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::quiz_session::QuizSessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, person_a_name, person_b_name, person_a_answers, person_a_results, \
                       partner_token, person_b_answers, combined_results, paid, \
                       payment_reference, created_at, updated_at";

/// Provides the session operations the state machine needs.
pub struct QuizSessionRepo;

impl QuizSessionRepo {
    /// Insert a new unpaid session, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<QuizSessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO quiz_sessions
                (id, person_a_name, person_b_name, person_a_answers, person_a_results, partner_token)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuizSessionRow>(&query)
            .bind(input.id)
            .bind(&input.first_participant_name)
            .bind(&input.second_participant_name)
            .bind(Json(&input.first_participant_answers))
            .bind(Json(&input.first_participant_result))
            .bind(&input.partner_token)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: SessionId,
    ) -> Result<Option<QuizSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quiz_sessions WHERE id = $1");
        sqlx::query_as::<_, QuizSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_partner_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<QuizSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quiz_sessions WHERE partner_token = $1");
        sqlx::query_as::<_, QuizSessionRow>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Flip an unpaid session to paid. Returns `true` if the row was updated.
    pub async fn mark_paid(
        pool: &PgPool,
        id: SessionId,
        payment_reference: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE quiz_sessions
             SET paid = true, payment_reference = $2, updated_at = NOW()
             WHERE id = $1 AND paid = false",
        )
        .bind(id)
        .bind(payment_reference)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fill the partner slot and the combined result in one statement.
    ///
    /// Only matches a paid session whose partner slot is still empty, so
    /// of several concurrent callers exactly one sees `true`.
    pub async fn complete_partner(
        pool: &PgPool,
        id: SessionId,
        answers: &[Answer],
        combined: &CombinedResult,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE quiz_sessions
             SET person_b_answers = $2, combined_results = $3, updated_at = NOW()
             WHERE id = $1 AND paid = true AND person_b_answers IS NULL",
        )
        .bind(id)
        .bind(Json(answers))
        .bind(Json(combined))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
