//! Quiz session row model.

use duet_core::scoring::{Answer, CombinedResult, IndividualResult};
use duet_core::store::SessionRecord;
use duet_core::types::{SessionId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `quiz_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct QuizSessionRow {
    pub id: SessionId,
    pub person_a_name: String,
    pub person_b_name: String,
    pub person_a_answers: Json<Vec<Answer>>,
    pub person_a_results: Json<IndividualResult>,
    pub partner_token: String,
    pub person_b_answers: Option<Json<Vec<Answer>>>,
    pub combined_results: Option<Json<CombinedResult>>,
    pub paid: bool,
    pub payment_reference: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<QuizSessionRow> for SessionRecord {
    fn from(row: QuizSessionRow) -> Self {
        Self {
            id: row.id,
            first_participant_name: row.person_a_name,
            second_participant_name: row.person_b_name,
            first_participant_answers: row.person_a_answers.0,
            first_participant_result: row.person_a_results.0,
            partner_token: row.partner_token,
            second_participant_answers: row.person_b_answers.map(|j| j.0),
            combined_result: row.combined_results.map(|j| j.0),
            paid: row.paid,
            payment_reference: row.payment_reference,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
