use axum::response::IntoResponse;
use axum::Json;
use duet_core::questions::QUESTION_BANK;

use crate::response::DataResponse;

/// GET /api/v1/questions
///
/// The questionnaire both participants answer, in presentation order.
pub async fn list_questions() -> impl IntoResponse {
    Json(DataResponse {
        data: QUESTION_BANK,
    })
}
