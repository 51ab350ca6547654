//! Handlers for paired quiz sessions.
//!
//! The first participant creates a session and shares the returned partner
//! token. Both participants then poll `GET /sessions/{id}` (or by token)
//! until the combined report appears.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use duet_core::error::CoreError;
use duet_core::scoring::Answer;
use duet_core::session::SessionLookup;
use duet_core::types::SessionId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Missing fields deserialize as empty so the session service reports them
/// as validation errors.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub person_a_name: String,
    pub person_b_name: String,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub session_id: SessionId,
    pub partner_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitPartnerRequest {
    pub token: String,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedPartner {
    pub session_id: SessionId,
}

/// Query parameters for `GET /sessions/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    /// `id` (default) or `token`.
    pub by: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions
///
/// Create a session from the first participant's answers. Returns the
/// session id and the partner token to share.
pub async fn create_session(
    State(state): State<AppState>,
    Json(input): Json<CreateSessionRequest>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .sessions
        .create(&input.person_a_name, &input.person_b_name, input.answers)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedSession {
                session_id: record.id,
                partner_token: record.partner_token,
            },
        }),
    ))
}

/// POST /api/v1/sessions/partner
///
/// Submit the second participant's answers. Requires a paid session;
/// resubmitting after completion returns the same session id.
pub async fn submit_partner(
    State(state): State<AppState>,
    Json(input): Json<SubmitPartnerRequest>,
) -> AppResult<impl IntoResponse> {
    let session_id = state
        .sessions
        .submit_second(input.token.trim(), input.answers)
        .await?;

    Ok(Json(DataResponse {
        data: SubmittedPartner { session_id },
    }))
}

/// GET /api/v1/sessions/{id}
///
/// Poll a session. With `?by=token` the path segment is the partner token.
pub async fn get_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<LookupParams>,
) -> AppResult<impl IntoResponse> {
    let lookup = match params.by.as_deref() {
        None | Some("id") => SessionLookup::Id(parse_session_id(&key)?),
        Some("token") => SessionLookup::Token(key),
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unknown lookup '{other}', expected 'id' or 'token'"
            )))
        }
    };

    let view = state.sessions.read(&lookup).await?;

    Ok(Json(DataResponse { data: view }))
}

/// A malformed id cannot name an existing session.
fn parse_session_id(raw: &str) -> Result<SessionId, CoreError> {
    raw.parse().map_err(|_| CoreError::NotFound {
        entity: "Session",
        id: raw.to_string(),
    })
}
