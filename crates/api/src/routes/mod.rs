pub mod health;
pub mod payments;
pub mod questions;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /questions                       questionnaire catalog (GET)
///
/// /sessions                        create session (POST)
/// /sessions/partner                submit partner answers (POST)
/// /sessions/{id}                   poll session by id, or by token with ?by=token
///
/// /payments/checkout               open hosted checkout (POST)
/// /payments/verify                 verify-on-read payment check (POST)
/// /payments/webhook                signed provider notification (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/questions", questions::router())
        .nest("/sessions", sessions::router())
        .nest("/payments", payments::router())
}
