//! Route definitions for paired quiz sessions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Session routes mounted at `/sessions`.
///
/// ```text
/// POST   /                  -> create_session
/// POST   /partner           -> submit_partner
/// GET    /{id}              -> get_session (?by=token to look up by partner token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions::create_session))
        .route("/partner", post(sessions::submit_partner))
        .route("/{id}", get(sessions::get_session))
}
