use axum::routing::post;
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Payment routes mounted at `/payments`.
///
/// ```text
/// POST   /checkout          -> create_checkout
/// POST   /verify            -> verify_payment
/// POST   /webhook           -> payment_webhook
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(payments::create_checkout))
        .route("/verify", post(payments::verify_payment))
        .route("/webhook", post(payments::payment_webhook))
}
