//! Payment confirmation endpoints.
//!
//! Both paths end in `SessionService::mark_paid`, which is idempotent, so
//! a webhook and a verify-on-read poll racing for the same session is
//! harmless.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use duet_core::error::CoreError;
use duet_core::payment::{parse_notification, verify_signature, SIGNATURE_HEADER};
use duet_core::types::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionPaymentRequest {
    pub session_id: Option<SessionId>,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatus {
    pub paid: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckoutLink {
    pub url: String,
}

fn require_session_id(input: SessionPaymentRequest) -> Result<SessionId, CoreError> {
    input
        .session_id
        .ok_or_else(|| CoreError::Validation("sessionId is required".into()))
}

/// POST /api/v1/payments/checkout
///
/// Open a hosted checkout for an unpaid session and return the URL to
/// redirect the first participant to.
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(input): Json<SessionPaymentRequest>,
) -> AppResult<impl IntoResponse> {
    let session_id = require_session_id(input)?;

    let url = state
        .sessions
        .begin_checkout(session_id, state.payments.as_ref())
        .await?;

    Ok(Json(DataResponse {
        data: CheckoutLink { url },
    }))
}

/// POST /api/v1/payments/verify
///
/// Report whether a session is paid, asking the payment provider when the
/// stored flag is still unset.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(input): Json<SessionPaymentRequest>,
) -> AppResult<impl IntoResponse> {
    let session_id = require_session_id(input)?;

    let paid = state
        .sessions
        .verify_payment(session_id, state.payments.as_ref())
        .await?;

    Ok(Json(DataResponse {
        data: PaymentStatus { paid },
    }))
}

/// POST /api/v1/payments/webhook
///
/// Signed notification from the checkout provider. The raw body is needed
/// for signature verification, so it is taken as bytes.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let payment = &state.config.payment;

    let Some(secret) = payment.webhook_secret.as_deref() else {
        tracing::warn!("Payment webhook received but no webhook secret is configured");
        return Err(CoreError::Unauthorized("Webhook signing is not configured".into()).into());
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing payment signature header".into()))?;

    verify_signature(
        secret,
        signature,
        &body,
        chrono::Utc::now().timestamp(),
        payment.webhook_tolerance_secs,
    )?;

    if let Some(notification) = parse_notification(&body)? {
        match state
            .sessions
            .mark_paid(notification.session_id, &notification.payment_reference)
            .await
        {
            Ok(_) => {}
            // Acknowledge so the provider stops retrying a notification we can never apply.
            Err(CoreError::NotFound { .. }) => {
                tracing::warn!(
                    session_id = %notification.session_id,
                    payment_reference = %notification.payment_reference,
                    "Payment notification for unknown session",
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Json(json!({ "received": true })))
}
