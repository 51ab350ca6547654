//! Payment gate plumbing.
//!
//! The session state machine only needs a yes/no answer to "has this
//! session been paid for" plus a reference to record. That answer arrives
//! two ways, and both end in `SessionService::mark_paid`:
//!
//! - a signed webhook notification from the checkout provider, verified
//!   with [`verify_signature`] and decoded with [`parse_notification`];
//! - an on-demand poll through a [`PaymentOracle`].
//!
//! The oracle also opens the hosted checkout that starts the payment.

use std::collections::HashMap;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::CoreError;
use crate::hashing::{hex_decode, hex_encode};
use crate::types::SessionId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Header carrying the webhook signature (`t=<unix>,v1=<hex>`).
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Default maximum age of a signed notification.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// The only notification type that confirms a payment.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Checkout metadata key holding our session id.
pub const SESSION_METADATA_KEY: &str = "sessionId";

/// `payment_status` value of a settled checkout.
pub const PAYMENT_STATUS_PAID: &str = "paid";

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Oracle seam
// ---------------------------------------------------------------------------

/// On-demand view of the payment provider.
#[async_trait]
pub trait PaymentOracle: Send + Sync {
    /// Returns the provider's payment reference if a completed payment
    /// exists for `session_id`, `None` if it does not (yet).
    async fn find_completed_payment(
        &self,
        session_id: SessionId,
    ) -> Result<Option<String>, CoreError>;

    /// Open a hosted checkout tagged with `session_id` in its metadata and
    /// return the URL to redirect the payer to.
    async fn create_checkout(&self, session_id: SessionId) -> Result<String, CoreError>;
}

// ---------------------------------------------------------------------------
// Provider wire types
// ---------------------------------------------------------------------------

/// A checkout session as the provider reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutObject {
    pub id: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutObject {
    /// Our session id from the checkout metadata, if present and well formed.
    pub fn session_id(&self) -> Option<SessionId> {
        self.metadata
            .get(SESSION_METADATA_KEY)
            .and_then(|raw| raw.parse().ok())
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some(PAYMENT_STATUS_PAID)
    }
}

/// Page of checkout sessions returned by the provider's list endpoint.
#[derive(Debug, Deserialize)]
pub struct CheckoutList {
    pub data: Vec<CheckoutObject>,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    kind: String,
    data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
struct WebhookEventData {
    object: serde_json::Value,
}

/// A confirmed payment extracted from a webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    pub session_id: SessionId,
    pub payment_reference: String,
}

/// Decode a verified webhook body.
///
/// Returns `Ok(None)` for event types other than [`CHECKOUT_COMPLETED`]
/// and for checkouts that do not carry a usable session id; those are
/// acknowledged but ignored.
pub fn parse_notification(payload: &[u8]) -> Result<Option<PaymentNotification>, CoreError> {
    let event: WebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| CoreError::Validation(format!("Malformed webhook payload: {e}")))?;

    if event.kind != CHECKOUT_COMPLETED {
        tracing::debug!(event_type = %event.kind, "Ignoring payment notification");
        return Ok(None);
    }

    let checkout: CheckoutObject = serde_json::from_value(event.data.object)
        .map_err(|e| CoreError::Validation(format!("Malformed checkout object: {e}")))?;

    let Some(session_id) = checkout.session_id() else {
        tracing::warn!(checkout_id = %checkout.id, "Completed checkout without a session id");
        return Ok(None);
    };

    Ok(Some(PaymentNotification {
        session_id,
        payment_reference: checkout.id,
    }))
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, CoreError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::Internal(format!("HMAC key rejected: {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Hex HMAC-SHA256 over `"<timestamp>.<payload>"`.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, CoreError> {
    Ok(hex_encode(mac_for(secret, timestamp, payload)?.finalize().into_bytes()))
}

/// Build a signature header value, as the provider would send it.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, CoreError> {
    Ok(format!("t={timestamp},v1={}", sign_payload(secret, timestamp, payload)?))
}

/// Verify a webhook signature header against the raw body.
///
/// The header may carry several `v1` entries (secret rotation); any match
/// is accepted. Comparison is constant-time. Notifications older or newer
/// than `tolerance_secs` relative to `now_unix` are rejected.
pub fn verify_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
    now_unix: i64,
    tolerance_secs: i64,
) -> Result<(), CoreError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| CoreError::Validation("Signature header has no timestamp".into()))?;
    if candidates.is_empty() {
        return Err(CoreError::Validation(
            "Signature header has no v1 signature".into(),
        ));
    }

    if now_unix.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        return Err(CoreError::Unauthorized(
            "Signature timestamp outside tolerance".into(),
        ));
    }

    for candidate in candidates {
        let Some(expected) = hex_decode(candidate) else {
            continue;
        };
        if mac_for(secret, timestamp, payload)?
            .verify_slice(&expected)
            .is_ok()
        {
            return Ok(());
        }
    }

    Err(CoreError::Unauthorized("Invalid webhook signature".into()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
