//! Integration tests for the payment endpoints: checkout, signed webhooks
//! and verify-on-read.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with, create_session, get, post_json, post_raw,
    test_config, WEBHOOK_SECRET,
};
use duet_core::payment::{signature_header, CHECKOUT_COMPLETED, SIGNATURE_HEADER};
use serde_json::json;

const WEBHOOK_URI: &str = "/api/v1/payments/webhook";

fn completed_checkout(session_id: &str, checkout_id: &str) -> Vec<u8> {
    json!({
        "type": CHECKOUT_COMPLETED,
        "data": {
            "object": {
                "id": checkout_id,
                "payment_status": "paid",
                "metadata": { "sessionId": session_id },
            }
        }
    })
    .to_string()
    .into_bytes()
}

fn sign(payload: &[u8]) -> String {
    signature_header(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), payload).unwrap()
}

async fn read_paid(app: &common::TestApp, session_id: &str) -> bool {
    let response = get(app.router.clone(), &format!("/api/v1/sessions/{session_id}")).await;
    body_json(response).await["data"]["paid"].as_bool().unwrap()
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signed_webhook_marks_session_paid() {
    let app = build_test_app();
    let (session_id, _) = create_session(&app).await;
    let payload = completed_checkout(&session_id, "cs_live_1");
    let signature = sign(&payload);

    let response = post_raw(
        app.router.clone(),
        WEBHOOK_URI,
        payload,
        &[(SIGNATURE_HEADER, signature.as_str())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["received"], true);
    assert!(read_paid(&app, &session_id).await);
}

#[tokio::test]
async fn duplicate_webhook_is_acknowledged() {
    let app = build_test_app();
    let (session_id, _) = create_session(&app).await;

    for _ in 0..2 {
        let payload = completed_checkout(&session_id, "cs_dup");
        let signature = sign(&payload);
        let response = post_raw(
            app.router.clone(),
            WEBHOOK_URI,
            payload,
            &[(SIGNATURE_HEADER, signature.as_str())],
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert!(read_paid(&app, &session_id).await);
}

#[tokio::test]
async fn webhook_without_signature_is_bad_request() {
    let app = build_test_app();
    let (session_id, _) = create_session(&app).await;

    let response = post_raw(
        app.router.clone(),
        WEBHOOK_URI,
        completed_checkout(&session_id, "cs_1"),
        &[],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!read_paid(&app, &session_id).await);
}

#[tokio::test]
async fn webhook_with_forged_signature_is_unauthorized() {
    let app = build_test_app();
    let (session_id, _) = create_session(&app).await;
    let payload = completed_checkout(&session_id, "cs_1");
    let forged =
        signature_header("some_other_secret", chrono::Utc::now().timestamp(), &payload).unwrap();

    let response = post_raw(
        app.router.clone(),
        WEBHOOK_URI,
        payload,
        &[(SIGNATURE_HEADER, forged.as_str())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    assert!(!read_paid(&app, &session_id).await);
}

#[tokio::test]
async fn webhook_with_stale_timestamp_is_unauthorized() {
    let app = build_test_app();
    let (session_id, _) = create_session(&app).await;
    let payload = completed_checkout(&session_id, "cs_1");
    let stale = signature_header(
        WEBHOOK_SECRET,
        chrono::Utc::now().timestamp() - 3_600,
        &payload,
    )
    .unwrap();

    let response = post_raw(
        app.router,
        WEBHOOK_URI,
        payload,
        &[(SIGNATURE_HEADER, stale.as_str())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_is_rejected_when_no_secret_is_configured() {
    let mut config = test_config();
    config.payment.webhook_secret = None;
    let app = build_test_app_with(config);
    let (session_id, _) = create_session(&app).await;
    let payload = completed_checkout(&session_id, "cs_1");
    let signature = sign(&payload);

    let response = post_raw(
        app.router.clone(),
        WEBHOOK_URI,
        payload,
        &[(SIGNATURE_HEADER, signature.as_str())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!read_paid(&app, &session_id).await);
}

#[tokio::test]
async fn other_event_types_are_acknowledged_and_ignored() {
    let app = build_test_app();
    let (session_id, _) = create_session(&app).await;
    let payload = json!({
        "type": "charge.refunded",
        "data": { "object": { "id": "ch_1" } }
    })
    .to_string()
    .into_bytes();
    let signature = sign(&payload);

    let response = post_raw(
        app.router.clone(),
        WEBHOOK_URI,
        payload,
        &[(SIGNATURE_HEADER, signature.as_str())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["received"], true);
    assert!(!read_paid(&app, &session_id).await);
}

#[tokio::test]
async fn notification_for_unknown_session_is_acknowledged() {
    let app = build_test_app();
    let payload = completed_checkout(&uuid::Uuid::new_v4().to_string(), "cs_orphan");
    let signature = sign(&payload);

    let response = post_raw(
        app.router,
        WEBHOOK_URI,
        payload,
        &[(SIGNATURE_HEADER, signature.as_str())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn signed_but_malformed_payload_is_bad_request() {
    let app = build_test_app();
    let payload = b"not json".to_vec();
    let signature = sign(&payload);

    let response = post_raw(
        app.router,
        WEBHOOK_URI,
        payload,
        &[(SIGNATURE_HEADER, signature.as_str())],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Verify-on-read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn verify_reports_unpaid_until_provider_confirms() {
    let app = build_test_app();
    let (session_id, _) = create_session(&app).await;

    let response = post_json(
        app.router.clone(),
        "/api/v1/payments/verify",
        json!({ "sessionId": session_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["paid"], false);

    app.oracle.pay(session_id.parse().unwrap(), "cs_verified");

    let response = post_json(
        app.router.clone(),
        "/api/v1/payments/verify",
        json!({ "sessionId": session_id }),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["paid"], true);
    assert!(read_paid(&app, &session_id).await);
}

#[tokio::test]
async fn verify_requires_session_id() {
    let app = build_test_app();
    let response = post_json(app.router, "/api/v1/payments/verify", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn verify_unknown_session_is_404() {
    let app = build_test_app();
    let response = post_json(
        app.router,
        "/api/v1/payments/verify",
        json!({ "sessionId": uuid::Uuid::new_v4() }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn checkout_returns_provider_url_for_unpaid_session() {
    let app = build_test_app();
    let (session_id, _) = create_session(&app).await;

    let response = post_json(
        app.router,
        "/api/v1/payments/checkout",
        json!({ "sessionId": session_id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["url"],
        format!("https://checkout.test/pay/{session_id}")
    );
}

#[tokio::test]
async fn checkout_for_paid_session_is_conflict() {
    let app = build_test_app();
    let (session_id, _) = create_session(&app).await;
    app.sessions
        .mark_paid(session_id.parse().unwrap(), "cs_done")
        .await
        .unwrap();

    let response = post_json(
        app.router,
        "/api/v1/payments/checkout",
        json!({ "sessionId": session_id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
