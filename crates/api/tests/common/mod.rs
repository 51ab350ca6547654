#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use duet_api::config::{PaymentConfig, ServerConfig, DEFAULT_PAYMENT_API_BASE};
use duet_api::router::build_app_router;
use duet_api::state::AppState;
use duet_core::error::CoreError;
use duet_core::payment::PaymentOracle;
use duet_core::questions::QUESTION_BANK;
use duet_core::session::SessionService;
use duet_core::store::MemorySessionStore;
use duet_core::types::SessionId;

pub const WEBHOOK_SECRET: &str = "whsec_integration";

/// Build a test `ServerConfig` with safe defaults and a known webhook secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        payment: PaymentConfig {
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            api_key: None,
            api_base: DEFAULT_PAYMENT_API_BASE.to_string(),
            webhook_tolerance_secs: 300,
            public_base_url: "http://localhost:3000".to_string(),
            report_price_cents: 199,
        },
    }
}

/// Payment oracle whose answers are set by the test.
#[derive(Default)]
pub struct StubOracle {
    pub paid: Mutex<Option<(SessionId, String)>>,
}

impl StubOracle {
    pub fn pay(&self, session_id: SessionId, reference: &str) {
        *self.paid.lock().unwrap() = Some((session_id, reference.to_string()));
    }
}

#[async_trait]
impl PaymentOracle for StubOracle {
    async fn find_completed_payment(
        &self,
        session_id: SessionId,
    ) -> Result<Option<String>, CoreError> {
        Ok(self
            .paid
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(id, _)| *id == session_id)
            .map(|(_, reference)| reference.clone()))
    }

    async fn create_checkout(&self, session_id: SessionId) -> Result<String, CoreError> {
        Ok(format!("https://checkout.test/pay/{session_id}"))
    }
}

pub struct TestApp {
    pub router: Router,
    pub sessions: SessionService,
    pub oracle: Arc<StubOracle>,
}

/// Build the full application router over an in-memory store, using the
/// same middleware stack as production.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let sessions = SessionService::new(Arc::new(MemorySessionStore::new()));
    let oracle = Arc::new(StubOracle::default());

    let state = AppState {
        sessions: sessions.clone(),
        payments: oracle.clone(),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        sessions,
        oracle,
    }
}

/// Answers picking the option with weight `value` for every question.
pub fn uniform_answers(value: i32) -> serde_json::Value {
    serde_json::Value::Array(
        QUESTION_BANK
            .iter()
            .map(|q| serde_json::json!({ "questionId": q.id, "value": value }))
            .collect(),
    )
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a raw body with extra headers (used for signed webhooks).
pub async fn post_raw(
    app: Router,
    uri: &str,
    body: Vec<u8>,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    app.oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a session through the API; returns `(session_id, partner_token)`.
pub async fn create_session(app: &TestApp) -> (String, String) {
    let response = post_json(
        app.router.clone(),
        "/api/v1/sessions",
        serde_json::json!({
            "personAName": "Ada",
            "personBName": "Grace",
            "answers": uniform_answers(4),
        }),
    )
    .await;
    let json = body_json(response).await;
    (
        json["data"]["sessionId"].as_str().unwrap().to_string(),
        json["data"]["partnerToken"].as_str().unwrap().to_string(),
    )
}
