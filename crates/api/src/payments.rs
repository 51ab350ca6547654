//! Checkout-provider client used for verify-on-read payment checks.

use std::time::Duration;

use async_trait::async_trait;
use duet_core::error::CoreError;
use duet_core::payment::{CheckoutList, PaymentOracle, SESSION_METADATA_KEY};
use duet_core::types::SessionId;
use serde::Deserialize;

use crate::config::PaymentConfig;

/// How many recent checkouts to scan for a matching session.
pub const CHECKOUT_LOOKBACK: usize = 10;

/// Per-request timeout against the provider.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

const REPORT_PRODUCT_NAME: &str = "Couple Compatibility Report";
const REPORT_PRODUCT_DESCRIPTION: &str =
    "Full 7-dimension compatibility analysis for you and your partner";

#[derive(Debug, Deserialize)]
struct CreatedCheckout {
    id: String,
    url: Option<String>,
}

/// [`PaymentOracle`] that lists recent checkout sessions from the provider
/// and looks for a paid one tagged with our session id.
pub struct CheckoutOracle {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    public_base_url: String,
    report_price_cents: u32,
}

impl CheckoutOracle {
    pub fn new(config: &PaymentConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            report_price_cents: config.report_price_cents,
        })
    }

    fn checkout_form(&self, session_id: SessionId) -> Vec<(String, String)> {
        let base = &self.public_base_url;
        vec![
            ("mode".into(), "payment".into()),
            ("payment_method_types[0]".into(), "card".into()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("line_items[0][price_data][currency]".into(), "usd".into()),
            (
                "line_items[0][price_data][unit_amount]".into(),
                self.report_price_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                REPORT_PRODUCT_NAME.into(),
            ),
            (
                "line_items[0][price_data][product_data][description]".into(),
                REPORT_PRODUCT_DESCRIPTION.into(),
            ),
            (
                "success_url".into(),
                format!("{base}/results/{session_id}?paid=true"),
            ),
            ("cancel_url".into(), format!("{base}/?cancelled=true")),
            (
                format!("metadata[{SESSION_METADATA_KEY}]"),
                session_id.to_string(),
            ),
        ]
    }
}

fn provider_error(err: reqwest::Error) -> CoreError {
    CoreError::Internal(format!("Payment provider request failed: {err}"))
}

#[async_trait]
impl PaymentOracle for CheckoutOracle {
    async fn find_completed_payment(
        &self,
        session_id: SessionId,
    ) -> Result<Option<String>, CoreError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(session_id = %session_id, "No payment API key configured, reporting unpaid");
            return Ok(None);
        };

        let url = format!(
            "{}/v1/checkout/sessions?limit={CHECKOUT_LOOKBACK}",
            self.api_base
        );
        let list: CheckoutList = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(provider_error)?
            .error_for_status()
            .map_err(provider_error)?
            .json()
            .await
            .map_err(provider_error)?;

        let found = list
            .data
            .into_iter()
            .find(|c| c.is_paid() && c.session_id() == Some(session_id))
            .map(|c| c.id);

        tracing::debug!(session_id = %session_id, paid = found.is_some(), "Checked payment provider");
        Ok(found)
    }

    async fn create_checkout(&self, session_id: SessionId) -> Result<String, CoreError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CoreError::Internal(
                "Payment provider API key is not configured".into(),
            ));
        };

        let created: CreatedCheckout = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(api_key)
            .form(&self.checkout_form(session_id))
            .send()
            .await
            .map_err(provider_error)?
            .error_for_status()
            .map_err(provider_error)?
            .json()
            .await
            .map_err(provider_error)?;

        tracing::debug!(session_id = %session_id, checkout_id = %created.id, "Checkout created");

        created.url.ok_or_else(|| {
            CoreError::Internal(format!("Checkout {} was created without a URL", created.id))
        })
    }
}
