//! Success envelope for API handlers.
//!
//! Session, question and payment-verification responses are wrapped as
//! `{ "data": ... }`. The health probe and the webhook acknowledgement are
//! consumed by infrastructure and the payment provider, so they stay bare.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
