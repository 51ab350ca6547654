//! Domain crate for the paired compatibility quiz.
//!
//! Holds everything that does not touch the network or a database: the
//! question bank, the scoring engine, partner token issuing, the session
//! state machine and the record-store / payment-oracle seams it drives.

pub mod error;
pub mod hashing;
pub mod partner_token;
pub mod payment;
pub mod questions;
pub mod scoring;
pub mod session;
pub mod store;
pub mod types;
