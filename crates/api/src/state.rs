use std::sync::Arc;

use duet_core::payment::PaymentOracle;
use duet_core::session::SessionService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is an `Arc` or wraps one.
#[derive(Clone)]
pub struct AppState {
    /// Session state machine over the configured record store.
    pub sessions: SessionService,
    /// On-demand payment lookups for verify-on-read.
    pub payments: Arc<dyn PaymentOracle>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
