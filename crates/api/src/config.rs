use duet_core::payment::DEFAULT_TOLERANCE_SECS;

/// Default checkout-provider API base URL.
pub const DEFAULT_PAYMENT_API_BASE: &str = "https://api.stripe.com";

/// Default price of the combined report, in cents.
pub const DEFAULT_REPORT_PRICE_CENTS: u32 = 199;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL URL. When absent, sessions live in process memory.
    pub database_url: Option<String>,
    /// Payment provider settings.
    pub payment: PaymentConfig,
}

/// Settings for the two payment confirmation paths.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// HMAC secret for webhook notifications. Without it every webhook is rejected.
    pub webhook_secret: Option<String>,
    /// Provider secret key for verify-on-read. Without it lookups report unpaid.
    pub api_key: Option<String>,
    /// Provider API base URL.
    pub api_base: String,
    /// Maximum webhook timestamp skew in seconds.
    pub webhook_tolerance_secs: i64,
    /// Public URL of the web app; checkout redirects land here.
    pub public_base_url: String,
    /// Price of the combined report, in cents (USD).
    pub report_price_cents: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `3000`                   |
    /// | `CORS_ORIGINS`           | `http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                     |
    /// | `DATABASE_URL`           | unset (in-memory store)  |
    /// | `PAYMENT_WEBHOOK_SECRET` | unset                    |
    /// | `PAYMENT_API_KEY`        | unset                    |
    /// | `PAYMENT_API_BASE`       | `https://api.stripe.com` |
    /// | `WEBHOOK_TOLERANCE_SECS` | `300`                    |
    /// | `PUBLIC_BASE_URL`        | `http://localhost:3000`  |
    /// | `REPORT_PRICE_CENTS`     | `199`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url: non_empty_var("DATABASE_URL"),
            payment: PaymentConfig::from_env(),
        }
    }
}

impl PaymentConfig {
    pub fn from_env() -> Self {
        let webhook_tolerance_secs: i64 = std::env::var("WEBHOOK_TOLERANCE_SECS")
            .map(|v| v.parse().expect("WEBHOOK_TOLERANCE_SECS must be a valid i64"))
            .unwrap_or(DEFAULT_TOLERANCE_SECS);

        let report_price_cents: u32 = std::env::var("REPORT_PRICE_CENTS")
            .map(|v| v.parse().expect("REPORT_PRICE_CENTS must be a valid u32"))
            .unwrap_or(DEFAULT_REPORT_PRICE_CENTS);

        Self {
            webhook_secret: non_empty_var("PAYMENT_WEBHOOK_SECRET"),
            api_key: non_empty_var("PAYMENT_API_KEY"),
            api_base: non_empty_var("PAYMENT_API_BASE")
                .unwrap_or_else(|| DEFAULT_PAYMENT_API_BASE.into()),
            webhook_tolerance_secs,
            public_base_url: non_empty_var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".into()),
            report_price_cents,
        }
    }
}

/// Read an env var, treating empty values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
