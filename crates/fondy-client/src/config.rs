//! # Client Configuration
//!
//! Transport options and merchant credentials.
//! Credentials can be loaded from environment variables (and `.env`).

use fondy_core::{default_base_url, FondyError, FondyResult, MerchantAccount};
use reqwest::Client;
use std::env;
use std::time::Duration;
use url::Url;

/// Transport-level options
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Gateway base URL (overridable for sandboxes and tests)
    pub base_url: Url,

    /// Log request and response bodies
    pub is_debug: bool,

    /// Per-request timeout. `None` leaves reqwest's default (no timeout).
    pub timeout: Option<Duration>,

    /// Upper bound on idle pooled connections per host
    pub pool_max_idle_per_host: Option<usize>,

    /// `User-Agent` header value
    pub user_agent: String,
}

impl ClientOptions {
    /// Load options from environment variables.
    ///
    /// Optional env vars:
    /// - `FONDY_BASE_URL`
    /// - `FONDY_DEBUG` (`1` or `true`)
    /// - `FONDY_TIMEOUT_SECS`
    pub fn from_env() -> FondyResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mut options = Self::default();

        if let Ok(base) = env::var("FONDY_BASE_URL") {
            let url = Url::parse(&base).map_err(|e| {
                FondyError::Configuration(format!("FONDY_BASE_URL is not a valid URL: {}", e))
            })?;
            options = options.with_base_url(url);
        }

        if let Ok(flag) = env::var("FONDY_DEBUG") {
            options.is_debug = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Ok(secs) = env::var("FONDY_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                FondyError::Configuration("FONDY_TIMEOUT_SECS must be a number".to_string())
            })?;
            options.timeout = Some(Duration::from_secs(secs));
        }

        Ok(options)
    }

    /// Builder: set custom gateway base URL
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    /// Builder: enable body logging
    pub fn with_debug(mut self, is_debug: bool) -> Self {
        self.is_debug = is_debug;
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builder: cap idle pooled connections
    pub fn with_pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = Some(max);
        self
    }

    /// Build the pooled HTTP client these options describe
    pub fn build_http_client(&self) -> FondyResult<Client> {
        let mut builder = Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(max) = self.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max);
        }
        builder
            .build()
            .map_err(|e| FondyError::Configuration(format!("cannot build HTTP client: {}", e)))
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            is_debug: false,
            timeout: None,
            pool_max_idle_per_host: None,
            user_agent: format!("fondy-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Options plus merchant credentials
#[derive(Debug, Clone)]
pub struct FondyConfig {
    pub options: ClientOptions,
    pub merchant: MerchantAccount,
}

impl FondyConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `FONDY_MERCHANT_ID`
    /// - `FONDY_MERCHANT_KEY`
    ///
    /// Optional: `FONDY_MERCHANT_CREDIT_KEY`, `FONDY_MERCHANT_STRING`, plus
    /// everything [`ClientOptions::from_env`] reads.
    pub fn from_env() -> FondyResult<Self> {
        let options = ClientOptions::from_env()?;

        let merchant_id = env::var("FONDY_MERCHANT_ID").map_err(|_| {
            FondyError::Configuration("FONDY_MERCHANT_ID not set".to_string())
        })?;

        let merchant_key = env::var("FONDY_MERCHANT_KEY").map_err(|_| {
            FondyError::Configuration("FONDY_MERCHANT_KEY not set".to_string())
        })?;

        if merchant_id.trim().is_empty() || merchant_key.is_empty() {
            return Err(FondyError::Configuration(
                "FONDY_MERCHANT_ID and FONDY_MERCHANT_KEY must not be empty".to_string(),
            ));
        }

        let mut merchant = MerchantAccount::new(merchant_id.trim(), merchant_key);
        if let Ok(credit_key) = env::var("FONDY_MERCHANT_CREDIT_KEY") {
            merchant = merchant.with_credit_key(credit_key);
        }
        if let Ok(label) = env::var("FONDY_MERCHANT_STRING") {
            merchant = merchant.with_merchant_string(label);
        }

        Ok(Self { options, merchant })
    }
}
