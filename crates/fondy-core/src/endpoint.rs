//! # Gateway Endpoints
//!
//! Fixed set of gateway URLs, resolved against a configurable base.

use crate::error::{FondyError, FondyResult};
use url::Url;

/// Production gateway host
pub const DEFAULT_BASE_URL: &str = "https://pay.fondy.eu";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CheckoutRedirect,
    CheckoutUrl,
    Status,
    Recurring,
    Capture,
    Reverse,
    P2pCredit,
    Settlement,
}

impl Endpoint {
    pub const fn path(&self) -> &'static str {
        match self {
            Endpoint::CheckoutRedirect => "/api/checkout/redirect/",
            Endpoint::CheckoutUrl => "/api/checkout/url/",
            Endpoint::Status => "/api/status/order_id",
            Endpoint::Recurring => "/api/recurring",
            Endpoint::Capture => "/api/capture/order_id",
            Endpoint::Reverse => "/api/reverse/order_id",
            Endpoint::P2pCredit => "/api/p2pcredit/",
            Endpoint::Settlement => "/api/settlement",
        }
    }

    /// Resolve this endpoint against a base URL
    pub fn url(&self, base: &Url) -> FondyResult<Url> {
        base.join(self.path()).map_err(|e| {
            FondyError::Configuration(format!("invalid gateway URL {}: {}", base, e))
        })
    }
}

/// Wire payload shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// Flat signed field set
    V1,
    /// Base64 `data` blob signed as a whole
    V2,
}

impl ApiVersion {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "1.0",
            ApiVersion::V2 => "2.0",
        }
    }
}

/// Parse the default production base URL
pub fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}
