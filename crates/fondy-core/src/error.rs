//! # Gateway Error Types
//!
//! Typed error handling for the Fondy client.
//! All gateway operations return `Result<T, FondyError>`.
//!
//! A declined or failed transaction is *not* an error: the gateway answers
//! with `response_status = "failure"` and the parsed [`Order`](crate::Order)
//! carries the message. Only construction, transport and decoding problems
//! surface here.

use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Diagnostic context for a failed gateway exchange.
///
/// Holds enough state to investigate a failure without re-deriving it:
/// the HTTP status (0 when no response arrived), the signed request that was
/// sent and whatever bytes came back.
#[derive(Debug)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    pub source: Option<BoxError>,
    pub request: Option<serde_json::Value>,
    pub raw_response: Option<Vec<u8>>,
}

impl ApiError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            request: None,
            raw_response: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a snapshot of the request that was sent
    pub fn with_request(mut self, request: serde_json::Value) -> Self {
        self.request = Some(request);
        self
    }

    /// Attach the raw response body
    pub fn with_raw_response(mut self, raw: impl Into<Vec<u8>>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }

    /// Raw response body as lossy UTF-8, for logging
    pub fn raw_response_text(&self) -> Option<String> {
        self.raw_response
            .as_deref()
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP error: {} ({})", self.message, self.code)?;
        if let Some(source) = &self.source {
            write!(f, " {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Core error type for all gateway operations
#[derive(Debug, Error)]
pub enum FondyError {
    /// Configuration errors (missing keys, invalid base URL)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invoice carries no merchant account
    #[error("Invalid request: merchant account is required")]
    MissingMerchant,

    /// A field required for signing or for the operation is empty
    #[error("Invalid request: missing required field `{field}`")]
    MissingField { field: &'static str },

    /// Network/HTTP error communicating with the gateway
    #[error("Network error: {0}")]
    Network(#[source] ApiError),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[source] ApiError),

    /// Signature on a gateway payload did not match
    #[error("Signature verification failed: {0}")]
    InvalidSignature(String),

    /// Serialization error while building a request
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FondyError {
    /// Returns true if the request never reached the gateway, so resending
    /// it cannot apply a hold, charge or payout twice.
    ///
    /// A network error with an HTTP status (code != 0) means the gateway
    /// answered and may have acted; check `status` before retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FondyError::Network(e) if e.code == 0)
    }

    /// Returns true if the request never left the process
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            FondyError::Configuration(_)
                | FondyError::InvalidRequest(_)
                | FondyError::MissingMerchant
                | FondyError::MissingField { .. }
                | FondyError::Serialization(_)
        )
    }

    /// Diagnostic context, when the failure happened on the wire
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            FondyError::Network(e) | FondyError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FondyError {
    fn from(e: serde_json::Error) -> Self {
        FondyError::Serialization(e.to_string())
    }
}

/// Result type alias for gateway operations
pub type FondyResult<T> = Result<T, FondyError>;
