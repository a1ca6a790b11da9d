//! # Merchant Account
//!
//! Credential bundle identifying the caller to the gateway, and the
//! operation tags that decide which of its two secrets signs a request.

use crate::endpoint::{ApiVersion, Endpoint};
use crate::error::{FondyError, FondyResult};

/// Which shared secret signs a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Regular payment key
    Standard,
    /// Separate key issued for payouts (p2p credit)
    Credit,
}

/// Gateway operation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    VerificationLink,
    Status,
    Payment,
    Hold,
    Capture,
    Refund,
    Credit,
    Split,
    SplitRefund,
}

impl Operation {
    /// Secret used to sign this operation
    pub const fn key_kind(&self) -> KeyKind {
        match self {
            Operation::Credit => KeyKind::Credit,
            _ => KeyKind::Standard,
        }
    }

    /// Payload shape this operation is sent with
    pub const fn api_version(&self) -> ApiVersion {
        match self {
            Operation::Split | Operation::SplitRefund => ApiVersion::V2,
            _ => ApiVersion::V1,
        }
    }

    /// Endpoint for this operation.
    ///
    /// Payments and holds against a saved card token go to `recurring`;
    /// without a token they open a hosted checkout.
    pub const fn endpoint(&self, tokenized: bool) -> Endpoint {
        match self {
            Operation::VerificationLink => Endpoint::CheckoutRedirect,
            Operation::Status => Endpoint::Status,
            Operation::Payment | Operation::Hold if tokenized => Endpoint::Recurring,
            Operation::Payment | Operation::Hold => Endpoint::CheckoutUrl,
            Operation::Capture => Endpoint::Capture,
            Operation::Refund | Operation::SplitRefund => Endpoint::Reverse,
            Operation::Credit => Endpoint::P2pCredit,
            Operation::Split => Endpoint::Settlement,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::VerificationLink => "verification_link",
            Operation::Status => "status",
            Operation::Payment => "payment",
            Operation::Hold => "hold",
            Operation::Capture => "capture",
            Operation::Refund => "refund",
            Operation::Credit => "credit",
            Operation::Split => "split",
            Operation::SplitRefund => "split_refund",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merchant credentials. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct MerchantAccount {
    merchant_id: String,
    merchant_key: String,
    merchant_credit_key: Option<String>,
    merchant_string: Option<String>,
}

impl MerchantAccount {
    pub fn new(merchant_id: impl Into<String>, merchant_key: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            merchant_key: merchant_key.into(),
            merchant_credit_key: None,
            merchant_string: None,
        }
    }

    /// Builder: set the payout (credit) key
    pub fn with_credit_key(mut self, key: impl Into<String>) -> Self {
        self.merchant_credit_key = Some(key.into());
        self
    }

    /// Builder: set the human-readable merchant label
    pub fn with_merchant_string(mut self, label: impl Into<String>) -> Self {
        self.merchant_string = Some(label.into());
        self
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn merchant_string(&self) -> Option<&str> {
        self.merchant_string.as_deref()
    }

    pub fn has_credit_key(&self) -> bool {
        self.merchant_credit_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
    }

    /// Secret for the given key kind
    pub fn secret(&self, kind: KeyKind) -> FondyResult<&str> {
        match kind {
            KeyKind::Standard if self.merchant_key.is_empty() => Err(
                FondyError::Configuration("merchant key is empty".to_string()),
            ),
            KeyKind::Standard => Ok(&self.merchant_key),
            KeyKind::Credit => self
                .merchant_credit_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    FondyError::Configuration(
                        "merchant credit key is required for credit operations".to_string(),
                    )
                }),
        }
    }

    /// Secret that signs the given operation
    pub fn secret_for(&self, operation: Operation) -> FondyResult<&str> {
        self.secret(operation.key_kind())
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for MerchantAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantAccount")
            .field("merchant_id", &self.merchant_id)
            .field("merchant_key", &"***")
            .field(
                "merchant_credit_key",
                &self.merchant_credit_key.as_ref().map(|_| "***"),
            )
            .field("merchant_string", &self.merchant_string)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> MerchantAccount {
        MerchantAccount::new("1396424", "test").with_credit_key("credit-test")
    }

    #[test]
    fn test_key_selection() {
        let acct = account();
        assert_eq!(acct.secret_for(Operation::Hold).unwrap(), "test");
        assert_eq!(acct.secret_for(Operation::Split).unwrap(), "test");
        assert_eq!(acct.secret_for(Operation::Credit).unwrap(), "credit-test");
    }

    #[test]
    fn test_missing_credit_key() {
        let acct = MerchantAccount::new("1396424", "test");
        assert!(!acct.has_credit_key());
        assert!(matches!(
            acct.secret_for(Operation::Credit),
            Err(FondyError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_standard_key() {
        let acct = MerchantAccount::new("1396424", "");
        assert!(acct.secret(KeyKind::Standard).is_err());
    }

    #[test]
    fn test_endpoint_selection() {
        assert_eq!(Operation::Hold.endpoint(true), Endpoint::Recurring);
        assert_eq!(Operation::Hold.endpoint(false), Endpoint::CheckoutUrl);
        assert_eq!(Operation::SplitRefund.endpoint(false), Endpoint::Reverse);
        assert_eq!(Operation::Split.api_version(), ApiVersion::V2);
        assert_eq!(Operation::Refund.api_version(), ApiVersion::V1);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", account());
        assert!(rendered.contains("1396424"));
        assert!(!rendered.contains("credit-test"));
        assert!(!rendered.contains("\"test\""));
    }
}
