//! # Request Types
//!
//! `InvoiceRequest` is what callers fill in; `FondyRequestObject` is the
//! signed field set that goes on the wire. Request objects are built per
//! call, signed once and dropped when the call returns.

use crate::account::MerchantAccount;
use crate::currency::Currency;
use crate::endpoint::ApiVersion;
use crate::error::{FondyError, FondyResult};
use crate::reservation::ReservationData;
use crate::signature;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

/// How the customer's card is referenced
#[derive(Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Token (`rectoken`) saved from an earlier payment
    CardToken(String),
    /// Plain card number, only accepted for payouts
    CardNumber(String),
}

impl PaymentMethod {
    pub fn token(&self) -> Option<&str> {
        match self {
            PaymentMethod::CardToken(token) => Some(token),
            PaymentMethod::CardNumber(_) => None,
        }
    }

    pub fn card_number(&self) -> Option<&str> {
        match self {
            PaymentMethod::CardNumber(number) => Some(number),
            PaymentMethod::CardToken(_) => None,
        }
    }
}

impl std::fmt::Debug for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::CardToken(_) => f.write_str("CardToken(***)"),
            PaymentMethod::CardNumber(number) => {
                let tail: String = number
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                write!(f, "CardNumber(****{})", tail)
            }
        }
    }
}

/// Y/N flag as the gateway spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    #[serde(rename = "Y")]
    Yes,
    #[serde(rename = "N")]
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverType {
    Merchant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisites {
    /// Share in the smallest currency unit
    pub amount: i64,
    pub merchant_id: String,
}

/// Recipient of a split settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub requisites: Requisites,
    #[serde(rename = "type")]
    pub receiver_type: ReceiverType,
}

impl Receiver {
    pub fn merchant(merchant_id: impl Into<String>, amount: i64) -> Self {
        Self {
            requisites: Requisites {
                amount,
                merchant_id: merchant_id.into(),
            },
            receiver_type: ReceiverType::Merchant,
        }
    }
}

/// Caller-facing transaction description.
///
/// The merchant is borrowed: one account serves many invoices.
#[derive(Debug, Clone)]
pub struct InvoiceRequest<'a> {
    pub invoice_id: Uuid,
    pub merchant: Option<&'a MerchantAccount>,
    /// Amount in the smallest currency unit
    pub amount: Option<i64>,
    pub currency: Currency,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub reservation_data: Option<ReservationData>,
    pub server_callback_url: Option<Url>,
    pub response_url: Option<Url>,
    pub language: Option<String>,
    /// Free-form reason, sent with refunds
    pub comment: Option<String>,
    pub receivers: Vec<Receiver>,
}

impl<'a> InvoiceRequest<'a> {
    pub fn new(invoice_id: Uuid) -> Self {
        Self {
            invoice_id,
            merchant: None,
            amount: None,
            currency: Currency::default(),
            description: None,
            payment_method: None,
            reservation_data: None,
            server_callback_url: None,
            response_url: None,
            language: None,
            comment: None,
            receivers: Vec::new(),
        }
    }

    /// Invoice with a freshly generated id
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4())
    }

    pub fn with_merchant(mut self, merchant: &'a MerchantAccount) -> Self {
        self.merchant = Some(merchant);
        self
    }

    /// Set amount from a decimal value in the invoice currency
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(self.currency.to_smallest_unit(amount));
        self
    }

    /// Set amount in the smallest currency unit
    pub fn with_amount_minor(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set currency. Call before `with_amount` when passing decimals.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_card_token(mut self, token: impl Into<String>) -> Self {
        self.payment_method = Some(PaymentMethod::CardToken(token.into()));
        self
    }

    pub fn with_card_number(mut self, number: impl Into<String>) -> Self {
        self.payment_method = Some(PaymentMethod::CardNumber(number.into()));
        self
    }

    pub fn with_reservation_data(mut self, data: ReservationData) -> Self {
        self.reservation_data = Some(data);
        self
    }

    pub fn with_callback_url(mut self, url: Url) -> Self {
        self.server_callback_url = Some(url);
        self
    }

    pub fn with_response_url(mut self, url: Url) -> Self {
        self.response_url = Some(url);
        self
    }

    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.language = Some(lang.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_receiver(mut self, receiver: Receiver) -> Self {
        self.receivers.push(receiver);
        self
    }

    /// Gateway order id for this invoice
    pub fn order_id(&self) -> String {
        self.invoice_id.to_string()
    }

    /// Card token, if the invoice carries one
    pub fn card_token(&self) -> Option<&str> {
        self.payment_method.as_ref().and_then(PaymentMethod::token)
    }

    /// Merchant account or a construction error
    pub fn require_merchant(&self) -> FondyResult<&'a MerchantAccount> {
        self.merchant.ok_or(FondyError::MissingMerchant)
    }

    /// Amount or a construction error
    pub fn require_amount(&self) -> FondyResult<i64> {
        match self.amount {
            Some(amount) if amount > 0 => Ok(amount),
            Some(amount) => Err(FondyError::InvalidRequest(format!(
                "amount must be positive, got {}",
                amount
            ))),
            None => Err(FondyError::MissingField { field: "amount" }),
        }
    }

    /// Order description, falling back to the merchant label
    pub fn order_description(&self) -> String {
        self.description
            .clone()
            .or_else(|| {
                self.merchant
                    .and_then(MerchantAccount::merchant_string)
                    .map(|label| format!("{} {}", label, self.invoice_id))
            })
            .unwrap_or_else(|| format!("Order {}", self.invoice_id))
    }
}

/// Signed field set sent to the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FondyRequestObject {
    pub merchant_id: String,
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectoken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_rectoken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preauth: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_rectoken: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_callback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receiver: Vec<Receiver>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl FondyRequestObject {
    pub fn new(merchant_id: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            order_id: order_id.into(),
            ..Default::default()
        }
    }

    /// Fields required before a signature can be computed
    pub fn validate(&self) -> FondyResult<()> {
        if self.merchant_id.trim().is_empty() {
            return Err(FondyError::MissingField {
                field: "merchant_id",
            });
        }
        if self.order_id.trim().is_empty() {
            return Err(FondyError::MissingField { field: "order_id" });
        }
        Ok(())
    }

    /// Wire fields as a JSON map
    pub fn fields(&self) -> FondyResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(FondyError::Serialization(format!(
                "request serialized to non-object: {}",
                other
            ))),
        }
    }

    /// Compute and store the v1 signature
    pub fn sign(&mut self, secret: &str) -> FondyResult<()> {
        self.validate()?;
        let fields = self.fields()?;
        self.signature = Some(signature::sign_fields(secret, &fields));
        Ok(())
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Check the stored signature against a secret
    pub fn verify(&self, secret: &str) -> bool {
        self.fields()
            .map(|fields| signature::verify_fields(secret, &fields))
            .unwrap_or(false)
    }

    /// Attach encoded reservation data
    pub fn set_reservation_data(&mut self, data: &ReservationData) -> FondyResult<()> {
        self.reservation_data = Some(data.base64_encoded()?);
        Ok(())
    }
}

/// Top-level wire wrapper: `{"request": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope<T> {
    pub request: T,
}

impl<T> RequestEnvelope<T> {
    pub fn new(request: T) -> Self {
        Self { request }
    }
}

#[derive(Serialize)]
struct OrderData<'a> {
    order: &'a FondyRequestObject,
}

/// v2 payload: the order travels base64-encoded, signed as one blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestV2 {
    pub version: String,
    pub data: String,
    pub signature: String,
}

impl RequestV2 {
    /// Encode and sign an order
    pub fn sign(order: &FondyRequestObject, secret: &str) -> FondyResult<Self> {
        order.validate()?;

        let mut unsigned = order.clone();
        unsigned.signature = None;
        let json = serde_json::to_vec(&OrderData { order: &unsigned })?;
        let data = STANDARD.encode(json);
        let signature = signature::sign_data(secret, &data);

        Ok(Self {
            version: ApiVersion::V2.as_str().to_string(),
            data,
            signature,
        })
    }

    /// Decode the order carried in `data`
    pub fn decode_order(&self) -> FondyResult<FondyRequestObject> {
        #[derive(Deserialize)]
        struct Owned {
            order: FondyRequestObject,
        }

        let raw = STANDARD
            .decode(&self.data)
            .map_err(|e| FondyError::Serialization(format!("invalid v2 data: {}", e)))?;
        let owned: Owned = serde_json::from_slice(&raw)?;
        Ok(owned.order)
    }

    pub fn verify(&self, secret: &str) -> bool {
        signature::verify_data(secret, &self.data, &self.signature)
    }
}
