//! # Response Types
//!
//! Typed views of gateway responses. A response whose `response_status` is
//! `failure` still parses successfully: callers branch on
//! [`Order::response_status`], business fields are simply absent.

use crate::currency::Currency;
use crate::error::{FondyError, FondyResult};
use crate::request::Receiver;
use crate::reservation::ReservationData;
use crate::signature;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of `order_time` in gateway responses
pub const ORDER_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Outcome of the API call itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failure,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Success => "success",
            ResponseStatus::Failure => "failure",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of the order on the gateway side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Processing,
    Declined,
    Approved,
    Expired,
    Reversed,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// No further transitions expected
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            OrderStatus::Declined
                | OrderStatus::Approved
                | OrderStatus::Expired
                | OrderStatus::Reversed
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Created => "created",
            OrderStatus::Processing => "processing",
            OrderStatus::Declined => "declined",
            OrderStatus::Approved => "approved",
            OrderStatus::Expired => "expired",
            OrderStatus::Reversed => "reversed",
            OrderStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// The gateway mixes numbers and numeric strings for the same field and
/// sends `""` for absent values.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn opt_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(de)? {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn opt_enum<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Option::<Value>::deserialize(de)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(v) => T::deserialize(v).map(Some).map_err(serde::de::Error::custom),
        }
    }

    /// Integral values only: `300`, `"300"` and `"300.00"` all give 300.
    /// A fractional value such as `"300.50"` is not a minor-unit amount and
    /// is dropped.
    pub fn opt_i64<'de, D>(de: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(de)? {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
            Some(Value::String(s)) => {
                let s = s.trim();
                s.parse().ok().or_else(|| s.parse().ok().and_then(whole))
            }
            _ => None,
        })
    }

    fn whole(v: f64) -> Option<i64> {
        let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
        (v.is_finite() && v.fract() == 0.0 && in_range).then_some(v as i64)
    }
}

/// Parsed v1 response (and server callback body)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub response_status: ResponseStatus,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub order_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_enum")]
    pub order_status: Option<OrderStatus>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub error_message: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub error_code: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub request_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub merchant_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub amount: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub actual_amount: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub reversal_amount: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub settlement_amount: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub capture_amount: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub capture_status: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub payment_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub tran_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub rectoken: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub masked_card: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub card_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub rrn: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub approval_code: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub response_code: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub response_description: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub checkout_url: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub order_time: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub sender_email: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub reservation_data: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub signature: Option<String>,
}

impl Order {
    /// Parse a raw `{"response": {...}}` body
    pub fn from_response_bytes(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<ResponseEnvelope<Order>>(raw).map(|env| env.response)
    }

    pub fn is_success(&self) -> bool {
        self.response_status == ResponseStatus::Success
    }

    pub fn is_approved(&self) -> bool {
        self.is_success() && self.order_status == Some(OrderStatus::Approved)
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency.as_deref().and_then(|c| c.parse().ok())
    }

    /// `order_time` as a timestamp (gateway local time)
    pub fn order_time(&self) -> Option<NaiveDateTime> {
        self.order_time
            .as_deref()
            .and_then(|t| NaiveDateTime::parse_from_str(t, ORDER_TIME_FORMAT).ok())
    }

    /// Reservation data echoed back by the gateway
    pub fn reservation(&self) -> Option<ReservationData> {
        self.reservation_data
            .as_deref()
            .and_then(ReservationData::from_base64)
    }
}

/// Top-level wire wrapper: `{"response": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub response: T,
}

/// Parsed v2 order (split settlement and split refund)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOrder {
    #[serde(default = "accepted")]
    pub response_status: ResponseStatus,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub order_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_enum")]
    pub order_status: Option<OrderStatus>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub operation_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub merchant_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub amount: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub reversal_amount: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub order_type: Option<String>,

    #[serde(default)]
    pub receiver: Vec<Receiver>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub error_message: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub error_code: Option<i64>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub request_id: Option<String>,
}

impl SplitOrder {
    pub fn is_success(&self) -> bool {
        self.response_status == ResponseStatus::Success
    }

    fn failure(
        error_message: Option<String>,
        error_code: Option<i64>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            response_status: ResponseStatus::Failure,
            order_id: None,
            order_status: None,
            operation_id: None,
            merchant_id: None,
            amount: None,
            reversal_amount: None,
            currency: None,
            order_type: None,
            receiver: Vec::new(),
            error_message,
            error_code,
            request_id,
        }
    }
}

// A signed v2 `data` blob only exists for accepted requests.
fn accepted() -> ResponseStatus {
    ResponseStatus::Success
}

/// Raw v2 response: either a signed `data` blob or an in-band failure
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseV2 {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub response_status: Option<ResponseStatus>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub error_code: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub request_id: Option<String>,
}

impl ResponseV2 {
    /// Parse a raw `{"response": {...}}` v2 body
    pub fn from_response_bytes(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<ResponseEnvelope<ResponseV2>>(raw).map(|env| env.response)
    }

    /// Verify and decode into a typed order.
    ///
    /// A response without `data` is an in-band failure. A `data` blob that is
    /// unsigned or whose signature does not match `secret` is rejected.
    pub fn into_split_order(self, secret: &str) -> FondyResult<SplitOrder> {
        let data = match self.data.filter(|d| !d.is_empty()) {
            Some(data) => data,
            None if self.response_status == Some(ResponseStatus::Success) => {
                return Err(FondyError::Serialization(
                    "v2 success response carries no data".to_string(),
                ))
            }
            None => {
                return Ok(SplitOrder::failure(
                    self.error_message,
                    self.error_code,
                    self.request_id,
                ))
            }
        };

        let received = self.signature.as_deref().unwrap_or_default();
        if !signature::verify_data(secret, &data, received) {
            return Err(FondyError::InvalidSignature(
                "v2 response data signature mismatch".to_string(),
            ));
        }

        #[derive(Deserialize)]
        struct Data {
            order: SplitOrder,
        }

        let raw = STANDARD
            .decode(&data)
            .map_err(|e| FondyError::Serialization(format!("invalid v2 data: {}", e)))?;
        let decoded: Data = serde_json::from_slice(&raw)?;
        Ok(decoded.order)
    }
}
