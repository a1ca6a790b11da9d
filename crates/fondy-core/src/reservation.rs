//! # Reservation Data
//!
//! Customer and shop context attached to a payment. The gateway receives it
//! as base64-encoded JSON and passes it through to anti-fraud checks and
//! multi-step authorization flows without interpreting it on our side.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// A product line inside reservation data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationProduct {
    pub id: String,
    pub name: String,
    /// Unit price in major units
    pub price: f64,
    pub total_amount: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonemobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cms_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cms_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ReservationProduct>,
}

impl ReservationData {
    /// Builder: add a product line
    pub fn with_product(mut self, product: ReservationProduct) -> Self {
        self.products.push(product);
        self
    }

    /// Encoded form sent in the `reservation_data` field
    pub fn base64_encoded(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Decode a `reservation_data` field
    pub fn from_base64(encoded: &str) -> Option<Self> {
        let raw = STANDARD.decode(encoded).ok()?;
        serde_json::from_slice(&raw).ok()
    }
}
