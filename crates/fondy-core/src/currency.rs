//! # Currency
//!
//! Currencies accepted by the gateway. Amounts travel on the wire in the
//! smallest currency unit (kopecks, cents).

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    UAH,
    USD,
    EUR,
    GBP,
    CZK,
    PLN,
}

impl Currency {
    /// Returns the ISO 4217 currency code as sent to the gateway
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::UAH => "UAH",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CZK => "CZK",
            Currency::PLN => "PLN",
        }
    }

    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u8 {
        2
    }

    /// Convert a decimal amount to the smallest currency unit
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::UAH
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = crate::FondyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UAH" => Ok(Currency::UAH),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "CZK" => Ok(Currency::CZK),
            "PLN" => Ok(Currency::PLN),
            other => Err(crate::FondyError::InvalidRequest(format!(
                "unsupported currency: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_unit_conversion() {
        assert_eq!(Currency::UAH.to_smallest_unit(3.0), 300);
        assert_eq!(Currency::USD.to_smallest_unit(10.99), 1099);
        assert_eq!(Currency::EUR.from_smallest_unit(1250), 12.5);
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&Currency::UAH).unwrap(), "\"UAH\"");
        let parsed: Currency = serde_json::from_str("\"PLN\"").unwrap();
        assert_eq!(parsed, Currency::PLN);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert!("XYZ".parse::<Currency>().is_err());
    }
}
