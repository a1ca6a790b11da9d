//! # Server Callbacks
//!
//! The gateway POSTs the final order state to `server_callback_url`. The
//! body is a flat JSON object signed the same way as v1 requests, with the
//! merchant's standard key.

use fondy_core::signature;
use fondy_core::{FondyError, FondyResult, KeyKind, MerchantAccount, Order, OrderStatus};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Verify a callback body and parse it into an order.
pub fn verify_callback(payload: &[u8], merchant: &MerchantAccount) -> FondyResult<Order> {
    let fields: Map<String, Value> = serde_json::from_slice(payload).map_err(|e| {
        FondyError::InvalidRequest(format!("callback body is not a JSON object: {}", e))
    })?;

    if !fields.contains_key("signature") {
        return Err(FondyError::InvalidSignature(
            "callback carries no signature".to_string(),
        ));
    }

    if !signature::verify_fields(merchant.secret(KeyKind::Standard)?, &fields) {
        return Err(FondyError::InvalidSignature(
            "callback signature mismatch".to_string(),
        ));
    }

    let order: Order = serde_json::from_value(Value::Object(fields)).map_err(|e| {
        FondyError::InvalidRequest(format!("cannot parse callback order: {}", e))
    })?;

    debug!(order_id = ?order.order_id, order_status = ?order.order_status, "verified fondy callback");
    Ok(order)
}

/// Callback handler trait
///
/// Implement the hooks you care about; the rest log and succeed.
#[allow(unused_variables)]
pub trait CallbackHandler: Send + Sync {
    /// Payment or capture went through
    fn on_approved(&self, order: &Order) -> FondyResult<()> {
        info!("Order approved: {:?}", order.order_id);
        Ok(())
    }

    /// Card or issuer declined
    fn on_declined(&self, order: &Order) -> FondyResult<()> {
        warn!("Order declined: {:?} ({:?})", order.order_id, order.response_description);
        Ok(())
    }

    /// Funds returned to the customer
    fn on_reversed(&self, order: &Order) -> FondyResult<()> {
        info!("Order reversed: {:?}", order.order_id);
        Ok(())
    }

    /// Customer never completed the checkout
    fn on_expired(&self, order: &Order) -> FondyResult<()> {
        info!("Order expired: {:?}", order.order_id);
        Ok(())
    }

    /// Intermediate states (created, processing) and unknown ones
    fn on_pending(&self, order: &Order) -> FondyResult<()> {
        debug!("Order pending: {:?} {:?}", order.order_id, order.order_status);
        Ok(())
    }
}

/// Default handler (just logs callbacks)
pub struct LoggingCallbackHandler;

impl CallbackHandler for LoggingCallbackHandler {}

/// Dispatch a verified order to the matching handler hook
pub fn dispatch_callback(handler: &dyn CallbackHandler, order: &Order) -> FondyResult<()> {
    match order.order_status {
        Some(OrderStatus::Approved) => handler.on_approved(order),
        Some(OrderStatus::Declined) => handler.on_declined(order),
        Some(OrderStatus::Reversed) => handler.on_reversed(order),
        Some(OrderStatus::Expired) => handler.on_expired(order),
        _ => handler.on_pending(order),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn merchant() -> MerchantAccount {
        MerchantAccount::new("1396424", "test")
    }

    fn signed_callback(status: &str) -> Vec<u8> {
        let mut body = match json!({
            "order_id": "e427696f-4c0e-4a47-8195-a3152dcf68f7",
            "merchant_id": 1396424,
            "amount": "300",
            "currency": "UAH",
            "order_status": status,
            "response_status": "success",
            "masked_card": "444455XXXXXX1111",
            "rectoken": "",
            "response_signature_string": "**********|300|UAH"
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let sig = signature::sign_fields("test", &body);
        body.insert("signature".to_string(), json!(sig));
        serde_json::to_vec(&body).unwrap()
    }

    #[test]
    fn test_verify_callback() {
        let order = verify_callback(&signed_callback("approved"), &merchant()).unwrap();
        assert!(order.is_approved());
        assert_eq!(order.amount, Some(300));
    }

    #[test]
    fn test_verify_callback_wrong_key() {
        let other = MerchantAccount::new("1396424", "other");
        assert!(matches!(
            verify_callback(&signed_callback("approved"), &other),
            Err(FondyError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_verify_callback_tampered() {
        let tampered = String::from_utf8(signed_callback("approved"))
            .unwrap()
            .replace("\"300\"", "\"30000\"");
        assert!(verify_callback(tampered.as_bytes(), &merchant()).is_err());
    }

    #[test]
    fn test_verify_callback_unsigned() {
        let body = br#"{"order_id":"1","response_status":"success"}"#;
        assert!(matches!(
            verify_callback(body, &merchant()),
            Err(FondyError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_dispatch_callback() {
        struct TestHandler {
            called: AtomicBool,
        }

        impl CallbackHandler for TestHandler {
            fn on_declined(&self, _order: &Order) -> FondyResult<()> {
                self.called.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let handler = TestHandler {
            called: AtomicBool::new(false),
        };

        let order = verify_callback(&signed_callback("declined"), &merchant()).unwrap();
        dispatch_callback(&handler, &order).unwrap();

        assert!(handler.called.load(Ordering::SeqCst));
        assert!(dispatch_callback(&LoggingCallbackHandler, &order).is_ok());
    }
}
