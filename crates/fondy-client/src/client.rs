//! # Fondy Client
//!
//! `FondyGateway` implementation over HTTP. Every operation validates the
//! invoice, builds its field set, signs it with the key the operation
//! selects, sends it and parses the reply.
//!
//! Failure policy is the same for all operations: a gateway
//! `response_status = "failure"` is returned as `Ok` with the error message
//! on the order; only construction, network and decoding problems are `Err`.

use crate::config::{ClientOptions, FondyConfig};
use crate::manager::build_request;
use crate::transport::Transport;
use async_trait::async_trait;
use fondy_core::{
    FondyError, FondyGateway, FondyResult, InvoiceRequest, KeyKind, Operation, Order, SplitOrder,
};
use reqwest::Client;
use tracing::{info, instrument, warn};
use url::Url;

/// HTTP client for the Fondy gateway
#[derive(Debug, Clone)]
pub struct FondyClient {
    transport: Transport,
}

impl FondyClient {
    /// Create a client with its own connection pool
    pub fn new(options: ClientOptions) -> FondyResult<Self> {
        let http = options.build_http_client()?;
        Ok(Self::with_http_client(http, options))
    }

    /// Create a client over an existing `reqwest::Client` (shared pool)
    pub fn with_http_client(http: Client, options: ClientOptions) -> Self {
        Self {
            transport: Transport::new(http, options),
        }
    }

    /// Create from loaded configuration
    pub fn from_config(config: &FondyConfig) -> FondyResult<Self> {
        Self::new(config.options.clone())
    }

    pub fn options(&self) -> &ClientOptions {
        self.transport.options()
    }

    #[instrument(skip(self, invoice), fields(operation = %operation, order_id = %invoice.invoice_id))]
    async fn call_v1(&self, operation: Operation, invoice: &InvoiceRequest<'_>) -> FondyResult<Order> {
        let merchant = invoice.require_merchant()?;
        let mut request = build_request(operation, invoice, merchant)?;
        let endpoint = operation.endpoint(invoice.card_token().is_some());

        let exchange = self
            .transport
            .do_v1(
                endpoint,
                &mut request,
                operation.key_kind(),
                merchant,
                invoice.reservation_data.as_ref(),
            )
            .await?;
        let request_id = exchange.request_id.clone();
        let order = exchange.into_order()?;

        if order.is_success() {
            info!(
                %request_id,
                order_status = ?order.order_status,
                "fondy {} succeeded",
                operation
            );
        } else {
            warn!(
                %request_id,
                error_code = ?order.error_code,
                error_message = ?order.error_message,
                "fondy {} failed",
                operation
            );
        }

        Ok(order)
    }

    #[instrument(skip(self, invoice), fields(operation = %operation, order_id = %invoice.invoice_id))]
    async fn call_v2(
        &self,
        operation: Operation,
        invoice: &InvoiceRequest<'_>,
    ) -> FondyResult<SplitOrder> {
        let merchant = invoice.require_merchant()?;
        let request = build_request(operation, invoice, merchant)?;
        let endpoint = operation.endpoint(false);

        let exchange = self
            .transport
            .do_v2(endpoint, &request, operation.key_kind(), merchant)
            .await?;
        let request_id = exchange.request_id.clone();
        // v2 replies are signed with the standard key
        let order = exchange.into_split_order(merchant.secret(KeyKind::Standard)?)?;

        if order.is_success() {
            info!(%request_id, order_status = ?order.order_status, "fondy {} succeeded", operation);
        } else {
            warn!(
                %request_id,
                error_code = ?order.error_code,
                error_message = ?order.error_message,
                "fondy {} failed",
                operation
            );
        }

        Ok(order)
    }
}

#[async_trait]
impl FondyGateway for FondyClient {
    #[instrument(skip(self, invoice), fields(order_id = %invoice.invoice_id))]
    fn verification_link(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Url> {
        let operation = Operation::VerificationLink;
        let merchant = invoice.require_merchant()?;
        let mut request = build_request(operation, invoice, merchant)?;
        request.sign(merchant.secret_for(operation)?)?;

        let query = serde_urlencoded::to_string(&request).map_err(|e| {
            FondyError::Serialization(format!("cannot encode verification link: {}", e))
        })?;

        let mut url = self.transport.endpoint_url(operation.endpoint(false))?;
        url.set_query(Some(&query));
        Ok(url)
    }

    async fn status(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order> {
        self.call_v1(Operation::Status, invoice).await
    }

    async fn payment(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order> {
        self.call_v1(Operation::Payment, invoice).await
    }

    async fn hold(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order> {
        self.call_v1(Operation::Hold, invoice).await
    }

    async fn capture(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order> {
        self.call_v1(Operation::Capture, invoice).await
    }

    async fn refund(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order> {
        self.call_v1(Operation::Refund, invoice).await
    }

    async fn credit(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order> {
        self.call_v1(Operation::Credit, invoice).await
    }

    async fn split(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<SplitOrder> {
        self.call_v2(Operation::Split, invoice).await
    }

    async fn split_refund(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<SplitOrder> {
        self.call_v2(Operation::SplitRefund, invoice).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fondy_core::{FondyRequestObject, MerchantAccount};

    fn client() -> FondyClient {
        FondyClient::new(ClientOptions::default()).unwrap()
    }

    #[test]
    fn test_verification_link_is_signed_url() {
        let merchant = MerchantAccount::new("1396424", "test");
        let invoice = InvoiceRequest::generate()
            .with_merchant(&merchant)
            .with_description("Card check");

        let url = client().verification_link(&invoice).unwrap();
        assert_eq!(url.path(), "/api/checkout/redirect/");

        let request: FondyRequestObject =
            serde_urlencoded::from_str(url.query().unwrap()).unwrap();
        assert_eq!(request.order_id, invoice.order_id());
        assert_eq!(request.order_desc.as_deref(), Some("Card check"));
        assert!(request.verify("test"));
    }

    #[test]
    fn test_verification_link_requires_merchant() {
        let invoice = InvoiceRequest::generate();
        assert!(matches!(
            client().verification_link(&invoice),
            Err(FondyError::MissingMerchant)
        ));
    }

    #[tokio::test]
    async fn test_missing_merchant_fails_before_network() {
        // Unroutable base: reaching the network would surface as a Network error
        let options = ClientOptions::default()
            .with_base_url(Url::parse("http://127.0.0.1:1").unwrap());
        let client = FondyClient::new(options).unwrap();
        let invoice = InvoiceRequest::generate().with_amount(1.0);

        let err = client.hold(&invoice).await.unwrap_err();
        assert!(matches!(err, FondyError::MissingMerchant));
        assert!(err.is_construction());
    }
}
