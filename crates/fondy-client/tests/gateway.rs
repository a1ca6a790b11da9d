//! Gateway calls against a mock Fondy server.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use fondy_client::{ClientOptions, FondyClient};
use fondy_core::signature;
use fondy_core::{
    Currency, Flag, FondyError, FondyGateway, FondyRequestObject, InvoiceRequest,
    MerchantAccount, OrderStatus, Receiver, RequestEnvelope, RequestV2, ReservationData,
    ResponseStatus,
};
use serde_json::json;
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const KEY: &str = "test";
const CREDIT_KEY: &str = "credit-test";

fn merchant() -> MerchantAccount {
    MerchantAccount::new("1396424", KEY)
        .with_credit_key(CREDIT_KEY)
        .with_merchant_string("Test Merchant")
}

fn client_for(server: &MockServer) -> FondyClient {
    let base = Url::parse(&server.uri()).unwrap();
    FondyClient::new(ClientOptions::default().with_base_url(base)).unwrap()
}

async fn only_request(server: &MockServer) -> Request {
    let mut requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

fn v1_body(request: &Request) -> FondyRequestObject {
    serde_json::from_slice::<RequestEnvelope<FondyRequestObject>>(&request.body)
        .unwrap()
        .request
}

fn success(order_id: &str, status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "response": {
            "response_status": "success",
            "order_id": order_id,
            "order_status": status,
            "merchant_id": 1396424,
            "amount": "300",
            "currency": "UAH"
        }
    }))
}

#[tokio::test]
async fn hold_sends_signed_request_and_parses_success() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::generate()
        .with_merchant(&m)
        .with_amount(3.0)
        .with_card_token("tok_abc");

    Mock::given(method("POST"))
        .and(path("/api/recurring"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(header("x-api-version", "1.0"))
        .and(header_exists("x-request-id"))
        .and(header_exists("user-agent"))
        .respond_with(success(&invoice.order_id(), "approved"))
        .expect(1)
        .mount(&server)
        .await;

    let order = client_for(&server).hold(&invoice).await.unwrap();
    assert_eq!(order.response_status, ResponseStatus::Success);
    assert_eq!(order.order_status, Some(OrderStatus::Approved));
    assert_eq!(order.order_id, Some(invoice.order_id()));
    assert_eq!(order.error_message, None);

    // What reached the server matches what was built, and is signed
    let sent = v1_body(&only_request(&server).await);
    assert_eq!(sent.merchant_id, "1396424");
    assert_eq!(sent.order_id, invoice.order_id());
    assert_eq!(sent.amount, Some(300));
    assert_eq!(sent.currency, Some(Currency::UAH));
    assert_eq!(sent.preauth, Some(Flag::Yes));
    assert_eq!(sent.rectoken.as_deref(), Some("tok_abc"));
    assert!(sent.verify(KEY));
    assert!(!sent.verify(CREDIT_KEY));
}

#[tokio::test]
async fn hold_without_token_opens_checkout() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::generate().with_merchant(&m).with_amount(3.0);

    Mock::given(method("POST"))
        .and(path("/api/checkout/url/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "response_status": "success",
                "checkout_url": "https://pay.fondy.eu/merchants/abc/default/index.html?token=xyz"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let order = client_for(&server).hold(&invoice).await.unwrap();
    assert!(order.is_success());
    assert!(order.checkout_url.unwrap().contains("token=xyz"));
}

#[tokio::test]
async fn status_failure_is_reported_in_band() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::new(Uuid::parse_str("e427696f-4c0e-4a47-8195-a3152dcf68f7").unwrap())
        .with_merchant(&m);

    Mock::given(method("POST"))
        .and(path("/api/status/order_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "response_status": "failure",
                "error_message": "Order not found",
                "error_code": 1018,
                "request_id": "r1"
            }
        })))
        .mount(&server)
        .await;

    let order = client_for(&server).status(&invoice).await.unwrap();
    assert_eq!(order.response_status, ResponseStatus::Failure);
    assert_eq!(order.error_message.as_deref(), Some("Order not found"));
    assert_eq!(order.error_code, Some(1018));
    assert_eq!(order.order_status, None);
}

#[tokio::test]
async fn credit_is_signed_with_credit_key() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::generate()
        .with_merchant(&m)
        .with_amount(10.0)
        .with_card_number("4444555566661111");

    Mock::given(method("POST"))
        .and(path("/api/p2pcredit/"))
        .respond_with(success(&invoice.order_id(), "approved"))
        .mount(&server)
        .await;

    let order = client_for(&server).credit(&invoice).await.unwrap();
    assert!(order.is_approved());

    let sent = v1_body(&only_request(&server).await);
    assert_eq!(sent.receiver_card_number.as_deref(), Some("4444555566661111"));
    assert!(sent.verify(CREDIT_KEY));
    assert!(!sent.verify(KEY));
}

#[tokio::test]
async fn credit_without_credit_key_never_reaches_server() {
    let server = MockServer::start().await;
    let m = MerchantAccount::new("1396424", KEY);
    let invoice = InvoiceRequest::generate()
        .with_merchant(&m)
        .with_amount(10.0)
        .with_card_token("tok");

    let err = client_for(&server).credit(&invoice).await.unwrap_err();
    assert!(matches!(err, FondyError::Configuration(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn refund_and_capture_send_amounts() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::generate()
        .with_merchant(&m)
        .with_currency(Currency::USD)
        .with_amount(1.25)
        .with_comment("customer request");

    Mock::given(method("POST"))
        .and(path("/api/reverse/order_id"))
        .respond_with(success(&invoice.order_id(), "reversed"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/capture/order_id"))
        .respond_with(success(&invoice.order_id(), "approved"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let refunded = client.refund(&invoice).await.unwrap();
    assert_eq!(refunded.order_status, Some(OrderStatus::Reversed));
    let captured = client.capture(&invoice).await.unwrap();
    assert!(captured.is_approved());

    let requests = server.received_requests().await.unwrap();
    let refund = v1_body(&requests[0]);
    assert_eq!(refund.amount, Some(125));
    assert_eq!(refund.currency, Some(Currency::USD));
    assert_eq!(refund.comment.as_deref(), Some("customer request"));

    let capture = v1_body(&requests[1]);
    assert_eq!(capture.amount, Some(125));
    assert_eq!(capture.comment, None);
}

#[tokio::test]
async fn every_call_gets_a_fresh_request_id() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::generate().with_merchant(&m);

    Mock::given(method("POST"))
        .and(path("/api/status/order_id"))
        .respond_with(success(&invoice.order_id(), "processing"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.status(&invoice).await.unwrap();
    client.status(&invoice).await.unwrap();

    let ids: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| {
            r.headers
                .get("x-request-id")
                .unwrap()
                .to_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert!(Uuid::parse_str(&ids[0]).is_ok());
}

#[tokio::test]
async fn reservation_data_passes_through() {
    let server = MockServer::start().await;
    let m = merchant();
    let reservation = ReservationData {
        customer_name: Some("Ivan Petrenko".to_string()),
        account: Some("acc-42".to_string()),
        ..Default::default()
    };
    let invoice = InvoiceRequest::generate()
        .with_merchant(&m)
        .with_amount(3.0)
        .with_card_token("tok")
        .with_reservation_data(reservation.clone());

    Mock::given(method("POST"))
        .and(path("/api/recurring"))
        .respond_with(success(&invoice.order_id(), "approved"))
        .mount(&server)
        .await;

    client_for(&server).payment(&invoice).await.unwrap();

    let sent = v1_body(&only_request(&server).await);
    let encoded = sent.reservation_data.as_deref().unwrap();
    assert_eq!(ReservationData::from_base64(encoded), Some(reservation));
    assert_eq!(sent.preauth, None);
    assert!(sent.verify(KEY));
}

#[tokio::test]
async fn connection_refused_is_a_network_error() {
    let m = merchant();
    let invoice = InvoiceRequest::generate().with_merchant(&m);
    let options = ClientOptions::default().with_base_url(Url::parse("http://127.0.0.1:1").unwrap());
    let client = FondyClient::new(options).unwrap();

    let err = client.status(&invoice).await.unwrap_err();
    assert!(matches!(err, FondyError::Network(_)));
    assert!(err.is_retryable());

    let api = err.api_error().unwrap();
    assert_eq!(api.code, 0);
    assert!(api.raw_response.is_none());
    assert_eq!(
        api.request.as_ref().unwrap()["request"]["order_id"],
        invoice.order_id()
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::generate().with_merchant(&m);

    Mock::given(method("POST"))
        .and(path("/api/status/order_id"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).status(&invoice).await.unwrap_err();
    assert!(matches!(err, FondyError::Decode(_)));

    let api = err.api_error().unwrap();
    assert_eq!(api.code, 502);
    assert_eq!(
        api.raw_response_text().as_deref(),
        Some("<html>Bad Gateway</html>")
    );
}

fn signed_v2_response(order: serde_json::Value, key: &str) -> ResponseTemplate {
    let data = STANDARD.encode(json!({ "order": order }).to_string());
    let sig = signature::sign_data(key, &data);
    ResponseTemplate::new(200).set_body_json(json!({
        "response": {
            "version": "2.0",
            "data": data,
            "signature": sig
        }
    }))
}

#[tokio::test]
async fn split_sends_v2_settlement() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::generate()
        .with_merchant(&m)
        .with_receiver(Receiver::merchant("600001", 200))
        .with_receiver(Receiver::merchant("600002", 100));
    let split_id = format!("{}_split", invoice.order_id());

    Mock::given(method("POST"))
        .and(path("/api/settlement"))
        .and(header("x-api-version", "2.0"))
        .respond_with(signed_v2_response(
            json!({
                "order_id": split_id,
                "operation_id": invoice.order_id(),
                "order_status": "created",
                "response_status": "success",
                "amount": 300,
                "currency": "UAH"
            }),
            KEY,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let order = client_for(&server).split(&invoice).await.unwrap();
    assert!(order.is_success());
    assert_eq!(order.order_id.as_deref(), Some(split_id.as_str()));
    assert_eq!(order.order_status, Some(OrderStatus::Created));

    let request = only_request(&server).await;
    let sent: RequestEnvelope<RequestV2> = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(sent.request.version, "2.0");
    assert!(sent.request.verify(KEY));

    let order_sent = sent.request.decode_order().unwrap();
    assert_eq!(order_sent.order_id, split_id);
    assert_eq!(order_sent.operation_id, Some(invoice.order_id()));
    assert_eq!(order_sent.amount, Some(300));
    assert_eq!(order_sent.receiver.len(), 2);
    assert_eq!(order_sent.signature, None);
}

#[tokio::test]
async fn split_refund_failure_is_reported_in_band() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::generate()
        .with_merchant(&m)
        .with_receiver(Receiver::merchant("600001", 200));

    Mock::given(method("POST"))
        .and(path("/api/reverse/order_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "response_status": "failure",
                "error_message": "Order is not settled",
                "error_code": 1030
            }
        })))
        .mount(&server)
        .await;

    let order = client_for(&server).split_refund(&invoice).await.unwrap();
    assert_eq!(order.response_status, ResponseStatus::Failure);
    assert_eq!(order.error_message.as_deref(), Some("Order is not settled"));
}

#[tokio::test]
async fn split_rejects_forged_response() {
    let server = MockServer::start().await;
    let m = merchant();
    let invoice = InvoiceRequest::generate()
        .with_merchant(&m)
        .with_receiver(Receiver::merchant("600001", 200));

    Mock::given(method("POST"))
        .and(path("/api/settlement"))
        .respond_with(signed_v2_response(
            json!({"response_status": "success", "order_status": "approved"}),
            "not-the-merchant-key",
        ))
        .mount(&server)
        .await;

    let err = client_for(&server).split(&invoice).await.unwrap_err();
    assert!(matches!(err, FondyError::InvalidSignature(_)));
}
