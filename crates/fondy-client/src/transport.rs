//! # Transport
//!
//! One signed POST per call. The transport owns its pooled `reqwest::Client`;
//! nothing is shared between calls beyond that pool.

use crate::config::ClientOptions;
use fondy_core::{
    ApiError, ApiVersion, Endpoint, FondyError, FondyRequestObject, FondyResult, KeyKind,
    MerchantAccount, Order, RequestEnvelope, RequestV2, ReservationData, ResponseV2, SplitOrder,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
pub const API_VERSION_HEADER: &str = "X-API-Version";

const JSON: &str = "application/json";

/// A completed HTTP exchange, not yet interpreted
#[derive(Debug)]
pub struct Exchange {
    /// Correlation id sent as `X-Request-ID`
    pub request_id: String,
    pub status: StatusCode,
    pub body: Vec<u8>,
    /// Signed request as sent
    pub request: serde_json::Value,
}

impl Exchange {
    fn decode_error(&self, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> FondyError {
        FondyError::Decode(
            ApiError::new(self.status.as_u16(), "cannot decode response")
                .with_source(source)
                .with_request(self.request.clone())
                .with_raw_response(self.body.clone()),
        )
    }

    /// Interpret the body as a v1 order
    pub fn into_order(self) -> FondyResult<Order> {
        match Order::from_response_bytes(&self.body) {
            Ok(order) => Ok(order),
            Err(e) => Err(self.decode_error(e)),
        }
    }

    /// Interpret the body as a v2 order, verifying its signature
    pub fn into_split_order(self, secret: &str) -> FondyResult<SplitOrder> {
        let response = match ResponseV2::from_response_bytes(&self.body) {
            Ok(response) => response,
            Err(e) => return Err(self.decode_error(e)),
        };

        match response.into_split_order(secret) {
            Err(FondyError::Serialization(message)) => Err(self.decode_error(message)),
            other => other,
        }
    }
}

/// Gateway transport handle
#[derive(Debug, Clone)]
pub struct Transport {
    http: Client,
    options: ClientOptions,
}

impl Transport {
    pub fn new(http: Client, options: ClientOptions) -> Self {
        Self { http, options }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> FondyResult<Url> {
        endpoint.url(&self.options.base_url)
    }

    /// Sign a flat request with the selected key and send it.
    pub async fn do_v1(
        &self,
        endpoint: Endpoint,
        request: &mut FondyRequestObject,
        key: KeyKind,
        merchant: &MerchantAccount,
        reservation: Option<&ReservationData>,
    ) -> FondyResult<Exchange> {
        let request_id = Uuid::new_v4().to_string();
        let url = self.endpoint_url(endpoint)?;

        if let Some(data) = reservation {
            request.set_reservation_data(data)?;
        }

        if self.options.is_debug {
            info!(%request_id, %url, reservation = ?reservation, "fondy request");
        }

        request.sign(merchant.secret(key)?)?;

        let envelope = RequestEnvelope::new(&*request);
        let snapshot = serde_json::to_value(&envelope)?;

        self.send(url, ApiVersion::V1, request_id, snapshot).await
    }

    /// Encode an order as a v2 `data` blob, sign it and send it.
    pub async fn do_v2(
        &self,
        endpoint: Endpoint,
        order: &FondyRequestObject,
        key: KeyKind,
        merchant: &MerchantAccount,
    ) -> FondyResult<Exchange> {
        let request_id = Uuid::new_v4().to_string();
        let url = self.endpoint_url(endpoint)?;

        if self.options.is_debug {
            info!(%request_id, %url, "fondy v2 request");
        }

        let signed = RequestV2::sign(order, merchant.secret(key)?)?;
        let snapshot = serde_json::to_value(RequestEnvelope::new(signed))?;

        self.send(url, ApiVersion::V2, request_id, snapshot).await
    }

    async fn send(
        &self,
        url: Url,
        version: ApiVersion,
        request_id: String,
        snapshot: serde_json::Value,
    ) -> FondyResult<Exchange> {
        let body = serde_json::to_vec(&snapshot)?;

        if self.options.is_debug {
            info!(%request_id, body = %String::from_utf8_lossy(&body), "fondy request body");
        } else {
            debug!(%request_id, %url, "sending fondy request");
        }

        let response = self
            .http
            .post(url)
            .header(USER_AGENT, &self.options.user_agent)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .header(REQUEST_ID_HEADER, &request_id)
            .header(API_VERSION_HEADER, version.as_str())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(%request_id, error = %e, "fondy request failed");
                FondyError::Network(
                    ApiError::new(0, "cannot send request")
                        .with_source(e)
                        .with_request(snapshot.clone()),
                )
            })?;

        let status = response.status();
        let raw = response.bytes().await.map_err(|e| {
            FondyError::Network(
                ApiError::new(status.as_u16(), "cannot read response")
                    .with_source(e)
                    .with_request(snapshot.clone()),
            )
        })?;

        if self.options.is_debug {
            info!(%request_id, %status, body = %String::from_utf8_lossy(&raw), "fondy response");
        }
        if !status.is_success() {
            warn!(%request_id, %status, "fondy returned non-success HTTP status");
        }

        Ok(Exchange {
            request_id,
            status,
            body: raw.to_vec(),
            request: snapshot,
        })
    }
}
