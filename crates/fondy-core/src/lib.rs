//! # fondy-core
//!
//! Core types for the Fondy payment gateway client.
//!
//! This crate provides:
//! - `MerchantAccount` and the `Operation`/`KeyKind` tags that pick a secret
//! - `InvoiceRequest` and the signed wire object `FondyRequestObject`
//! - the `signature` module (canonical field ordering, SHA-1 digests)
//! - `Order` / `SplitOrder` response models
//! - `FondyGateway` trait implemented by the HTTP client
//! - `FondyError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use fondy_core::{InvoiceRequest, MerchantAccount, FondyGateway};
//!
//! let merchant = MerchantAccount::new("1396424", "test");
//! let invoice = InvoiceRequest::generate()
//!     .with_merchant(&merchant)
//!     .with_amount(3.0);
//!
//! let order = gateway.hold(&invoice).await?;
//! if order.is_success() {
//!     println!("hold {:?}: {:?}", order.order_id, order.order_status);
//! } else {
//!     println!("declined: {:?}", order.error_message);
//! }
//! ```

pub mod account;
pub mod currency;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod order;
pub mod request;
pub mod reservation;
pub mod signature;

// Re-exports for convenience
pub use account::{KeyKind, MerchantAccount, Operation};
pub use currency::Currency;
pub use endpoint::{default_base_url, ApiVersion, Endpoint, DEFAULT_BASE_URL};
pub use error::{ApiError, FondyError, FondyResult};
pub use gateway::{BoxedFondyGateway, FondyGateway};
pub use order::{Order, OrderStatus, ResponseEnvelope, ResponseStatus, ResponseV2, SplitOrder};
pub use request::{
    Flag, FondyRequestObject, InvoiceRequest, PaymentMethod, Receiver, ReceiverType,
    RequestEnvelope, RequestV2, Requisites,
};
pub use reservation::{ReservationData, ReservationProduct};
