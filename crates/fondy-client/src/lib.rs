//! # fondy-client
//!
//! HTTP client for the Fondy payment gateway.
//!
//! `FondyClient` implements [`fondy_core::FondyGateway`]: holds, captures,
//! refunds, payouts, status checks, split settlements and card-verification
//! links. Each call signs its payload with the merchant key the operation
//! selects and returns the parsed gateway reply.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fondy_client::{FondyClient, FondyConfig};
//! use fondy_core::{FondyGateway, InvoiceRequest};
//!
//! // Credentials and options from environment
//! let config = FondyConfig::from_env()?;
//! let client = FondyClient::from_config(&config)?;
//!
//! let invoice = InvoiceRequest::generate()
//!     .with_merchant(&config.merchant)
//!     .with_amount(3.0);
//!
//! let order = client.hold(&invoice).await?;
//! match order.is_success() {
//!     true => println!("Order ({:?}) status: {:?}", order.order_id, order.order_status),
//!     false => println!("Error: {:?}", order.error_message),
//! }
//! ```
//!
//! ## Server Callbacks
//!
//! ```rust,ignore
//! use fondy_client::callback::{verify_callback, dispatch_callback, LoggingCallbackHandler};
//!
//! // In your callback endpoint:
//! let order = verify_callback(body, &merchant)?;
//! dispatch_callback(&LoggingCallbackHandler, &order)?;
//! ```

pub mod callback;
pub mod client;
pub mod config;
pub mod manager;
pub mod transport;

// Re-exports
pub use callback::{dispatch_callback, verify_callback, CallbackHandler, LoggingCallbackHandler};
pub use client::FondyClient;
pub use config::{ClientOptions, FondyConfig};
pub use transport::{Exchange, Transport, API_VERSION_HEADER, REQUEST_ID_HEADER};
