//! # Gateway Trait
//!
//! The operations a Fondy client exposes. Each call is a fixed pipeline:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────┐   ┌───────────┐   ┌───────┐
//! │InvoiceRequest│──▶│ build fields │──▶│ sign │──▶│ transport │──▶│ parse │
//! └──────────────┘   └──────────────┘   └──────┘   └───────────┘   └───────┘
//! ```
//!
//! Declined or failed transactions come back as `Ok` with
//! `response_status == Failure`; `Err` means the exchange itself failed.

use crate::error::FondyResult;
use crate::order::{Order, SplitOrder};
use crate::request::InvoiceRequest;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

#[async_trait]
pub trait FondyGateway: Send + Sync {
    /// Signed hosted-checkout link that verifies a card. No network call.
    fn verification_link(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Url>;

    /// Current state of an order
    async fn status(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order>;

    /// Immediate charge
    async fn payment(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order>;

    /// Pre-authorization (funds blocked until capture or reversal)
    async fn hold(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order>;

    /// Capture a previous hold
    async fn capture(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order>;

    /// Reverse a payment, fully or partially
    async fn refund(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order>;

    /// Payout to a card, signed with the credit key
    async fn credit(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<Order>;

    /// Distribute a paid order between receivers
    async fn split(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<SplitOrder>;

    /// Reverse the split shares of a paid order
    async fn split_refund(&self, invoice: &InvoiceRequest<'_>) -> FondyResult<SplitOrder>;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedFondyGateway = Arc<dyn FondyGateway>;
