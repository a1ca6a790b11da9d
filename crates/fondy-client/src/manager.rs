//! # Request Builders
//!
//! Maps an `InvoiceRequest` onto the field set each operation sends.
//! Builders never sign; the transport does that with the key the
//! operation selects.

use fondy_core::{
    Flag, FondyError, FondyRequestObject, FondyResult, InvoiceRequest, MerchantAccount, Operation,
    Receiver,
};

/// Amount blocked by a card verification when the invoice sets none
pub const VERIFICATION_AMOUNT: i64 = 100;

/// Verification flavour: the customer confirms with a code from the statement
pub const VERIFICATION_TYPE: &str = "code";

pub const SETTLEMENT_ORDER_TYPE: &str = "settlement";

/// Suffix of the settlement order created for a split
pub const SPLIT_ORDER_SUFFIX: &str = "_split";

fn base(invoice: &InvoiceRequest<'_>, merchant: &MerchantAccount) -> FondyRequestObject {
    FondyRequestObject::new(merchant.merchant_id(), invoice.order_id())
}

fn with_urls(mut request: FondyRequestObject, invoice: &InvoiceRequest<'_>) -> FondyRequestObject {
    request.server_callback_url = invoice.server_callback_url.as_ref().map(|u| u.to_string());
    request.response_url = invoice.response_url.as_ref().map(|u| u.to_string());
    request.lang = invoice.language.clone();
    request
}

fn receivers(invoice: &InvoiceRequest<'_>) -> FondyResult<Vec<Receiver>> {
    if invoice.receivers.is_empty() {
        return Err(FondyError::MissingField { field: "receiver" });
    }
    if let Some(bad) = invoice.receivers.iter().find(|r| r.requisites.amount <= 0) {
        return Err(FondyError::InvalidRequest(format!(
            "receiver {} has a non-positive amount",
            bad.requisites.merchant_id
        )));
    }
    Ok(invoice.receivers.clone())
}

/// Receivers must add up to the amount being split
fn split_amount(invoice: &InvoiceRequest<'_>, receivers: &[Receiver]) -> FondyResult<i64> {
    let total = receivers
        .iter()
        .try_fold(0_i64, |acc, r| acc.checked_add(r.requisites.amount))
        .ok_or_else(|| FondyError::InvalidRequest("receiver amounts overflow".to_string()))?;
    match invoice.amount {
        Some(amount) if amount != total => Err(FondyError::InvalidRequest(format!(
            "receiver amounts sum to {} but invoice amount is {}",
            total, amount
        ))),
        _ => Ok(total),
    }
}

/// Build the unsigned field set for an operation
pub fn build_request(
    operation: Operation,
    invoice: &InvoiceRequest<'_>,
    merchant: &MerchantAccount,
) -> FondyResult<FondyRequestObject> {
    let request = base(invoice, merchant);

    let request = match operation {
        Operation::Status => request,

        Operation::VerificationLink => with_urls(
            FondyRequestObject {
                amount: Some(match invoice.amount {
                    None => VERIFICATION_AMOUNT,
                    Some(_) => invoice.require_amount()?,
                }),
                currency: Some(invoice.currency),
                order_desc: Some(invoice.order_description()),
                verification: Some(Flag::Yes),
                verification_type: Some(VERIFICATION_TYPE.to_string()),
                required_rectoken: Some(Flag::Yes),
                ..request
            },
            invoice,
        ),

        Operation::Payment | Operation::Hold => {
            let token = invoice.card_token().map(str::to_string);
            with_urls(
                FondyRequestObject {
                    amount: Some(invoice.require_amount()?),
                    currency: Some(invoice.currency),
                    order_desc: Some(invoice.order_description()),
                    preauth: (operation == Operation::Hold).then_some(Flag::Yes),
                    required_rectoken: token.is_none().then_some(Flag::Yes),
                    rectoken: token,
                    ..request
                },
                invoice,
            )
        }

        Operation::Capture => FondyRequestObject {
            amount: Some(invoice.require_amount()?),
            currency: Some(invoice.currency),
            ..request
        },

        Operation::Refund => FondyRequestObject {
            amount: Some(invoice.require_amount()?),
            currency: Some(invoice.currency),
            comment: invoice.comment.clone(),
            ..request
        },

        Operation::Credit => {
            let method = invoice.payment_method.as_ref().ok_or(FondyError::MissingField {
                field: "receiver_card_number",
            })?;
            with_urls(
                FondyRequestObject {
                    amount: Some(invoice.require_amount()?),
                    currency: Some(invoice.currency),
                    order_desc: Some(invoice.order_description()),
                    receiver_rectoken: method.token().map(str::to_string),
                    receiver_card_number: method.card_number().map(str::to_string),
                    ..request
                },
                invoice,
            )
        }

        Operation::Split => {
            let receivers = receivers(invoice)?;
            let amount = split_amount(invoice, &receivers)?;
            FondyRequestObject {
                order_id: format!("{}{}", invoice.order_id(), SPLIT_ORDER_SUFFIX),
                operation_id: Some(invoice.order_id()),
                order_type: Some(SETTLEMENT_ORDER_TYPE.to_string()),
                order_desc: Some(invoice.order_description()),
                amount: Some(amount),
                currency: Some(invoice.currency),
                server_callback_url: invoice.server_callback_url.as_ref().map(|u| u.to_string()),
                receiver: receivers,
                ..request
            }
        }

        Operation::SplitRefund => {
            let receivers = receivers(invoice)?;
            let amount = split_amount(invoice, &receivers)?;
            FondyRequestObject {
                amount: Some(amount),
                currency: Some(invoice.currency),
                comment: invoice.comment.clone(),
                receiver: receivers,
                ..request
            }
        }
    };

    Ok(request)
}
