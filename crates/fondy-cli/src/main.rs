//! # fondy
//!
//! Command-line front end for the Fondy gateway client.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export FONDY_MERCHANT_ID=1396424
//! export FONDY_MERCHANT_KEY=test
//! export FONDY_MERCHANT_CREDIT_KEY=testcredit
//!
//! fondy hold --amount 3 --card-token tok_...
//! fondy capture --invoice-id <uuid> --amount 3
//! fondy status --invoice-id <uuid>
//! ```

use clap::{Args, Parser, Subcommand};
use fondy_client::{FondyClient, FondyConfig};
use fondy_core::{Currency, FondyGateway, InvoiceRequest, Order};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "fondy", version, about = "Fondy payment gateway client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the current state of an order
    Status {
        #[arg(long)]
        invoice_id: Uuid,
    },
    /// Block funds on a card (pre-authorization)
    Hold(PaymentArgs),
    /// Charge a previously held order
    Capture(AmountArgs),
    /// Return funds of a completed order
    Refund {
        #[command(flatten)]
        amount: AmountArgs,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Pay out to a card number
    Credit {
        #[arg(long)]
        card_number: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "UAH")]
        currency: Currency,
    },
    /// Print a card verification URL
    VerificationLink {
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Debug, Args)]
struct PaymentArgs {
    /// Amount in major units
    #[arg(long)]
    amount: f64,
    #[arg(long, default_value = "UAH")]
    currency: Currency,
    /// Saved card token; without one the gateway returns a checkout URL
    #[arg(long)]
    card_token: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Debug, Args)]
struct AmountArgs {
    #[arg(long)]
    invoice_id: Uuid,
    #[arg(long)]
    amount: f64,
    #[arg(long, default_value = "UAH")]
    currency: Currency,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let config = FondyConfig::from_env()?;
    let client = FondyClient::from_config(&config)?;
    let merchant = &config.merchant;
    debug!(base_url = %client.options().base_url, "client ready");

    let order = match cli.command {
        Command::Status { invoice_id } => {
            let invoice = InvoiceRequest::new(invoice_id).with_merchant(merchant);
            client.status(&invoice).await?
        }
        Command::Hold(args) => {
            let mut invoice = InvoiceRequest::generate()
                .with_merchant(merchant)
                .with_currency(args.currency)
                .with_amount(args.amount);
            if let Some(token) = args.card_token {
                invoice = invoice.with_card_token(token);
            }
            if let Some(description) = args.description {
                invoice = invoice.with_description(description);
            }
            println!("Invoice: {}", invoice.invoice_id);
            client.hold(&invoice).await?
        }
        Command::Capture(args) => {
            let invoice = InvoiceRequest::new(args.invoice_id)
                .with_merchant(merchant)
                .with_currency(args.currency)
                .with_amount(args.amount);
            client.capture(&invoice).await?
        }
        Command::Refund { amount, comment } => {
            let mut invoice = InvoiceRequest::new(amount.invoice_id)
                .with_merchant(merchant)
                .with_currency(amount.currency)
                .with_amount(amount.amount);
            if let Some(comment) = comment {
                invoice = invoice.with_comment(comment);
            }
            client.refund(&invoice).await?
        }
        Command::Credit {
            card_number,
            amount,
            currency,
        } => {
            let invoice = InvoiceRequest::generate()
                .with_merchant(merchant)
                .with_currency(currency)
                .with_amount(amount)
                .with_card_number(card_number);
            println!("Invoice: {}", invoice.invoice_id);
            client.credit(&invoice).await?
        }
        Command::VerificationLink { description } => {
            let mut invoice = InvoiceRequest::generate().with_merchant(merchant);
            if let Some(description) = description {
                invoice = invoice.with_description(description);
            }
            println!("Invoice: {}", invoice.invoice_id);
            println!("{}", client.verification_link(&invoice)?);
            return Ok(());
        }
    };

    print_order(&order);
    Ok(())
}

fn print_order(order: &Order) {
    if !order.is_success() {
        println!(
            "Error: {} ({})",
            order.error_message.as_deref().unwrap_or("unknown"),
            order.error_code.map(|c| c.to_string()).unwrap_or_default()
        );
        return;
    }

    let status = order
        .order_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "Order ({}) status: {}",
        order.order_id.as_deref().unwrap_or("-"),
        status
    );
    if let Some(url) = &order.checkout_url {
        println!("Checkout: {}", url);
    }
    if let Some(token) = &order.rectoken {
        println!("Card token: {}", token);
    }
}
