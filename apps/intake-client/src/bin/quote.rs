//! # Basket Quote
//!
//! Replays a basket file through a fresh session and prints the order
//! summary the app would show. Quantities go through the same "+" path as
//! the app, so per-order caps and stock both apply; the first refusal stops
//! the quote.
//!
//! ## Usage
//! ```bash
//! cargo run -p intake-client --bin quote -- basket.json
//! cargo run -p intake-client --bin quote -- basket.json --config ./client.toml --json
//! ```
//!
//! ## Basket File
//! ```json
//! {
//!   "product": "mounjaro",
//!   "items": [
//!     { "product": { "id": "5mg", "type": "dose", "name": "5mg pen",
//!                    "price": 159.99, "allowed": 2,
//!                    "stock": { "status": "in_stock", "quantity": 4 } },
//!       "qty": 1 }
//!   ],
//!   "coupon": { "type": "percent", "discount": 10, "code": "WELCOME10" }
//! }
//! ```

use std::env;
use std::path::PathBuf;

use intake_client::services::cart::{self, CartNotice};
use intake_client::{ApiResult, ClientConfig, ErrorCode, Session};
use intake_core::validation::validate_quantity;
use intake_core::{CoreError, Coupon, CouponPayload, Product};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct Basket {
    #[serde(default)]
    product: Option<String>,
    items: Vec<BasketItem>,
    #[serde(default)]
    coupon: Option<CouponPayload>,
}

#[derive(Debug, Deserialize)]
struct BasketItem {
    product: Product,
    #[serde(default = "one")]
    qty: u32,
}

fn one() -> u32 {
    1
}

/// Adds every basket item unit by unit. The first unit of a new line is an
/// add; the rest are increments, which check the cap and stock.
fn fill_cart(session: &Session, items: &[BasketItem]) -> ApiResult<()> {
    for item in items {
        validate_quantity(item.qty)?;
        let product = &item.product;

        for _ in 0..item.qty {
            let present = session
                .cart()
                .with_cart(|c| c.line(&product.id, product.kind).is_some());

            if present {
                cart::increment(session, &product.id, product.kind)?;
            } else if let Some(CartNotice::LimitReached { allowed }) =
                cart::add_to_cart(session, product).notice
            {
                return Err(CoreError::LimitExceeded {
                    name: product.name.clone(),
                    allowed,
                }
                .into());
            }
        }
    }
    Ok(())
}

fn print_help() {
    println!("Clinic basket quote");
    println!();
    println!("Usage: quote <BASKET.json> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>  Client config file (default: platform config dir)");
    println!("      --json           Print the full cart response as JSON");
    println!("  -h, --help           Show this help message");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    intake_client::init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut basket_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--json" => json = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => basket_path = Some(PathBuf::from(other)),
        }
        i += 1;
    }

    let Some(basket_path) = basket_path else {
        print_help();
        return Err("missing basket file".into());
    };

    let config = ClientConfig::load(config_path)?;
    let basket: Basket = serde_json::from_str(&std::fs::read_to_string(&basket_path)?)?;

    let mut session = Session::start(&config);
    if let Some(product) = basket.product {
        session.switch_product(product);
    }

    if let Err(err) = fill_cart(&session, &basket.items) {
        match err.code {
            ErrorCode::LimitExceeded => warn!(message = %err.message, "Quantity capped"),
            ErrorCode::OutOfStock => warn!(message = %err.message, "Not enough stock"),
            code => warn!(?code, message = %err.message, "Basket rejected"),
        }
        session.end();
        return Err(err.message.into());
    }

    if let Some(payload) = basket.coupon {
        session.apply_coupon(Coupon::try_from(payload)?);
    }

    let response = cart::get_cart(&session);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        for line in response.doses.iter().chain(&response.addons) {
            println!(
                "{:<24} x{:<3} {:>10}",
                line.name,
                line.qty,
                config.format_currency(line.total_price)
            );
        }
        let summary = &response.summary;
        println!("{:<29} {:>10}", "Subtotal", config.format_currency(summary.subtotal));
        if let Some(code) = &summary.coupon_code {
            println!(
                "{:<29} {:>10}",
                format!("Coupon {}", code),
                config.format_currency(-summary.discount)
            );
        }
        println!("{:<29} {:>10}", "Shipping", config.format_currency(summary.shipping));
        println!("{:<29} {:>10}", "Total", config.format_currency(summary.final_total));
    }

    session.end();
    Ok(())
}
