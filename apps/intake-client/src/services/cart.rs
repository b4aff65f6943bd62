//! # Cart Service
//!
//! Cart actions invoked by the basket screens.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐        │
//! │  │  Empty   │────►│ In Cart  │────►│ Summary  │────►│  Order   │        │
//! │  │  Cart    │     │          │     │ + coupon │     │ Submitted│        │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘        │
//! │                        │                                  │             │
//! │                   add_to_cart                      checkout.rs          │
//! │                   increment / decrement                   │             │
//! │                   remove                                  ▼             │
//! │                        │                            cart cleared        │
//! │                        ▼                                                │
//! │                   clear_cart ──────────► (back to empty)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every action returns the whole cart plus freshly computed totals, so the
//! UI never patches its own copy.

use intake_core::{
    AddOutcome, Cart, CartLine, Coupon, DecrementOutcome, LineKind, Money, OrderSummary,
    Product, Stock,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::{CartTotals, Session};

/// Something the UI must tell the user about an otherwise successful action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartNotice {
    /// Add was ignored because the line is already at its per-order cap.
    LimitReached { allowed: u32 },
    /// Decrement at quantity 1: ask before removing the line.
    ConfirmRemoval { id: String, kind: LineKind },
}

/// Cart response including lines, totals and the order summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub doses: Vec<CartLine>,
    pub addons: Vec<CartLine>,
    pub totals: CartTotals,
    pub summary: OrderSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<CartNotice>,
}

impl CartResponse {
    fn build(cart: &Cart, coupon: Option<&Coupon>, shipping: Money) -> Self {
        CartResponse {
            doses: cart.doses().to_vec(),
            addons: cart.addons().to_vec(),
            totals: CartTotals::from(cart),
            summary: OrderSummary::compute(cart, coupon, shipping),
            notice: None,
        }
    }

    fn with_notice(mut self, notice: CartNotice) -> Self {
        self.notice = Some(notice);
        self
    }
}

/// Runs `op` under the cart lock and builds the response from the result.
fn try_mutate<F>(session: &Session, op: F) -> ApiResult<CartResponse>
where
    F: FnOnce(&mut Cart) -> ApiResult<Option<CartNotice>>,
{
    let coupon = session.coupon().active();
    let shipping = session.shipping();

    session.cart().with_cart_mut(|cart| {
        let notice = op(cart)?;
        let response = CartResponse::build(cart, coupon.as_ref(), shipping);
        Ok(match notice {
            Some(n) => response.with_notice(n),
            None => response,
        })
    })
}

/// Gets the current cart contents.
pub fn get_cart(session: &Session) -> CartResponse {
    debug!("get_cart");
    let coupon = session.coupon().active();
    session
        .cart()
        .with_cart(|c| CartResponse::build(c, coupon.as_ref(), session.shipping()))
}

/// Adds one unit of `product`.
///
/// ## Behavior
/// - Not in cart: inserted with quantity 1
/// - In cart below its cap: quantity increases
/// - At its cap: nothing changes, reported as [`CartNotice::LimitReached`]
pub fn add_to_cart(session: &Session, product: &Product) -> CartResponse {
    debug!(product_id = %product.id, kind = %product.kind, "add_to_cart");

    let coupon = session.coupon().active();
    session.cart().with_cart_mut(|cart| {
        let outcome = cart.add_item(product);
        let response = CartResponse::build(cart, coupon.as_ref(), session.shipping());
        match outcome {
            AddOutcome::LimitReached { allowed } => {
                response.with_notice(CartNotice::LimitReached { allowed })
            }
            AddOutcome::Inserted | AddOutcome::Incremented { .. } => response,
        }
    })
}

/// Adds one unit to an existing line.
///
/// ## Errors
/// `LIMIT_EXCEEDED` at the per-order cap, `OUT_OF_STOCK` when stock is
/// exhausted, `NOT_FOUND` for an unknown line.
pub fn increment(session: &Session, id: &str, kind: LineKind) -> ApiResult<CartResponse> {
    debug!(id = %id, kind = %kind, "increment");
    try_mutate(session, |cart| {
        cart.increment_qty(id, kind)?;
        Ok(None)
    })
}

/// Takes one unit off a line, or asks for confirmation at quantity 1.
pub fn decrement(session: &Session, id: &str, kind: LineKind) -> ApiResult<CartResponse> {
    debug!(id = %id, kind = %kind, "decrement");
    try_mutate(session, |cart| {
        Ok(match cart.decrement_qty(id, kind)? {
            DecrementOutcome::Decremented { .. } => None,
            DecrementOutcome::ConfirmRemoval => Some(CartNotice::ConfirmRemoval {
                id: id.to_string(),
                kind,
            }),
        })
    })
}

/// Removes a line entirely.
pub fn remove(session: &Session, id: &str, kind: LineKind) -> ApiResult<CartResponse> {
    debug!(id = %id, kind = %kind, "remove");
    try_mutate(session, |cart| {
        cart.remove_item(id, kind)?;
        Ok(None)
    })
}

/// Replaces a line's stock with a newer reading from the API.
pub fn refresh_stock(
    session: &Session,
    id: &str,
    kind: LineKind,
    stock: Stock,
) -> ApiResult<CartResponse> {
    debug!(id = %id, kind = %kind, quantity = stock.quantity, "refresh_stock");
    try_mutate(session, |cart| {
        cart.replace_stock(id, kind, stock)?;
        Ok(None)
    })
}

/// Clears all lines from the cart. The coupon stays.
pub fn clear_cart(session: &Session) -> CartResponse {
    debug!("clear_cart");
    session.cart().clear();
    get_cart(session)
}
