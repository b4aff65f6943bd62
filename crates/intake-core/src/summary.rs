//! # Order Summary
//!
//! Derives the figures shown on the order summary screen and the payload
//! submitted at checkout.
//!
//! ```text
//! subtotal     = cart.total_amount
//! discount     = coupon.discount_for(subtotal)     (0 without a coupon)
//! final_total  = subtotal - discount + shipping
//! ```
//!
//! Nothing here is stored: the summary is recomputed from the cart and the
//! active coupon whenever either changes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::bmi::BmiSnapshot;
use crate::cart::Cart;
use crate::coupon::Coupon;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{decimal_money, LineKind};

// =============================================================================
// Order Summary
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub final_total: Money,
    pub coupon_code: Option<String>,
}

impl OrderSummary {
    /// Computes the summary for `cart` with an optional active coupon.
    pub fn compute(cart: &Cart, coupon: Option<&Coupon>, shipping: Money) -> Self {
        let subtotal = cart.total_amount();
        let discount = coupon
            .map(|c| c.discount_for(subtotal))
            .unwrap_or_else(Money::zero);

        OrderSummary {
            subtotal,
            discount,
            shipping,
            final_total: subtotal - discount + shipping,
            coupon_code: coupon.map(|c| c.code.clone()),
        }
    }

    pub fn has_coupon(&self) -> bool {
        self.coupon_code.is_some()
    }
}

/// Summary with `coupon` applied.
pub fn apply_coupon(cart: &Cart, coupon: &Coupon, shipping: Money) -> OrderSummary {
    OrderSummary::compute(cart, Some(coupon), shipping)
}

/// Summary with no coupon: `final_total = total_amount + shipping`.
pub fn without_coupon(cart: &Cart, shipping: Money) -> OrderSummary {
    OrderSummary::compute(cart, None, shipping)
}

// =============================================================================
// Checkout Payload
// =============================================================================

/// One line of the checkout payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutLine {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub qty: u32,
    #[serde(with = "decimal_money")]
    #[ts(type = "number")]
    pub price: Money,
}

/// JSON body submitted to the clinic's order endpoint.
///
/// Amounts travel as decimal numbers, which is what the API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    /// Lets the API drop a resubmitted order.
    #[ts(as = "String")]
    pub idempotency_key: Uuid,
    pub lines: Vec<CheckoutLine>,
    pub coupon_code: Option<String>,
    #[serde(with = "decimal_money")]
    #[ts(type = "number")]
    pub subtotal: Money,
    #[serde(with = "decimal_money")]
    #[ts(type = "number")]
    pub discount: Money,
    #[serde(with = "decimal_money")]
    #[ts(type = "number")]
    pub shipping: Money,
    #[serde(with = "decimal_money")]
    #[ts(type = "number")]
    pub total: Money,
    pub bmi: Option<BmiSnapshot>,
    /// Delivery postcode, already normalised.
    #[serde(default)]
    pub postcode: Option<String>,
}

impl CheckoutPayload {
    /// Builds the payload from the cart and its summary.
    ///
    /// ## Errors
    /// [`CoreError::EmptyCart`] when there is nothing to order.
    pub fn build(
        cart: &Cart,
        summary: &OrderSummary,
        bmi: Option<BmiSnapshot>,
    ) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let lines = cart
            .lines()
            .map(|l| CheckoutLine {
                id: l.id.clone(),
                kind: l.kind,
                qty: l.qty,
                price: l.price,
            })
            .collect();

        Ok(CheckoutPayload {
            idempotency_key: Uuid::new_v4(),
            lines,
            coupon_code: summary.coupon_code.clone(),
            subtotal: summary.subtotal,
            discount: summary.discount,
            shipping: summary.shipping,
            total: summary.final_total,
            bmi,
            postcode: None,
        })
    }
}
