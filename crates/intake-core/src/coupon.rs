//! # Coupon Module
//!
//! Discount descriptors and how much they take off a cart total.
//!
//! ## Discount Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Percent 10%   on £100.00  →  discount £10.00                          │
//! │  Fixed £15.00  on £100.00  →  discount £15.00                          │
//! │                                                                         │
//! │  Only one coupon is active at a time. Applying another replaces it.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::DiscountRate;
use crate::validation::validate_coupon_code;

/// Largest percentage a coupon may carry.
pub const MAX_PERCENT_BPS: u32 = 10_000;

// =============================================================================
// Coupon
// =============================================================================

/// How a coupon reduces the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// A share of the cart total.
    Percent(DiscountRate),
    /// A flat amount. Not capped at the cart total.
    Fixed(Money),
}

/// A validated, active coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    pub code: String,
    pub discount: Discount,
}

impl Coupon {
    pub fn percent(code: impl Into<String>, rate: DiscountRate) -> Self {
        Coupon {
            code: code.into(),
            discount: Discount::Percent(rate),
        }
    }

    pub fn fixed(code: impl Into<String>, amount: Money) -> Self {
        Coupon {
            code: code.into(),
            discount: Discount::Fixed(amount),
        }
    }

    /// Amount this coupon takes off `total`.
    pub fn discount_for(&self, total: Money) -> Money {
        match self.discount {
            Discount::Percent(rate) => total.percentage_of(rate),
            Discount::Fixed(amount) => amount,
        }
    }
}

// =============================================================================
// API Descriptor
// =============================================================================

/// Discount type as spelled by the clinic API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CouponType {
    #[serde(alias = "percentage")]
    Percent,
    #[serde(alias = "amount")]
    Fixed,
}

/// Coupon as returned by the validation endpoint:
/// `{ "type": "percent", "discount": 10, "code": "WELCOME10" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponPayload {
    #[serde(rename = "type")]
    pub kind: CouponType,
    pub discount: f64,
    pub code: String,
}

impl TryFrom<CouponPayload> for Coupon {
    type Error = CoreError;

    fn try_from(payload: CouponPayload) -> CoreResult<Self> {
        validate_coupon_code(&payload.code)?;

        let invalid = |reason: &str| CoreError::InvalidCoupon {
            code: payload.code.clone(),
            reason: reason.to_string(),
        };

        if !payload.discount.is_finite() || payload.discount < 0.0 {
            return Err(invalid("discount must be a non-negative number"));
        }

        let discount = match payload.kind {
            CouponType::Percent => {
                let rate = DiscountRate::from_percentage(payload.discount);
                if rate.bps() > MAX_PERCENT_BPS {
                    return Err(invalid("percentage cannot exceed 100"));
                }
                Discount::Percent(rate)
            }
            CouponType::Fixed => Discount::Fixed(Money::from_decimal(payload.discount)),
        };

        Ok(Coupon {
            code: payload.code.trim().to_string(),
            discount,
        })
    }
}
