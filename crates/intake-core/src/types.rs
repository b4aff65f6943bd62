//! # Domain Types
//!
//! Shared types consumed from, and emitted to, the clinic API.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Stock       │   │  DiscountRate   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, kind       │   │  status         │   │  bps (u32)      │       │
//! │  │  name, price    │   │  quantity       │   │  1000 = 10%     │       │
//! │  │  allowed        │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    LineKind     │   │  StockStatus    │                             │
//! │  │  Dose | Addon   │   │  InStock        │                             │
//! │  └─────────────────┘   │  OutOfStock     │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Percentage rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so fractional coupon percentages such as 12.5%
/// stay exact (1250 bps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a percentage as sent by the API (`10`, `12.5`).
    /// Negative inputs clamp to zero.
    pub fn from_percentage(pct: f64) -> Self {
        DiscountRate((pct * 100.0).round().max(0.0) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }
}

// =============================================================================
// Line Kind
// =============================================================================

/// Which list of the cart a line lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// A medication dose.
    #[default]
    Dose,
    /// A supplementary item such as needles.
    Addon,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineKind::Dose => write!(f, "dose"),
            LineKind::Addon => write!(f, "addon"),
        }
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Stock status reported by the clinic API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
}

/// Stock snapshot attached to a product: `{ "status": ..., "quantity": ... }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Stock {
    pub status: StockStatus,
    pub quantity: u32,
}

impl Stock {
    pub const fn in_stock(quantity: u32) -> Self {
        Stock {
            status: StockStatus::InStock,
            quantity,
        }
    }

    pub const fn out_of_stock() -> Self {
        Stock {
            status: StockStatus::OutOfStock,
            quantity: 0,
        }
    }

    /// Whether a line could hold `qty` units with this stock.
    pub fn covers(&self, qty: u32) -> bool {
        self.status == StockStatus::InStock && qty <= self.quantity
    }
}

// =============================================================================
// Product
// =============================================================================

/// A purchasable dose or addon as described by the clinic API.
///
/// ## JSON Shape
/// ```json
/// { "id": "dose-2-5mg", "type": "dose", "name": "2.5mg",
///   "price": 149.0, "allowed": 2,
///   "stock": { "status": "in_stock", "quantity": 10 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: LineKind,

    #[serde(default)]
    pub name: String,

    /// Unit price; a decimal number on the wire.
    #[serde(with = "decimal_money")]
    #[ts(type = "number")]
    pub price: Money,

    /// Per-order quantity cap.
    pub allowed: u32,

    #[serde(default)]
    pub stock: Stock,
}

/// Serde adapter for money fields that travel as decimal JSON numbers.
pub mod decimal_money {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::money::Money;

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Ok(Money::from_decimal(amount))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
