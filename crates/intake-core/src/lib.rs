//! # intake-core: Pure Business Logic for the Clinic Intake Flow
//!
//! Everything the intake and checkout screens compute, as pure functions
//! and plain data with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Intake Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile frontend                              │   │
//! │  │   BMI ──► Questionnaires ──► Dose select ──► Cart ──► Checkout  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    intake-client                                │   │
//! │  │   Session stores, screen scopes, API services                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ intake-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌────────┐ ┌─────────┐ ┌────────────┐  │   │
//! │  │   │  bmi   │ │  cart  │ │ coupon │ │ summary │ │ validation │  │   │
//! │  │   └────────┘ └────────┘ └────────┘ └─────────┘ └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO GLOBAL STATE                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`bmi`] - Metric/imperial conversion, BMI and its category
//! - [`cart`] - Dose/addon cart with quantity caps and running totals
//! - [`coupon`] - Percent/fixed coupons
//! - [`summary`] - Order summary and checkout payload
//! - [`money`] - Money type with integer arithmetic
//! - [`types`] - Product, stock and rate types shared with the API
//! - [`validation`] - Form input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use intake_core::{Cart, Coupon, DiscountRate, LineKind, Money, Product, Stock};
//! use intake_core::summary::apply_coupon;
//!
//! let mut cart = Cart::new();
//! cart.add_item(&Product {
//!     id: "dose-5mg".to_string(),
//!     kind: LineKind::Dose,
//!     name: "5mg".to_string(),
//!     price: Money::from_pence(10000),
//!     allowed: 2,
//!     stock: Stock::in_stock(4),
//! });
//!
//! let coupon = Coupon::percent("WELCOME10", DiscountRate::from_bps(1000));
//! let summary = apply_coupon(&cart, &coupon, Money::from_pence(500));
//! assert_eq!(summary.final_total.pence(), 9500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bmi;
pub mod cart;
pub mod coupon;
pub mod error;
pub mod money;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use bmi::{BmiLevel, BmiMeasurement, BmiSnapshot, UnitSystem};
pub use cart::{AddOutcome, Cart, CartLine, DecrementOutcome};
pub use coupon::{Coupon, CouponPayload, CouponType, Discount};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use summary::{CheckoutPayload, OrderSummary};
pub use types::*;
