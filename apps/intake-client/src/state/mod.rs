//! # State Module
//!
//! Client stores, owned by a [`Session`] rather than living as globals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │                         ┌──────────────┐                                │
//! │                         │   Session    │  start() / end()               │
//! │                         └──────┬───────┘                                │
//! │          ┌─────────────────────┼─────────────────────┐                  │
//! │          ▼                     ▼                     ▼                  │
//! │  ┌──────────────┐     ┌──────────────┐     ┌──────────────┐             │
//! │  │  CartState   │     │ CouponState  │     │   BmiState   │             │
//! │  │  Arc<Mutex<  │     │  Arc<Mutex<  │     │  Arc<Mutex<  │             │
//! │  │    Cart>>    │     │ Option<..>>> │     │  BmiMeas..>> │             │
//! │  └──────────────┘     └──────────────┘     └──────────────┘             │
//! │                                                                         │
//! │  Store handles are cheap clones sharing one value.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod bmi;
mod cart;
mod coupon;
mod session;

pub use bmi::BmiState;
pub use cart::{CartState, CartTotals};
pub use coupon::CouponState;
pub use session::Session;
