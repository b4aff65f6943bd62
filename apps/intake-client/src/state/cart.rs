//! # Cart State
//!
//! Shared handle to the session's cart.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because the host UI may call into
//! the client from more than one thread; every mutation still happens as one
//! exclusive, synchronous step.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI Action          Service call              Cart change               │
//! │  ─────────          ────────────              ───────────               │
//! │  Select dose ─────► cart::add_to_cart() ────► add_item()                │
//! │  Tap "+" ─────────► cart::increment() ──────► increment_qty()           │
//! │  Tap "-" ─────────► cart::decrement() ──────► decrement_qty()           │
//! │  Confirm remove ──► cart::remove() ─────────► remove_item()             │
//! │  Logout ──────────► Session::end() ─────────► clear()                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use intake_core::{Cart, Money};
use serde::{Deserialize, Serialize};

/// Cart totals summary for UI responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: u32,
    pub total_amount: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total_amount: cart.total_amount(),
        }
    }
}

/// Session-owned cart handle.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing cart (e.g. restored from a snapshot).
    pub fn from_cart(cart: Cart) -> Self {
        CartState {
            cart: Arc::new(Mutex::new(cart)),
        }
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        // Cart operations check before they write, so a poisoned cart is
        // still consistent.
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }

    pub fn totals(&self) -> CartTotals {
        self.with_cart(|c| CartTotals::from(c))
    }

    pub fn clear(&self) {
        self.with_cart_mut(Cart::clear);
    }
}
