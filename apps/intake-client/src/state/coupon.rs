//! # Coupon State
//!
//! Holds at most one active coupon. Applying replaces, never stacks.

use std::sync::{Arc, Mutex, PoisonError};

use intake_core::Coupon;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct CouponState {
    active: Arc<Mutex<Option<Coupon>>>,
}

impl CouponState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_coupon(coupon: Option<Coupon>) -> Self {
        CouponState {
            active: Arc::new(Mutex::new(coupon)),
        }
    }

    /// Makes `coupon` the active one and returns the coupon it replaced.
    pub fn apply(&self, coupon: Coupon) -> Option<Coupon> {
        debug!(code = %coupon.code, "applying coupon");
        self.lock().replace(coupon)
    }

    /// Removes the active coupon, if any.
    pub fn clear(&self) -> Option<Coupon> {
        self.lock().take()
    }

    /// Removes the active coupon only if it is the one named `code`.
    pub fn clear_if_code(&self, code: &str) -> Option<Coupon> {
        let mut active = self.lock();
        if active.as_ref().is_some_and(|c| c.code == code) {
            active.take()
        } else {
            None
        }
    }

    pub fn active(&self) -> Option<Coupon> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Coupon>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
