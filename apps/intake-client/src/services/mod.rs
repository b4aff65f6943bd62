//! # Services Module
//!
//! Actions the screens invoke. Each takes the [`Session`] it acts on.
//!
//! ```text
//! services/
//! ├── mod.rs       ◄─── You are here (exports, request timeout)
//! ├── cart.rs      ◄─── Basket manipulation (sync)
//! ├── coupon.rs    ◄─── Coupon validation via the API (async, scoped)
//! └── checkout.rs  ◄─── Order submission (async, scoped)
//! ```
//!
//! Async services take a [`ScreenTicket`] issued when the request started.
//! Their results are applied only while that ticket is current.
//!
//! [`Session`]: crate::state::Session
//! [`ScreenTicket`]: crate::scope::ScreenTicket

pub mod cart;
pub mod checkout;
pub mod coupon;

pub use checkout::CheckoutService;
pub use coupon::CouponService;

use std::future::Future;
use std::time::Duration;

use crate::api::ApiFailure;

/// Awaits `request`, turning an elapsed `limit` into a transport failure.
async fn with_timeout<T, F>(limit: Duration, request: F) -> Result<T, ApiFailure>
where
    F: Future<Output = Result<T, ApiFailure>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_secs = limit.as_secs(), "API request timed out");
            Err(ApiFailure::transport("The request timed out. Please try again."))
        }
    }
}
