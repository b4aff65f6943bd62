//! # Intake Client
//!
//! Client-side orchestration for the clinic's ordering flow: session-owned
//! stores, the cart/coupon/checkout services, and the guard that keeps late
//! API responses from touching screens the user has already left.
//!
//! ## Module Organization
//! ```text
//! intake_client/
//! ├── lib.rs          ◄─── You are here (exports, tracing setup)
//! ├── config.rs       ◄─── ClientConfig (defaults → TOML → env)
//! ├── error.rs        ◄─── ApiError / ErrorCode for the UI, ClientError
//! ├── api.rs          ◄─── ClinicApi trait (transport lives elsewhere)
//! ├── scope.rs        ◄─── ScreenScope / ScreenTicket stale-result guard
//! ├── persist.rs      ◄─── SessionSnapshot on disk
//! ├── state/
//! │   ├── session.rs  ◄─── Session: start() / end(), product switch
//! │   ├── cart.rs     ◄─── CartState
//! │   ├── coupon.rs   ◄─── CouponState
//! │   └── bmi.rs      ◄─── BmiState
//! └── services/
//!     ├── cart.rs     ◄─── add / increment / decrement / remove
//!     ├── coupon.rs   ◄─── CouponService
//!     └── checkout.rs ◄─── CheckoutService
//! ```
//!
//! ## Typical Flow
//! ```rust,ignore
//! intake_client::init_tracing();
//! let config = ClientConfig::load_or_default(None);
//! let mut session = Session::start(&config);
//!
//! session.switch_product("mounjaro");
//! services::cart::add_to_cart(&session, &dose);
//!
//! let scope = ScreenScope::new("coupon");
//! let ticket = scope.enter();
//! coupons.apply_code(&session, &ticket, "WELCOME10").await?;
//!
//! session.end();
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod persist;
pub mod scope;
pub mod services;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use api::{ApiFailure, ClinicApi, OrderReceipt};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, ClientError, ClientResult, ErrorCode};
pub use persist::SessionSnapshot;
pub use scope::{ScreenScope, ScreenTicket, Scoped};
pub use services::{CheckoutService, CouponService};
pub use state::{BmiState, CartState, CouponState, Session};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=intake=trace` - Show trace for intake crates only
/// - Default: `info,intake=debug`
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,intake=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
