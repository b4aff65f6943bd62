//! # Coupon Service
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  user submits code                                                      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  validate shape ──✗──► VALIDATION_ERROR (inline)                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ClinicApi::validate_coupon ──✗──► error toast (message from body)      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ticket still current? ──no──► Stale (nothing applied)                  │
//! │        │ yes                                                            │
//! │        ▼                                                                │
//! │  coupon replaces the active one, summary recomputed                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use intake_core::validation::validate_coupon_code;
use intake_core::{Coupon, OrderSummary};
use tracing::{debug, info};

use super::with_timeout;
use crate::api::ClinicApi;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::scope::{Scoped, ScreenTicket};
use crate::state::Session;

pub struct CouponService<A> {
    api: A,
    timeout: Duration,
}

impl<A: ClinicApi> CouponService<A> {
    pub fn new(api: A, config: &ClientConfig) -> Self {
        CouponService {
            api,
            timeout: config.request_timeout(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Validates `code` with the API and makes it the active coupon.
    ///
    /// ## Returns
    /// - `Applied(summary)`: the coupon is active, totals recomputed
    /// - `Stale`: the screen was left while the request was in flight,
    ///   nothing changed and any failure is discarded
    ///
    /// ## Errors
    /// Malformed codes fail before any request. API failures keep the
    /// previously active coupon.
    pub async fn apply_code(
        &self,
        session: &Session,
        ticket: &ScreenTicket,
        code: &str,
    ) -> ApiResult<Scoped<OrderSummary>> {
        let code = code.trim();
        validate_coupon_code(code)?;
        debug!(code = %code, screen = ticket.screen(), "validating coupon");

        let response = with_timeout(self.timeout, self.api.validate_coupon(code)).await;

        if !ticket.is_current() {
            debug!(code = %code, ok = response.is_ok(), "coupon response arrived after screen left");
            return Ok(Scoped::Stale);
        }

        let payload = response.map_err(|failure| ApiError::from_failure(&failure))?;
        let coupon = Coupon::try_from(payload)?;

        Ok(ticket.apply(|| {
            info!(session_id = %session.id(), code = %coupon.code, "Coupon applied");
            session.apply_coupon(coupon)
        }))
    }

    /// Drops the active coupon. Local only.
    pub fn remove(&self, session: &Session) -> OrderSummary {
        session.remove_coupon()
    }
}
