//! # Clinic API Seam
//!
//! The clinic REST API is an opaque collaborator. The client only needs two
//! calls from it here, expressed as a trait so the transport (and test
//! doubles) live outside this crate.

use std::future::Future;

use intake_core::{CheckoutPayload, CouponPayload};
use serde::{Deserialize, Serialize};

/// A non-success response, or a transport failure (`status == 0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    pub status: u16,
    pub body: String,
}

impl ApiFailure {
    /// A request that never got a response.
    pub fn transport(reason: impl Into<String>) -> Self {
        ApiFailure {
            status: 0,
            body: reason.into(),
        }
    }
}

/// Order confirmation returned by the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    #[serde(default)]
    pub status: String,
}

/// Calls made against the clinic backend.
///
/// Implementations perform exactly one request per call. Retrying is left
/// to the user.
pub trait ClinicApi: Send + Sync {
    /// `POST /coupons/validate` → `{ type, discount, code }`
    fn validate_coupon(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<CouponPayload, ApiFailure>> + Send;

    /// `POST /orders` with a [`CheckoutPayload`] body.
    fn submit_order(
        &self,
        payload: &CheckoutPayload,
    ) -> impl Future<Output = Result<OrderReceipt, ApiFailure>> + Send;
}
