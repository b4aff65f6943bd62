//! # Checkout Service
//!
//! Submits the basket as an order. On success the ordered quantities and
//! the coupon used are taken out of the session even if the checkout screen
//! was left meanwhile; the ticket only decides whether the receipt is shown.
//! Anything added while the order was in flight stays in the cart.

use std::time::Duration;

use intake_core::{CheckoutPayload, OrderSummary};
use tracing::{debug, info, warn};

use super::with_timeout;
use crate::api::{ClinicApi, OrderReceipt};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::scope::{Scoped, ScreenTicket};
use crate::state::Session;

pub struct CheckoutService<A> {
    api: A,
    timeout: Duration,
}

impl<A: ClinicApi> CheckoutService<A> {
    pub fn new(api: A, config: &ClientConfig) -> Self {
        CheckoutService {
            api,
            timeout: config.request_timeout(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Builds the order payload from the session without sending it.
    ///
    /// The BMI record is attached once both height and weight are known.
    /// Totals and lines are read under one cart lock, so they always agree.
    pub fn prepare(&self, session: &Session) -> ApiResult<CheckoutPayload> {
        let coupon = session.coupon().active();
        let bmi = session.bmi().snapshot();
        let bmi = (bmi.bmi > 0.0).then_some(bmi);

        let mut payload = session.cart().with_cart(|cart| {
            let summary = OrderSummary::compute(cart, coupon.as_ref(), session.shipping());
            CheckoutPayload::build(cart, &summary, bmi)
        })?;
        payload.postcode = session.postcode().map(str::to_string);
        Ok(payload)
    }

    /// Submits the order.
    ///
    /// ## Errors
    /// `EMPTY_CART` before any request; API failures leave the cart as it was.
    pub async fn submit(
        &self,
        session: &Session,
        ticket: &ScreenTicket,
    ) -> ApiResult<Scoped<OrderReceipt>> {
        let payload = self.prepare(session)?;
        info!(
            session_id = %session.id(),
            idempotency_key = %payload.idempotency_key,
            lines = payload.lines.len(),
            total = %payload.total,
            "Submitting order"
        );

        let response = with_timeout(self.timeout, self.api.submit_order(&payload)).await;

        match response {
            Ok(receipt) => {
                settle(session, &payload);
                info!(session_id = %session.id(), order_id = %receipt.order_id, "Order placed");
                Ok(ticket.apply(|| receipt))
            }
            Err(failure) if !ticket.is_current() => {
                debug!(status = failure.status, "order failure arrived after screen left");
                Ok(Scoped::Stale)
            }
            Err(failure) => {
                warn!(status = failure.status, "Order submission failed");
                Err(ApiError::from_failure(&failure))
            }
        }
    }
}

/// Takes what `payload` ordered out of the session.
fn settle(session: &Session, payload: &CheckoutPayload) {
    let left = session.cart().with_cart_mut(|cart| {
        for line in &payload.lines {
            cart.take_ordered(&line.id, line.kind, line.qty);
        }
        cart.total_quantity()
    });
    if let Some(code) = &payload.coupon_code {
        session.coupon().clear_if_code(code);
    }
    if left > 0 {
        debug!(session_id = %session.id(), left, "Units added during checkout kept");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiFailure;
    use crate::error::ErrorCode;
    use crate::scope::ScreenScope;
    use intake_core::{CouponPayload, LineKind, Money, Product, Stock};

    struct OrderApi;

    impl ClinicApi for OrderApi {
        async fn validate_coupon(&self, _code: &str) -> Result<CouponPayload, ApiFailure> {
            Err(ApiFailure::transport("unused"))
        }

        async fn submit_order(&self, payload: &CheckoutPayload) -> Result<OrderReceipt, ApiFailure> {
            Ok(OrderReceipt {
                order_id: format!("ord-{}", payload.lines.len()),
                status: "pending".to_string(),
            })
        }
    }

    fn needles() -> Product {
        Product {
            id: "needles".to_string(),
            kind: LineKind::Addon,
            name: "Needles".to_string(),
            price: Money::from_pence(499),
            allowed: 3,
            stock: Stock::in_stock(10),
        }
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let service = CheckoutService::new(OrderApi, &ClientConfig::default());
        let session = Session::start(&ClientConfig::default());
        let ticket = ScreenScope::new("checkout").enter();

        let err = service.submit(&session, &ticket).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[tokio::test]
    async fn test_success_clears_cart() {
        let service = CheckoutService::new(OrderApi, &ClientConfig::default());
        let session = Session::start(&ClientConfig::default());
        session.cart().with_cart_mut(|c| c.add_item(&needles()));
        let ticket = ScreenScope::new("checkout").enter();

        let receipt = service.submit(&session, &ticket).await.unwrap().applied().unwrap();
        assert_eq!(receipt.order_id, "ord-1");
        assert!(session.cart().totals().total_amount.is_zero());
    }

    #[test]
    fn test_prepare_attaches_bmi_when_known() {
        let service = CheckoutService::new(OrderApi, &ClientConfig::default());
        let session = Session::start(&ClientConfig::default());
        session.cart().with_cart_mut(|c| c.add_item(&needles()));

        assert!(service.prepare(&session).unwrap().bmi.is_none());

        session.bmi().set_height_cm(170.0).unwrap();
        session.bmi().set_weight_kg(70.0).unwrap();
        let payload = service.prepare(&session).unwrap();
        assert_eq!(payload.bmi.map(|b| b.bmi), Some(24.2));
    }

    #[test]
    fn test_prepare_totals_match_lines() {
        let service = CheckoutService::new(OrderApi, &ClientConfig::default());
        let mut session = Session::start(&ClientConfig::default());
        session.cart().with_cart_mut(|c| {
            c.add_item(&needles());
            c.add_item(&needles())
        });
        session.coupon().apply(intake_core::Coupon::fixed("FIVER", Money::from_pence(100)));
        session.set_postcode("ec1a1bb").unwrap();

        let payload = service.prepare(&session).unwrap();
        let lines: Money = payload.lines.iter().map(|l| l.price * l.qty).sum();
        assert_eq!(payload.subtotal, lines);
        assert_eq!(payload.total, payload.subtotal - payload.discount + payload.shipping);
        assert_eq!(payload.coupon_code.as_deref(), Some("FIVER"));
        assert_eq!(payload.postcode.as_deref(), Some("EC1A 1BB"));
    }
}
