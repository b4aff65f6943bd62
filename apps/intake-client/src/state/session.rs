//! # Session
//!
//! Owns every client store between login and logout.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login ──► Session::start()                                             │
//! │              ├── CartState    (empty)                                   │
//! │              ├── CouponState  (none)                                    │
//! │              └── BmiState     (unset)                                   │
//! │                                                                         │
//! │  switch product ──► cart + coupon cleared                               │
//! │                                                                         │
//! │  logout ──► Session::end()  ──► every store cleared                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use intake_core::validation::normalize_postcode;
use intake_core::{Cart, Coupon, Money, OrderSummary};
use tracing::info;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::state::{BmiState, CartState, CouponState};

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    shipping: Money,
    product: Option<String>,
    postcode: Option<String>,
    cart: CartState,
    coupon: CouponState,
    bmi: BmiState,
}

impl Session {
    /// Starts a fresh session with empty stores.
    pub fn start(config: &ClientConfig) -> Self {
        let session = Session::with_stores(
            Uuid::new_v4(),
            config.shipping(),
            CartState::new(),
            CouponState::new(),
            BmiState::new(),
        );
        info!(session_id = %session.id, shipping = %session.shipping, "Session started");
        session
    }

    pub(crate) fn with_stores(
        id: Uuid,
        shipping: Money,
        cart: CartState,
        coupon: CouponState,
        bmi: BmiState,
    ) -> Self {
        Session {
            id,
            started_at: Utc::now(),
            shipping,
            product: None,
            postcode: None,
            cart,
            coupon,
            bmi,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn shipping(&self) -> Money {
        self.shipping
    }

    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    pub fn coupon(&self) -> &CouponState {
        &self.coupon
    }

    pub fn bmi(&self) -> &BmiState {
        &self.bmi
    }

    /// The treatment currently being ordered.
    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    /// Selects the treatment being ordered.
    ///
    /// Moving to a different treatment empties the cart and drops the coupon.
    /// Returns `true` when that happened.
    pub fn switch_product(&mut self, product_id: impl Into<String>) -> bool {
        let product_id = product_id.into();
        let changed = matches!(&self.product, Some(current) if *current != product_id);

        if changed {
            info!(
                session_id = %self.id,
                from = self.product.as_deref().unwrap_or_default(),
                to = %product_id,
                "Product switched, clearing cart and coupon"
            );
            self.cart.clear();
            self.coupon.clear();
        }

        self.product = Some(product_id);
        changed
    }

    /// Delivery postcode in normalised form.
    pub fn postcode(&self) -> Option<&str> {
        self.postcode.as_deref()
    }

    /// Sets the delivery postcode after checking its shape.
    ///
    /// ## Errors
    /// `VALIDATION_ERROR` when `raw` is not a UK postcode; the previous
    /// postcode is kept.
    pub fn set_postcode(&mut self, raw: &str) -> ApiResult<&str> {
        let postcode = normalize_postcode(raw)?;
        info!(session_id = %self.id, %postcode, "Delivery postcode set");
        Ok(self.postcode.insert(postcode).as_str())
    }

    /// Totals for the current cart, coupon and shipping.
    pub fn summary(&self) -> OrderSummary {
        let coupon = self.coupon.active();
        self.cart
            .with_cart(|cart| OrderSummary::compute(cart, coupon.as_ref(), self.shipping))
    }

    /// Makes `coupon` the active one and returns the new totals.
    pub fn apply_coupon(&self, coupon: Coupon) -> OrderSummary {
        self.coupon.apply(coupon);
        self.summary()
    }

    /// Drops the active coupon and returns the undiscounted totals.
    pub fn remove_coupon(&self) -> OrderSummary {
        if let Some(removed) = self.coupon.clear() {
            info!(session_id = %self.id, code = %removed.code, "Coupon removed");
        }
        self.summary()
    }

    pub fn cart_snapshot(&self) -> Cart {
        self.cart.snapshot()
    }

    /// Ends the session. Every store is cleared, including handles cloned
    /// out of it earlier.
    pub fn end(self) {
        self.cart.clear();
        self.coupon.clear();
        self.bmi.reset();

        let lasted = Utc::now() - self.started_at;
        info!(
            session_id = %self.id,
            duration_secs = lasted.num_seconds(),
            "Session ended"
        );
    }
}
