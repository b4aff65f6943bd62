//! End-to-end flows through a session with a scripted clinic API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use intake_client::services::cart;
use intake_client::{
    ApiFailure, CheckoutService, ClientConfig, ClinicApi, CouponService, ErrorCode, OrderReceipt,
    ScreenScope, Session, SessionSnapshot,
};
use intake_core::{
    CheckoutPayload, CouponPayload, CouponType, LineKind, Money, Product, Stock,
};
use tokio::sync::Notify;

/// Answers coupon checks only once `gate` is notified.
#[derive(Clone)]
struct GatedApi {
    gate: Arc<Notify>,
    orders: Arc<AtomicUsize>,
}

impl GatedApi {
    fn new() -> Self {
        GatedApi {
            gate: Arc::new(Notify::new()),
            orders: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ClinicApi for GatedApi {
    async fn validate_coupon(&self, code: &str) -> Result<CouponPayload, ApiFailure> {
        self.gate.notified().await;
        match code {
            "TEN" => Ok(CouponPayload {
                kind: CouponType::Percent,
                discount: 10.0,
                code: code.to_string(),
            }),
            _ => Err(ApiFailure {
                status: 404,
                body: r#"{"error":{"message":"Coupon not found"}}"#.to_string(),
            }),
        }
    }

    async fn submit_order(&self, payload: &CheckoutPayload) -> Result<OrderReceipt, ApiFailure> {
        self.gate.notified().await;
        let n = self.orders.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(OrderReceipt {
            order_id: format!("order-{}-{}", n, payload.lines.len()),
            status: "received".to_string(),
        })
    }
}

/// Never answers.
struct SilentApi;

impl ClinicApi for SilentApi {
    async fn validate_coupon(&self, _code: &str) -> Result<CouponPayload, ApiFailure> {
        std::future::pending().await
    }

    async fn submit_order(&self, _payload: &CheckoutPayload) -> Result<OrderReceipt, ApiFailure> {
        std::future::pending().await
    }
}

fn config() -> ClientConfig {
    ClientConfig {
        shipping_price: 5.0,
        ..ClientConfig::default()
    }
}

fn dose(id: &str, pounds: i64, allowed: u32, stock: u32) -> Product {
    Product {
        id: id.to_string(),
        kind: LineKind::Dose,
        name: format!("{} pen", id),
        price: Money::from_major_minor(pounds, 0),
        allowed,
        stock: Stock::in_stock(stock),
    }
}

#[tokio::test]
async fn coupon_applies_while_screen_visible() {
    let api = GatedApi::new();
    let coupons = CouponService::new(api.clone(), &config());
    let session = Session::start(&config());
    cart::add_to_cart(&session, &dose("5mg", 100, 2, 5));

    let scope = ScreenScope::new("coupon");
    let ticket = scope.enter();
    api.gate.notify_one();

    let summary = coupons
        .apply_code(&session, &ticket, "TEN")
        .await
        .unwrap()
        .applied()
        .expect("screen still visible");

    assert_eq!(summary.final_total, Money::from_pence(9_500));
    assert_eq!(coupons.remove(&session).final_total, Money::from_pence(10_500));
}

#[tokio::test]
async fn coupon_response_after_leaving_is_dropped() {
    let api = GatedApi::new();
    let coupons = CouponService::new(api.clone(), &config());
    let session = Session::start(&config());
    cart::add_to_cart(&session, &dose("5mg", 100, 2, 5));

    let scope = ScreenScope::new("coupon");
    let ticket = scope.enter();

    let (result, _) = tokio::join!(coupons.apply_code(&session, &ticket, "TEN"), async {
        scope.leave();
        api.gate.notify_one();
    });

    assert!(result.unwrap().is_stale());
    assert!(session.coupon().active().is_none());
    assert_eq!(session.summary().final_total, Money::from_pence(10_500));
}

#[tokio::test]
async fn coupon_failure_after_leaving_is_dropped() {
    let api = GatedApi::new();
    let coupons = CouponService::new(api.clone(), &config());
    let session = Session::start(&config());

    let scope = ScreenScope::new("coupon");
    let ticket = scope.enter();

    let (result, _) = tokio::join!(coupons.apply_code(&session, &ticket, "BOGUS"), async {
        scope.leave();
        scope.enter();
        api.gate.notify_one();
    });

    assert!(result.unwrap().is_stale());
}

#[tokio::test]
async fn coupon_not_found_surfaces_body_message() {
    let api = GatedApi::new();
    let coupons = CouponService::new(api.clone(), &config());
    let session = Session::start(&config());
    let ticket = ScreenScope::new("coupon").enter();
    api.gate.notify_one();

    let err = coupons.apply_code(&session, &ticket, "BOGUS").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Coupon not found");
}

#[tokio::test(start_paused = true)]
async fn slow_coupon_check_times_out() {
    let mut cfg = config();
    cfg.request_timeout_secs = 2;
    let coupons = CouponService::new(SilentApi, &cfg);
    let session = Session::start(&cfg);
    let ticket = ScreenScope::new("coupon").enter();

    let err = coupons.apply_code(&session, &ticket, "TEN").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Network);
    assert!(session.coupon().active().is_none());
}

#[tokio::test]
async fn checkout_clears_cart_even_when_screen_left() {
    let api = GatedApi::new();
    let checkout = CheckoutService::new(api.clone(), &config());
    let session = Session::start(&config());
    cart::add_to_cart(&session, &dose("5mg", 100, 2, 5));
    session.apply_coupon(intake_core::Coupon::fixed("FIVER", Money::from_pence(500)));

    let scope = ScreenScope::new("checkout");
    let ticket = scope.enter();

    let (result, _) = tokio::join!(checkout.submit(&session, &ticket), async {
        scope.leave();
        api.gate.notify_one();
    });

    assert!(result.unwrap().is_stale());
    assert_eq!(api.orders.load(Ordering::SeqCst), 1);
    assert_eq!(session.cart().totals().item_count, 0);
    assert!(session.coupon().active().is_none());
}

#[tokio::test]
async fn checkout_keeps_items_added_while_in_flight() {
    let api = GatedApi::new();
    let checkout = CheckoutService::new(api.clone(), &config());
    let session = Session::start(&config());
    cart::add_to_cart(&session, &dose("5mg", 100, 3, 5));
    session.apply_coupon(intake_core::Coupon::fixed("FIVER", Money::from_pence(500)));

    let scope = ScreenScope::new("checkout");
    let ticket = scope.enter();

    let (result, _) = tokio::join!(checkout.submit(&session, &ticket), async {
        scope.leave();
        cart::add_to_cart(&session, &dose("7.5mg", 120, 2, 5));
        cart::add_to_cart(&session, &dose("5mg", 100, 3, 5));
        session.apply_coupon(intake_core::Coupon::fixed("TENNER", Money::from_pence(1_000)));
        api.gate.notify_one();
    });

    assert!(result.unwrap().is_stale());
    let left = session.cart_snapshot();
    assert_eq!(left.item_count(), 2);
    assert_eq!(left.line("5mg", LineKind::Dose).map(|l| l.qty), Some(1));
    assert_eq!(left.line("7.5mg", LineKind::Dose).map(|l| l.qty), Some(1));
    assert_eq!(left.total_amount(), Money::from_pence(22_000));
    assert!(left.is_consistent());
    assert_eq!(session.coupon().active().map(|c| c.code).as_deref(), Some("TENNER"));
}

#[test]
fn limit_and_stock_errors_are_distinct() {
    let session = Session::start(&config());
    cart::add_to_cart(&session, &dose("capped", 100, 1, 9));
    cart::add_to_cart(&session, &dose("scarce", 100, 9, 1));

    let limit = cart::increment(&session, "capped", LineKind::Dose).unwrap_err();
    let stock = cart::increment(&session, "scarce", LineKind::Dose).unwrap_err();

    assert_eq!(limit.code, ErrorCode::LimitExceeded);
    assert_eq!(stock.code, ErrorCode::OutOfStock);
    assert_eq!(session.cart().totals().total_quantity, 2);
}

#[test]
fn session_end_and_product_switch() {
    let mut session = Session::start(&config());
    session.switch_product("mounjaro");
    cart::add_to_cart(&session, &dose("5mg", 100, 2, 5));
    session.apply_coupon(intake_core::Coupon::fixed("FIVER", Money::from_pence(500)));

    assert!(session.switch_product("wegovy"));
    assert_eq!(session.summary().final_total, Money::from_pence(500));

    cart::add_to_cart(&session, &dose("1mg", 80, 2, 5));
    let cart_handle = session.cart().clone();
    session.end();
    assert_eq!(cart_handle.totals().item_count, 0);
}

#[test]
fn snapshot_round_trip_restores_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let session = Session::start(&config());
    cart::add_to_cart(&session, &dose("5mg", 100, 2, 5));
    cart::add_to_cart(&session, &dose("5mg", 100, 2, 5));
    session.apply_coupon(intake_core::Coupon::fixed("FIVER", Money::from_pence(500)));
    let before = session.summary();

    SessionSnapshot::capture(&session).save(&path).unwrap();
    session.end();

    let restored = SessionSnapshot::load(&path)
        .unwrap()
        .expect("snapshot written")
        .into_session(&config());
    assert_eq!(restored.summary(), before);
    assert_eq!(before.final_total, Money::from_pence(20_000));
}
