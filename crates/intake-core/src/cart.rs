//! # Cart Module
//!
//! The dose/addon cart and its quantity bookkeeping.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Machine                                   │
//! │                                                                         │
//! │  UI Action            Operation           Effect                        │
//! │  ─────────            ─────────           ──────                        │
//! │                                                                         │
//! │  Select dose ───────► add_item() ───────► insert qty=1                  │
//! │                                           or qty+1 (below cap)          │
//! │                                           or no-op (at cap)             │
//! │                                                                         │
//! │  Tap "+" ───────────► increment_qty() ──► qty+1                         │
//! │                                           or LimitExceeded              │
//! │                                           or OutOfStock                 │
//! │                                                                         │
//! │  Tap "-" ───────────► decrement_qty() ──► qty-1                         │
//! │                                           or ConfirmRemoval (qty == 1)  │
//! │                                                                         │
//! │  Confirm remove ────► remove_item() ────► line deleted                  │
//! │                                                                         │
//! │  Logout / switch ───► clear() ──────────► empty, totals zero            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `line.total_price == line.price * line.qty` for every line
//! - `1 <= line.qty <= line.allowed_max`
//! - `cart.total_amount == Σ line.total_price`
//!
//! Totals are maintained incrementally (the same `price` is added or
//! subtracted on each step) and [`Cart::is_consistent`] recomputes them from
//! scratch for tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{LineKind, Product, Stock, StockStatus};

// =============================================================================
// Cart Line
// =============================================================================

/// A selected dose or addon with its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub name: String,
    /// Unit price, frozen when the line was created.
    pub price: Money,
    pub qty: u32,
    pub total_price: Money,
    pub allowed_max: u32,
    pub stock: Stock,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        CartLine {
            id: product.id.clone(),
            kind: product.kind,
            name: product.name.clone(),
            price: product.price,
            qty: 1,
            total_price: product.price,
            allowed_max: product.allowed,
            stock: product.stock,
        }
    }

    /// Whether another unit is allowed by the per-order cap.
    pub fn below_cap(&self) -> bool {
        self.qty < self.allowed_max
    }

    fn step_up(&mut self) {
        self.qty += 1;
        self.total_price += self.price;
    }

    fn step_down(&mut self) {
        self.qty -= 1;
        self.total_price -= self.price;
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// What [`Cart::add_item`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created with quantity 1.
    Inserted,
    /// An existing line went up by one.
    Incremented { qty: u32 },
    /// The line is already at its cap; nothing changed.
    LimitReached { allowed: u32 },
}

/// What [`Cart::decrement_qty`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    Decremented { qty: u32 },
    /// The line is at quantity 1. The UI should ask before calling
    /// [`Cart::remove_item`]; the cart is unchanged.
    ConfirmRemoval,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// Doses and addons are kept in separate lists; a line is identified by its
/// `(id, kind)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    doses: Vec<CartLine>,
    addons: Vec<CartLine>,
    total_amount: Money,
    /// When the cart was created/last cleared
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            doses: Vec::new(),
            addons: Vec::new(),
            total_amount: Money::zero(),
            created_at: Utc::now(),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Line exists and is below its cap: quantity + 1
    /// - No line yet: new line with quantity 1
    /// - Line already at its cap: no-op
    ///
    /// An existing line takes the product's stock snapshot, which is the
    /// freshest the caller has. The frozen unit price is kept.
    pub fn add_item(&mut self, product: &Product) -> AddOutcome {
        if let Some(line) = self.find_mut(&product.id, product.kind) {
            if !line.below_cap() {
                return AddOutcome::LimitReached {
                    allowed: line.allowed_max,
                };
            }
            line.stock = product.stock;
            line.step_up();
            let (qty, price) = (line.qty, line.price);
            self.total_amount += price;
            return AddOutcome::Incremented { qty };
        }

        if product.allowed == 0 {
            return AddOutcome::LimitReached { allowed: 0 };
        }

        let line = CartLine::from_product(product);
        self.total_amount += line.total_price;
        self.list_mut(product.kind).push(line);
        AddOutcome::Inserted
    }

    /// Raises a line's quantity by one and returns the new quantity.
    ///
    /// ## Errors
    /// - [`CoreError::LimitExceeded`] when the per-order cap is reached
    /// - [`CoreError::OutOfStock`] when stock cannot cover one more unit
    /// - [`CoreError::LineNotFound`] for an unknown line
    pub fn increment_qty(&mut self, id: &str, kind: LineKind) -> CoreResult<u32> {
        let line = self.find_mut(id, kind).ok_or_else(|| not_found(id, kind))?;

        if !line.below_cap() {
            return Err(CoreError::LimitExceeded {
                name: line.name.clone(),
                allowed: line.allowed_max,
            });
        }

        if !line.stock.covers(line.qty + 1) {
            let available = match line.stock.status {
                StockStatus::InStock => line.stock.quantity,
                StockStatus::OutOfStock => 0,
            };
            return Err(CoreError::OutOfStock {
                name: line.name.clone(),
                available,
            });
        }

        line.step_up();
        let (qty, price) = (line.qty, line.price);
        self.total_amount += price;
        Ok(qty)
    }

    /// Lowers a line's quantity by one, or asks for removal at quantity 1.
    pub fn decrement_qty(&mut self, id: &str, kind: LineKind) -> CoreResult<DecrementOutcome> {
        let line = self.find_mut(id, kind).ok_or_else(|| not_found(id, kind))?;

        if line.qty <= 1 {
            return Ok(DecrementOutcome::ConfirmRemoval);
        }

        line.step_down();
        let (qty, price) = (line.qty, line.price);
        self.total_amount -= price;
        Ok(DecrementOutcome::Decremented { qty })
    }

    /// Deletes a line and returns it.
    pub fn remove_item(&mut self, id: &str, kind: LineKind) -> CoreResult<CartLine> {
        let list = self.list_mut(kind);
        let index = list
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| not_found(id, kind))?;

        let line = list.remove(index);
        self.total_amount -= line.total_price;
        Ok(line)
    }

    /// Takes `qty` units of an ordered line out of the cart and returns what
    /// is left on that line.
    ///
    /// A line holding no more than `qty` is removed. A line the cart no
    /// longer has is ignored and reported as 0.
    pub fn take_ordered(&mut self, id: &str, kind: LineKind, qty: u32) -> u32 {
        let Some(line) = self.find_mut(id, kind) else {
            return 0;
        };

        if line.qty <= qty {
            let removed = line.total_price;
            self.list_mut(kind).retain(|l| l.id != id);
            self.total_amount -= removed;
            return 0;
        }

        line.qty -= qty;
        line.total_price = line.price * line.qty;
        let (left, taken) = (line.qty, line.price * qty);
        self.total_amount -= taken;
        left
    }

    /// Replaces a line's stock snapshot (e.g. after a stock refresh).
    pub fn replace_stock(&mut self, id: &str, kind: LineKind, stock: Stock) -> CoreResult<()> {
        let line = self.find_mut(id, kind).ok_or_else(|| not_found(id, kind))?;
        line.stock = stock;
        Ok(())
    }

    /// Empties the cart and zeroes the totals.
    pub fn clear(&mut self) {
        self.doses.clear();
        self.addons.clear();
        self.total_amount = Money::zero();
        self.created_at = Utc::now();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn doses(&self) -> &[CartLine] {
        &self.doses
    }

    pub fn addons(&self) -> &[CartLine] {
        &self.addons
    }

    /// All lines, doses first.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.doses.iter().chain(self.addons.iter())
    }

    pub fn line(&self, id: &str, kind: LineKind) -> Option<&CartLine> {
        self.list(kind).iter().find(|l| l.id == id)
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.doses.len() + self.addons.len()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> u32 {
        self.lines().map(|l| l.qty).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.doses.is_empty() && self.addons.is_empty()
    }

    /// Recomputes every derived value and compares it with the stored one.
    pub fn is_consistent(&self) -> bool {
        let lines_ok = self.lines().all(|l| {
            l.qty >= 1 && l.qty <= l.allowed_max && l.total_price == l.price * l.qty
        });
        let sum: Money = self.lines().map(|l| l.total_price).sum();
        lines_ok && sum == self.total_amount
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn list(&self, kind: LineKind) -> &Vec<CartLine> {
        match kind {
            LineKind::Dose => &self.doses,
            LineKind::Addon => &self.addons,
        }
    }

    fn list_mut(&mut self, kind: LineKind) -> &mut Vec<CartLine> {
        match kind {
            LineKind::Dose => &mut self.doses,
            LineKind::Addon => &mut self.addons,
        }
    }

    fn find_mut(&mut self, id: &str, kind: LineKind) -> Option<&mut CartLine> {
        self.list_mut(kind).iter_mut().find(|l| l.id == id)
    }
}

fn not_found(id: &str, kind: LineKind) -> CoreError {
    CoreError::LineNotFound {
        id: id.to_string(),
        kind,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn product(id: &str, kind: LineKind, pence: i64, allowed: u32, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            kind,
            name: format!("Product {}", id),
            price: Money::from_pence(pence),
            allowed,
            stock: Stock::in_stock(stock),
        }
    }

    fn dose(id: &str, pence: i64, allowed: u32) -> Product {
        product(id, LineKind::Dose, pence, allowed, 100)
    }

    #[test]
    fn test_add_inserts_then_increments() {
        let mut cart = Cart::new();
        let p = dose("d1", 14900, 3);

        assert_eq!(cart.add_item(&p), AddOutcome::Inserted);
        assert_eq!(cart.add_item(&p), AddOutcome::Incremented { qty: 2 });

        let line = cart.line("d1", LineKind::Dose).unwrap();
        assert_eq!(line.qty, 2);
        assert_eq!(line.total_price.pence(), 29800);
        assert_eq!(cart.total_amount().pence(), 29800);
        assert!(cart.is_consistent());
    }

    #[test]
    fn test_add_at_cap_is_noop() {
        let mut cart = Cart::new();
        let p = dose("d1", 14900, 1);
        cart.add_item(&p);

        let before = cart.clone();
        assert_eq!(cart.add_item(&p), AddOutcome::LimitReached { allowed: 1 });
        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_with_zero_allowance_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add_item(&dose("d1", 100, 0)),
            AddOutcome::LimitReached { allowed: 0 }
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_take_ordered_leaves_unordered_units() {
        let mut cart = Cart::new();
        let p = dose("d1", 10000, 5);
        for _ in 0..3 {
            cart.add_item(&p);
        }
        cart.add_item(&product("needles", LineKind::Addon, 499, 3, 10));

        assert_eq!(cart.take_ordered("d1", LineKind::Dose, 2), 1);
        assert_eq!(cart.line("d1", LineKind::Dose).unwrap().total_price.pence(), 10000);
        assert_eq!(cart.take_ordered("needles", LineKind::Addon, 1), 0);
        assert!(cart.line("needles", LineKind::Addon).is_none());
        assert_eq!(cart.take_ordered("gone", LineKind::Dose, 1), 0);

        assert_eq!(cart.total_amount().pence(), 10000);
        assert!(cart.is_consistent());
    }

    #[test]
    fn test_doses_and_addons_are_separate_lists() {
        let mut cart = Cart::new();
        cart.add_item(&dose("x", 14900, 2));
        cart.add_item(&product("x", LineKind::Addon, 499, 5, 50));

        assert_eq!(cart.doses().len(), 1);
        assert_eq!(cart.addons().len(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total_amount().pence(), 15399);
    }

    #[test]
    fn test_increment_limit_exceeded() {
        let mut cart = Cart::new();
        cart.add_item(&dose("d1", 14900, 2));
        assert_eq!(cart.increment_qty("d1", LineKind::Dose), Ok(2));

        let err = cart.increment_qty("d1", LineKind::Dose).unwrap_err();
        assert!(matches!(err, CoreError::LimitExceeded { allowed: 2, .. }));
        assert_eq!(cart.line("d1", LineKind::Dose).unwrap().qty, 2);
        assert!(cart.is_consistent());
    }

    #[test]
    fn test_increment_out_of_stock() {
        let mut cart = Cart::new();
        cart.add_item(&product("d1", LineKind::Dose, 14900, 5, 1));

        let err = cart.increment_qty("d1", LineKind::Dose).unwrap_err();
        assert_eq!(
            err,
            CoreError::OutOfStock {
                name: "Product d1".to_string(),
                available: 1
            }
        );
        assert_eq!(cart.total_amount().pence(), 14900);
    }

    #[test]
    fn test_increment_when_status_out_of_stock() {
        let mut cart = Cart::new();
        cart.add_item(&dose("d1", 14900, 5));
        cart.replace_stock("d1", LineKind::Dose, Stock::out_of_stock())
            .unwrap();

        let err = cart.increment_qty("d1", LineKind::Dose).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { available: 0, .. }));
    }

    #[test]
    fn test_cap_checked_before_stock() {
        let mut cart = Cart::new();
        cart.add_item(&product("d1", LineKind::Dose, 100, 1, 1));

        let err = cart.increment_qty("d1", LineKind::Dose).unwrap_err();
        assert!(matches!(err, CoreError::LimitExceeded { .. }));
    }

    #[test]
    fn test_decrement_and_confirm_removal() {
        let mut cart = Cart::new();
        let p = dose("d1", 14900, 3);
        cart.add_item(&p);
        cart.add_item(&p);

        assert_eq!(
            cart.decrement_qty("d1", LineKind::Dose),
            Ok(DecrementOutcome::Decremented { qty: 1 })
        );

        let before = cart.clone();
        assert_eq!(
            cart.decrement_qty("d1", LineKind::Dose),
            Ok(DecrementOutcome::ConfirmRemoval)
        );
        assert_eq!(cart, before);

        let removed = cart.remove_item("d1", LineKind::Dose).unwrap();
        assert_eq!(removed.qty, 1);
        assert!(cart.is_empty());
        assert!(cart.total_amount().is_zero());
    }

    #[test]
    fn test_remove_subtracts_line_total() {
        let mut cart = Cart::new();
        let p = dose("d1", 14900, 3);
        cart.add_item(&p);
        cart.add_item(&p);
        cart.add_item(&product("n", LineKind::Addon, 499, 3, 10));

        cart.remove_item("d1", LineKind::Dose).unwrap();
        assert_eq!(cart.total_amount().pence(), 499);
        assert!(cart.is_consistent());
    }

    #[test]
    fn test_unknown_line() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.increment_qty("nope", LineKind::Addon),
            Err(CoreError::LineNotFound { .. })
        ));
        assert!(cart.decrement_qty("nope", LineKind::Addon).is_err());
        assert!(cart.remove_item("nope", LineKind::Addon).is_err());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(&dose("d1", 14900, 3));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
        assert!(cart.total_amount().is_zero());
    }

    // =========================================================================
    // Operation sequences
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize),
        Increment(usize),
        Decrement(usize),
        Remove(usize),
        Clear,
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("d1", LineKind::Dose, 14900, 2, 10),
            product("d2", LineKind::Dose, 19999, 4, 3),
            product("d3", LineKind::Dose, 2550, 1, 0),
            product("n1", LineKind::Addon, 499, 5, 5),
            product("s1", LineKind::Addon, 1, 3, 2),
        ]
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0..5usize).prop_map(Op::Add),
            4 => (0..5usize).prop_map(Op::Increment),
            3 => (0..5usize).prop_map(Op::Decrement),
            2 => (0..5usize).prop_map(Op::Remove),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn prop_totals_consistent_after_every_step(ops in prop::collection::vec(op_strategy(), 0..60)) {
            let catalog = catalog();
            let mut cart = Cart::new();

            for op in ops {
                match op {
                    Op::Add(i) => {
                        let p = &catalog[i];
                        let before = cart.clone();
                        if let AddOutcome::LimitReached { .. } = cart.add_item(p) {
                            prop_assert_eq!(&cart, &before);
                        }
                    }
                    Op::Increment(i) => {
                        let p = &catalog[i];
                        let before = cart.clone();
                        match cart.increment_qty(&p.id, p.kind) {
                            Ok(qty) => {
                                prop_assert!(qty <= p.allowed);
                                prop_assert!(qty <= p.stock.quantity);
                            }
                            Err(_) => prop_assert_eq!(&cart, &before),
                        }
                    }
                    Op::Decrement(i) => {
                        let p = &catalog[i];
                        let before = cart.clone();
                        match cart.decrement_qty(&p.id, p.kind) {
                            Ok(DecrementOutcome::Decremented { qty }) => prop_assert!(qty >= 1),
                            Ok(DecrementOutcome::ConfirmRemoval) | Err(_) => {
                                prop_assert_eq!(&cart, &before)
                            }
                        }
                    }
                    Op::Remove(i) => {
                        let p = &catalog[i];
                        let _ = cart.remove_item(&p.id, p.kind);
                        prop_assert!(cart.line(&p.id, p.kind).is_none());
                    }
                    Op::Clear => cart.clear(),
                }

                prop_assert!(cart.is_consistent());
                prop_assert!(cart.lines().all(|l| l.qty >= 1));
            }
        }
    }
}
