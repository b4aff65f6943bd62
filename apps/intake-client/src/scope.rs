//! # Screen Scopes
//!
//! Guards async results against screens that are no longer visible.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Coupon screen                                                          │
//! │    enter() ──► ticket #1 ──► validate_coupon(...) ──┐  (in flight)      │
//! │    leave()  (user navigates away)                   │                   │
//! │                                                     ▼                   │
//! │                                  response arrives, ticket #1 stale      │
//! │                                  → dropped, nothing mutated            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A ticket is current while its scope is visible and has not been
//! re-entered since the ticket was issued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

#[derive(Debug, Default)]
struct ScopeInner {
    generation: AtomicU64,
    visible: AtomicBool,
}

/// The visible lifetime of one screen.
#[derive(Debug, Clone)]
pub struct ScreenScope {
    name: &'static str,
    inner: Arc<ScopeInner>,
}

impl ScreenScope {
    /// Creates a scope for `name`, not yet visible.
    pub fn new(name: &'static str) -> Self {
        ScreenScope {
            name,
            inner: Arc::new(ScopeInner::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Marks the screen visible and returns a fresh ticket. Tickets from
    /// earlier visits become stale.
    pub fn enter(&self) -> ScreenTicket {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.visible.store(true, Ordering::SeqCst);
        debug!(screen = self.name, generation, "screen entered");
        ScreenTicket {
            screen: self.name,
            generation,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Marks the screen hidden. Every outstanding ticket becomes stale.
    pub fn leave(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.visible.store(false, Ordering::SeqCst);
        debug!(screen = self.name, "screen left");
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.load(Ordering::SeqCst)
    }
}

/// Proof that a request was started during one particular visit.
#[derive(Debug, Clone)]
pub struct ScreenTicket {
    screen: &'static str,
    generation: u64,
    inner: Arc<ScopeInner>,
}

impl ScreenTicket {
    pub fn screen(&self) -> &'static str {
        self.screen
    }

    /// Whether results for this ticket may still be applied.
    pub fn is_current(&self) -> bool {
        self.inner.visible.load(Ordering::SeqCst)
            && self.inner.generation.load(Ordering::SeqCst) == self.generation
    }

    /// Runs `apply` only if the ticket is still current.
    pub fn apply<T>(&self, apply: impl FnOnce() -> T) -> Scoped<T> {
        if self.is_current() {
            Scoped::Applied(apply())
        } else {
            debug!(screen = self.screen, "dropping stale result");
            Scoped::Stale
        }
    }
}

/// Result of work guarded by a [`ScreenTicket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scoped<T> {
    Applied(T),
    /// The screen was left before the result arrived; nothing was changed.
    Stale,
}

impl<T> Scoped<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Scoped::Stale)
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Scoped::Applied(value) => Some(value),
            Scoped::Stale => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_current_while_visible() {
        let scope = ScreenScope::new("coupon");
        let ticket = scope.enter();
        assert!(ticket.is_current());
        assert_eq!(ticket.apply(|| 7), Scoped::Applied(7));
    }

    #[test]
    fn test_leave_invalidates() {
        let scope = ScreenScope::new("coupon");
        let ticket = scope.enter();
        scope.leave();

        let mut touched = false;
        assert!(ticket.apply(|| touched = true).is_stale());
        assert!(!touched);
        assert!(!scope.is_visible());
    }

    #[test]
    fn test_reentry_invalidates_old_tickets() {
        let scope = ScreenScope::new("postcode");
        let first = scope.enter();
        scope.leave();
        let second = scope.enter();

        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(second.apply(|| "ok").applied(), Some("ok"));
    }
}
