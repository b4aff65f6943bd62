//! # Error Types
//!
//! Domain-specific error types for intake-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  intake-core errors (this file)                                        │
//! │  ├── CoreError        - Cart / coupon rule violations                  │
//! │  └── ValidationError  - Form input validation failures                 │
//! │                                                                         │
//! │  intake-client errors (separate crate)                                 │
//! │  └── ApiError         - What the UI sees (code + toast message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Toast                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::LineKind;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the cart and coupon logic.
///
/// Every variant leaves the state it was raised from untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The per-order cap for this line is already reached.
    ///
    /// Kept distinct from [`CoreError::OutOfStock`]: the UI shows a
    /// "maximum per order" toast for this one.
    #[error("You can order at most {allowed} of {name}")]
    LimitExceeded { name: String, allowed: u32 },

    /// The clinic has no more units of this line available.
    #[error("{name} is out of stock (available: {available})")]
    OutOfStock { name: String, available: u32 },

    /// No line with this id exists in the given list.
    #[error("No {kind} with id {id} in the cart")]
    LineNotFound { id: String, kind: LineKind },

    /// Checkout was requested with nothing in the cart.
    #[error("Your basket is empty")]
    EmptyCart,

    /// A coupon descriptor could not be interpreted.
    #[error("Invalid coupon {code}: {reason}")]
    InvalidCoupon { code: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, surfaced inline next to the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// A whole number was required.
    #[error("{field} must be a whole number")]
    NotWholeNumber { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (postcode, coupon code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
