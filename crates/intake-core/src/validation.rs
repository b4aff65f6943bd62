//! # Validation Module
//!
//! Input validation for the intake forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form field (TypeScript)                                      │
//! │  └── Required / pattern checks, immediate feedback                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Ranges and shapes before values reach the converter or API        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Clinic API                                                   │
//! │  └── Eligibility, stock, coupon validity                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The BMI converter itself never rejects a value; range checks live here.

use crate::bmi::{cm_from_ft_in, kg_from_st_lb};
use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MIN_HEIGHT_CM: f64 = 122.0;
pub const MAX_HEIGHT_CM: f64 = 300.0;
pub const MIN_WEIGHT_KG: f64 = 40.0;
pub const MAX_WEIGHT_KG: f64 = 500.0;
pub const MAX_COUPON_CODE_LEN: usize = 32;

// =============================================================================
// Measurements
// =============================================================================

/// Validates a metric height.
///
/// ```rust
/// use intake_core::validation::validate_height_cm;
///
/// assert!(validate_height_cm(170.0).is_ok());
/// assert!(validate_height_cm(121.0).is_err());
/// ```
pub fn validate_height_cm(cm: f64) -> ValidationResult<()> {
    in_range("height", cm, MIN_HEIGHT_CM, MAX_HEIGHT_CM)
}

/// Validates a metric weight (40–500 kg).
pub fn validate_weight_kg(kg: f64) -> ValidationResult<()> {
    in_range("weight", kg, MIN_WEIGHT_KG, MAX_WEIGHT_KG)
}

/// Validates an imperial height: whole feet, whole inches 0–11, and the
/// combined value within the metric range.
pub fn validate_height_ft_in(ft: f64, inch: f64) -> ValidationResult<()> {
    whole_number("feet", ft)?;
    whole_number("inches", inch)?;
    in_range("inches", inch, 0.0, 11.0)?;
    validate_height_cm(cm_from_ft_in(ft, inch))
}

/// Validates an imperial weight: whole stones, whole pounds 0–13, and the
/// combined value within the metric range.
pub fn validate_weight_st_lb(st: f64, lb: f64) -> ValidationResult<()> {
    whole_number("stones", st)?;
    whole_number("pounds", lb)?;
    in_range("pounds", lb, 0.0, 13.0)?;
    validate_weight_kg(kg_from_st_lb(st, lb))
}

/// Validates a requested line quantity. Zero is never a quantity; removal
/// is its own operation.
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

fn in_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

fn whole_number(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ValidationError::NotWholeNumber {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Codes
// =============================================================================

/// Validates a coupon code before it is sent for validation.
///
/// ## Rules
/// - Not empty after trimming
/// - At most 32 characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_coupon_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }

    if code.len() > MAX_COUPON_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "coupon code".to_string(),
            max: MAX_COUPON_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "coupon code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates the shape of a UK postcode and returns it normalised
/// (upper case, single space before the inward code).
///
/// Only the shape is checked; the lookup service decides whether the
/// postcode exists.
///
/// ```rust
/// use intake_core::validation::normalize_postcode;
///
/// assert_eq!(normalize_postcode(" sw1a1aa ").unwrap(), "SW1A 1AA");
/// assert!(normalize_postcode("12345").is_err());
/// ```
pub fn normalize_postcode(raw: &str) -> ValidationResult<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    if compact.is_empty() {
        return Err(ValidationError::Required {
            field: "postcode".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "postcode".to_string(),
        reason: "not a UK postcode".to_string(),
    };

    if !(5..=7).contains(&compact.len()) || !compact.is_ascii() {
        return Err(invalid());
    }

    let (outward, inward) = compact.split_at(compact.len() - 3);
    let inward_ok = {
        let b = inward.as_bytes();
        b[0].is_ascii_digit() && b[1].is_ascii_alphabetic() && b[2].is_ascii_alphabetic()
    };
    let outward_ok = outward
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && outward.chars().any(|c| c.is_ascii_digit())
        && outward.chars().all(|c| c.is_ascii_alphanumeric());

    if !inward_ok || !outward_ok {
        return Err(invalid());
    }

    Ok(format!("{} {}", outward, inward))
}

// =============================================================================
// Unit Tests
// =============================================================================
