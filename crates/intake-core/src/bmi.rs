//! # BMI Module
//!
//! Height/weight unit conversion and Body Mass Index calculation.
//!
//! ## Canonical Values
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where the truth lives                                │
//! │                                                                         │
//! │   user types 5 ft 7 in ──► cm_from_ft_in ──► height_cm = 170.18        │
//! │                                                 │ (never rounded)       │
//! │                                                 ▼                       │
//! │   display ft/in ◄── ft_in_from_cm ◄──── derived on demand               │
//! │   (rounded here, at presentation)                                       │
//! │                                                                         │
//! │   Same for weight: weight_kg is canonical, st/lb are mirrors.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rounded mirrors are never fed back into the canonical value, so flipping
//! between units any number of times does not drift.
//!
//! The converter does no range checking; see [`crate::validation`].

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Conversion Constants
// =============================================================================

pub const CM_PER_INCH: f64 = 2.54;
pub const CM_PER_FOOT: f64 = 30.48;
pub const INCHES_PER_FOOT: f64 = 12.0;
pub const KG_PER_STONE: f64 = 6.35029;
pub const KG_PER_POUND: f64 = 0.453592;
pub const POUNDS_PER_STONE: f64 = 14.0;

// =============================================================================
// Imperial Representations
// =============================================================================

/// Height split into whole feet and (fractional) remaining inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeetInches {
    pub feet: f64,
    pub inches: f64,
}

impl FeetInches {
    /// Whole feet and inches for display, carrying 12 in into the next foot.
    pub fn rounded(&self) -> (u32, u32) {
        carry_round(self.feet, self.inches, INCHES_PER_FOOT)
    }
}

/// Weight split into whole stones and (fractional) remaining pounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StonesPounds {
    pub stones: f64,
    pub pounds: f64,
}

impl StonesPounds {
    /// Whole stones and pounds for display, carrying 14 lb into the next stone.
    pub fn rounded(&self) -> (u32, u32) {
        carry_round(self.stones, self.pounds, POUNDS_PER_STONE)
    }
}

fn carry_round(major: f64, minor: f64, per_major: f64) -> (u32, u32) {
    let mut major = major.max(0.0) as u32;
    let mut minor = minor.max(0.0).round();
    if minor >= per_major {
        major += 1;
        minor -= per_major;
    }
    (major, minor as u32)
}

// =============================================================================
// Conversions
// =============================================================================

/// `ft * 30.48 + inch * 2.54`
pub fn cm_from_ft_in(ft: f64, inch: f64) -> f64 {
    ft * CM_PER_FOOT + inch * CM_PER_INCH
}

/// Splits centimetres into `(floor(cm / 2.54 / 12), (cm / 2.54) mod 12)`.
pub fn ft_in_from_cm(cm: f64) -> FeetInches {
    let total_inches = cm / CM_PER_INCH;
    FeetInches {
        feet: (total_inches / INCHES_PER_FOOT).floor(),
        inches: total_inches % INCHES_PER_FOOT,
    }
}

/// `st * 6.35029 + lb * 0.453592`
pub fn kg_from_st_lb(st: f64, lb: f64) -> f64 {
    st * KG_PER_STONE + lb * KG_PER_POUND
}

/// Splits kilograms into `(floor(kg / 0.453592 / 14), (kg / 0.453592) mod 14)`.
pub fn st_lb_from_kg(kg: f64) -> StonesPounds {
    let total_pounds = kg / KG_PER_POUND;
    StonesPounds {
        stones: (total_pounds / POUNDS_PER_STONE).floor(),
        pounds: total_pounds % POUNDS_PER_STONE,
    }
}

/// Body Mass Index rounded to one decimal place.
///
/// Returns `0.0` when either dimension is zero, negative or not a number.
///
/// ```rust
/// use intake_core::bmi::bmi;
///
/// assert_eq!(bmi(170.0, 70.0), 24.2);
/// assert_eq!(bmi(0.0, 70.0), 0.0);
/// ```
pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    if !is_present(height_cm) || !is_present(weight_kg) {
        return 0.0;
    }
    let metres = height_cm / 100.0;
    round_one_decimal(weight_kg / (metres * metres))
}

fn is_present(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// =============================================================================
// BMI Level
// =============================================================================

/// Weight category derived from a BMI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum BmiLevel {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl fmt::Display for BmiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BmiLevel::Underweight => "Underweight",
            BmiLevel::Normal => "Normal",
            BmiLevel::Overweight => "Overweight",
            BmiLevel::Obese => "Obese",
        };
        f.write_str(label)
    }
}

/// Categorises a BMI value. A zero (missing) BMI has no level.
///
/// | BMI          | Level       |
/// |--------------|-------------|
/// | < 18.5       | Underweight |
/// | 18.5 – 24.9  | Normal      |
/// | 25 – 29.9    | Overweight  |
/// | ≥ 30         | Obese       |
pub fn bmi_level(bmi: f64) -> Option<BmiLevel> {
    if !is_present(bmi) {
        return None;
    }
    let level = if bmi < 18.5 {
        BmiLevel::Underweight
    } else if bmi < 25.0 {
        BmiLevel::Normal
    } else if bmi < 30.0 {
        BmiLevel::Overweight
    } else {
        BmiLevel::Obese
    };
    Some(level)
}

// =============================================================================
// Measurement
// =============================================================================

/// Unit system a value is entered and displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// The BMI screen's state: two canonical values plus the selected units.
///
/// ## Invariant
/// `height_cm` and `weight_kg` hold exactly what the last setter computed,
/// unrounded. Imperial values are derived from them on every read.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiMeasurement {
    height_unit: UnitSystem,
    weight_unit: UnitSystem,
    height_cm: f64,
    weight_kg: f64,
}

impl BmiMeasurement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height_unit(&self) -> UnitSystem {
        self.height_unit
    }

    pub fn weight_unit(&self) -> UnitSystem {
        self.weight_unit
    }

    /// Canonical height, full precision.
    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    /// Canonical weight, full precision.
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn set_height_cm(&mut self, cm: f64) {
        self.height_cm = cm;
    }

    pub fn set_height_ft_in(&mut self, ft: f64, inch: f64) {
        self.height_cm = cm_from_ft_in(ft, inch);
    }

    pub fn set_weight_kg(&mut self, kg: f64) {
        self.weight_kg = kg;
    }

    pub fn set_weight_st_lb(&mut self, st: f64, lb: f64) {
        self.weight_kg = kg_from_st_lb(st, lb);
    }

    /// Switches the height display unit. The canonical value is untouched.
    pub fn set_height_unit(&mut self, unit: UnitSystem) {
        self.height_unit = unit;
    }

    /// Switches the weight display unit. The canonical value is untouched.
    pub fn set_weight_unit(&mut self, unit: UnitSystem) {
        self.weight_unit = unit;
    }

    pub fn feet_inches(&self) -> FeetInches {
        ft_in_from_cm(self.height_cm)
    }

    pub fn stones_pounds(&self) -> StonesPounds {
        st_lb_from_kg(self.weight_kg)
    }

    pub fn bmi(&self) -> f64 {
        bmi(self.height_cm, self.weight_kg)
    }

    pub fn level(&self) -> Option<BmiLevel> {
        bmi_level(self.bmi())
    }

    /// Builds the display record handed to the UI and to the consultation
    /// payload.
    pub fn snapshot(&self) -> BmiSnapshot {
        let (ft, inch) = self.feet_inches().rounded();
        let (stones, pound) = self.stones_pounds().rounded();
        let bmi = self.bmi();
        BmiSnapshot {
            height_unit: self.height_unit,
            weight_unit: self.weight_unit,
            ft,
            inch,
            cm: self.height_cm,
            stones,
            pound,
            kg: self.weight_kg,
            bmi,
            bmi_level: bmi_level(bmi),
        }
    }
}

/// Serialisable view of a [`BmiMeasurement`].
///
/// `cm` and `kg` are the canonical values; `ft`, `inch`, `stones` and
/// `pound` are rounded mirrors and must not be converted back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BmiSnapshot {
    pub height_unit: UnitSystem,
    pub weight_unit: UnitSystem,
    pub ft: u32,
    pub inch: u32,
    pub cm: f64,
    pub stones: u32,
    pub pound: u32,
    pub kg: f64,
    pub bmi: f64,
    pub bmi_level: Option<BmiLevel>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_cm_from_ft_in() {
        assert!(close(cm_from_ft_in(5.0, 7.0), 170.18, 1e-9));
        assert!(close(cm_from_ft_in(6.0, 0.0), 182.88, 1e-9));
    }

    #[test]
    fn test_ft_in_from_cm() {
        let split = ft_in_from_cm(170.18);
        assert_eq!(split.feet, 5.0);
        assert!(close(split.inches, 7.0, 1e-9));
        assert_eq!(split.rounded(), (5, 7));
    }

    #[test]
    fn test_rounded_inches_carry_into_feet() {
        // 182.8 cm is 71.97 in: 5 ft 11.97 in, displayed as 6 ft 0 in
        assert_eq!(ft_in_from_cm(182.8).rounded(), (6, 0));
    }

    #[test]
    fn test_rounded_pounds_carry_into_stones() {
        // 13 st 13.8 lb displays as 14 st 0 lb
        let kg = kg_from_st_lb(13.0, 13.8);
        assert_eq!(st_lb_from_kg(kg).rounded(), (14, 0));
    }

    #[test]
    fn test_kg_st_lb_round_trip() {
        let split = st_lb_from_kg(70.0);
        let back = kg_from_st_lb(split.stones, split.pounds);
        // stone and pound factors differ in the last digit
        assert!(close(back, 70.0, 0.01));
        assert_eq!(split.rounded(), (11, 0));
    }

    #[test]
    fn test_round_trip_within_one_display_unit() {
        for tenth in 1220..=3000 {
            let cm = tenth as f64 / 10.0;

            let exact = ft_in_from_cm(cm);
            assert!(close(cm_from_ft_in(exact.feet, exact.inches), cm, 1e-9));

            let (ft, inch) = exact.rounded();
            let recovered = cm_from_ft_in(ft as f64, inch as f64);
            assert!(
                close(recovered, cm, CM_PER_INCH / 2.0 + 1e-9),
                "{cm} cm came back as {recovered}"
            );
        }
    }

    #[test]
    fn test_bmi_examples() {
        assert_eq!(bmi(170.0, 70.0), 24.2);
        assert_eq!(bmi_level(bmi(170.0, 70.0)), Some(BmiLevel::Normal));

        assert_eq!(bmi(150.0, 100.0), 44.4);
        assert_eq!(bmi_level(bmi(150.0, 100.0)), Some(BmiLevel::Obese));
    }

    #[test]
    fn test_bmi_missing_dimension() {
        assert_eq!(bmi(0.0, 80.0), 0.0);
        assert_eq!(bmi(180.0, 0.0), 0.0);
        assert_eq!(bmi(f64::NAN, 80.0), 0.0);
        assert_eq!(bmi_level(0.0), None);
    }

    #[test]
    fn test_bmi_level_boundaries() {
        assert_eq!(bmi_level(18.4), Some(BmiLevel::Underweight));
        assert_eq!(bmi_level(18.5), Some(BmiLevel::Normal));
        assert_eq!(bmi_level(24.9), Some(BmiLevel::Normal));
        assert_eq!(bmi_level(25.0), Some(BmiLevel::Overweight));
        assert_eq!(bmi_level(29.9), Some(BmiLevel::Overweight));
        assert_eq!(bmi_level(30.0), Some(BmiLevel::Obese));
    }

    #[test]
    fn test_unit_switching_does_not_drift() {
        let mut m = BmiMeasurement::new();
        m.set_height_cm(171.3);
        m.set_weight_kg(88.45);

        for _ in 0..50 {
            m.set_height_unit(UnitSystem::Imperial);
            m.set_weight_unit(UnitSystem::Imperial);
            let _ = m.snapshot();
            m.set_height_unit(UnitSystem::Metric);
            m.set_weight_unit(UnitSystem::Metric);
        }

        assert_eq!(m.height_cm(), 171.3);
        assert_eq!(m.weight_kg(), 88.45);
    }

    #[test]
    fn test_imperial_entry_snapshot() {
        let mut m = BmiMeasurement::new();
        m.set_height_unit(UnitSystem::Imperial);
        m.set_weight_unit(UnitSystem::Imperial);
        m.set_height_ft_in(5.0, 7.0);
        m.set_weight_st_lb(15.0, 10.0);

        let snap = m.snapshot();
        assert_eq!((snap.ft, snap.inch), (5, 7));
        assert_eq!((snap.stones, snap.pound), (15, 10));
        assert!(close(snap.cm, 170.18, 1e-9));
        // 15 st 10 lb ≈ 99.79 kg → BMI 34.5
        assert_eq!(snap.bmi, 34.5);
        assert_eq!(snap.bmi_level, Some(BmiLevel::Obese));
    }

    #[test]
    fn test_empty_measurement_has_no_level() {
        let snap = BmiMeasurement::new().snapshot();
        assert_eq!(snap.bmi, 0.0);
        assert_eq!(snap.bmi_level, None);
        assert_eq!(snap.height_unit, UnitSystem::Metric);
    }

    #[test]
    fn test_measurement_serializes_camel_case() {
        let mut m = BmiMeasurement::new();
        m.set_height_cm(170.0);
        let json = serde_json::to_value(m).unwrap();

        assert_eq!(json["heightUnit"], serde_json::json!("metric"));
        assert_eq!(json["heightCm"], serde_json::json!(170.0));
        assert!(json.get("height_cm").is_none());

        let back: BmiMeasurement = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }
}
