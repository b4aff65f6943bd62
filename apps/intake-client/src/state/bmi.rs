//! # BMI State
//!
//! The BMI screen's measurement, shared between the screen and the
//! consultation payload.

use std::sync::{Arc, Mutex, PoisonError};

use intake_core::validation::{
    validate_height_cm, validate_height_ft_in, validate_weight_kg, validate_weight_st_lb,
};
use intake_core::{BmiMeasurement, BmiSnapshot, UnitSystem, ValidationError};

#[derive(Debug, Clone, Default)]
pub struct BmiState {
    measurement: Arc<Mutex<BmiMeasurement>>,
}

impl BmiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_measurement(measurement: BmiMeasurement) -> Self {
        BmiState {
            measurement: Arc::new(Mutex::new(measurement)),
        }
    }

    pub fn with_measurement<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut BmiMeasurement) -> R,
    {
        let mut m = self
            .measurement
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut m)
    }

    /// Validates and stores a metric height.
    pub fn set_height_cm(&self, cm: f64) -> Result<BmiSnapshot, ValidationError> {
        validate_height_cm(cm)?;
        Ok(self.with_measurement(|m| {
            m.set_height_cm(cm);
            m.snapshot()
        }))
    }

    /// Validates and stores an imperial height.
    pub fn set_height_ft_in(&self, ft: f64, inch: f64) -> Result<BmiSnapshot, ValidationError> {
        validate_height_ft_in(ft, inch)?;
        Ok(self.with_measurement(|m| {
            m.set_height_ft_in(ft, inch);
            m.snapshot()
        }))
    }

    /// Validates and stores a metric weight.
    pub fn set_weight_kg(&self, kg: f64) -> Result<BmiSnapshot, ValidationError> {
        validate_weight_kg(kg)?;
        Ok(self.with_measurement(|m| {
            m.set_weight_kg(kg);
            m.snapshot()
        }))
    }

    /// Validates and stores an imperial weight.
    pub fn set_weight_st_lb(&self, st: f64, lb: f64) -> Result<BmiSnapshot, ValidationError> {
        validate_weight_st_lb(st, lb)?;
        Ok(self.with_measurement(|m| {
            m.set_weight_st_lb(st, lb);
            m.snapshot()
        }))
    }

    pub fn set_units(&self, height: UnitSystem, weight: UnitSystem) -> BmiSnapshot {
        self.with_measurement(|m| {
            m.set_height_unit(height);
            m.set_weight_unit(weight);
            m.snapshot()
        })
    }

    pub fn snapshot(&self) -> BmiSnapshot {
        self.with_measurement(|m| m.snapshot())
    }

    pub fn measurement(&self) -> BmiMeasurement {
        self.with_measurement(|m| *m)
    }

    pub fn reset(&self) {
        self.with_measurement(|m| *m = BmiMeasurement::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::BmiLevel;

    #[test]
    fn test_rejected_value_leaves_state() {
        let state = BmiState::new();
        state.set_height_cm(170.0).unwrap();

        assert!(state.set_height_cm(80.0).is_err());
        assert_eq!(state.measurement().height_cm(), 170.0);
    }

    #[test]
    fn test_metric_flow() {
        let state = BmiState::new();
        state.set_height_cm(170.0).unwrap();
        let snap = state.set_weight_kg(70.0).unwrap();

        assert_eq!(snap.bmi, 24.2);
        assert_eq!(snap.bmi_level, Some(BmiLevel::Normal));
    }

    #[test]
    fn test_units_switch_keeps_values() {
        let state = BmiState::new();
        state.set_height_ft_in(5.0, 7.0).unwrap();
        state.set_weight_st_lb(15.0, 10.0).unwrap();
        let before = state.measurement();

        let snap = state.set_units(UnitSystem::Metric, UnitSystem::Metric);
        assert_eq!(snap.cm, before.height_cm());
        assert_eq!(snap.kg, before.weight_kg());
    }

    #[test]
    fn test_reset() {
        let state = BmiState::new();
        state.set_height_cm(170.0).unwrap();
        state.reset();
        assert_eq!(state.snapshot().bmi, 0.0);
    }
}
