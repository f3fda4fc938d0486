//! Nutrient need estimation module
//!
//! Pure calculation pipeline: basal metabolic rate, total daily energy
//! expenditure, and per-meal macro-nutrient targets.

pub mod energy;
pub mod meals;

use thiserror::Error;

pub use energy::{compute_bmr, compute_tdee, ActivityLevel, Gender};
pub use meals::{
    allocate_meal_macros, estimate_daily_needs, DailyNeeds, MacroTargets, MealMacroPlan, MealSlot,
    FIBER_TARGET_GRAMS,
};

/// Estimator error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("invalid {field}: {value} (expected a finite positive number)")]
    InvalidInput { field: &'static str, value: f64 },

    #[error("unknown activity level '{0}' (expected sedentary, lightly_active, moderately_active, very_active, or extra_active)")]
    UnknownActivityLevel(String),
}

/// Result type for estimator operations
pub type EstimatorResult<T> = Result<T, EstimatorError>;
