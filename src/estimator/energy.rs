//! Energy expenditure calculations
//!
//! Harris-Benedict basal metabolic rate and activity-scaled total daily
//! energy expenditure.

use serde::{Deserialize, Serialize};

use super::{EstimatorError, EstimatorResult};

/// Biological sex used by the Harris-Benedict equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Parse from the wire value. Only "male" and "female" are defined.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Activity level with its fixed TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    /// All levels, in increasing multiplier order
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtraActive => "extra_active",
        }
    }

    /// Parse from the wire value, rejecting anything outside the fixed table
    pub fn parse(s: &str) -> EstimatorResult<Self> {
        match s.to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "lightly_active" => Ok(ActivityLevel::LightlyActive),
            "moderately_active" => Ok(ActivityLevel::ModeratelyActive),
            "very_active" => Ok(ActivityLevel::VeryActive),
            "extra_active" => Ok(ActivityLevel::ExtraActive),
            other => Err(EstimatorError::UnknownActivityLevel(other.to_string())),
        }
    }

    /// Fixed TDEE multiplier for this level
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

fn require_positive(field: &'static str, value: f64) -> EstimatorResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EstimatorError::InvalidInput { field, value });
    }
    Ok(value)
}

/// Compute basal metabolic rate in kcal/day using the Harris-Benedict
/// equations.
///
/// Inputs must be finite and positive; age is in whole years.
pub fn compute_bmr(
    weight_kg: f64,
    height_cm: f64,
    age_years: f64,
    gender: Gender,
) -> EstimatorResult<f64> {
    let weight = require_positive("weight_kg", weight_kg)?;
    let height = require_positive("height_cm", height_cm)?;
    let age = require_positive("age_years", age_years)?;

    let bmr = match gender {
        Gender::Male => 88.362 + 13.397 * weight + 4.799 * height - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight + 3.098 * height - 4.330 * age,
    };

    Ok(bmr)
}

/// Compute total daily energy expenditure in whole kcal/day.
///
/// Rounds half-up to the nearest kilocalorie.
pub fn compute_tdee(bmr: f64, activity_level: ActivityLevel) -> EstimatorResult<i64> {
    let bmr = require_positive("bmr", bmr)?;
    Ok((bmr * activity_level.multiplier()).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmr_female_formula() {
        // 447.593 + 9.247*55 + 3.098*165 - 4.330*25
        let bmr = compute_bmr(55.0, 165.0, 25.0, Gender::Female).unwrap();
        assert!((bmr - 1359.098).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_male_formula() {
        // 88.362 + 13.397*70 + 4.799*175 - 5.677*30
        let bmr = compute_bmr(70.0, 175.0, 30.0, Gender::Male).unwrap();
        assert!((bmr - 1695.667).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_rejects_zero_weight() {
        let err = compute_bmr(0.0, 165.0, 25.0, Gender::Female).unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::InvalidInput { field: "weight_kg", .. }
        ));
    }

    #[test]
    fn test_bmr_rejects_non_finite_input() {
        assert!(compute_bmr(f64::NAN, 165.0, 25.0, Gender::Female).is_err());
        assert!(compute_bmr(55.0, f64::INFINITY, 25.0, Gender::Female).is_err());
        assert!(compute_bmr(55.0, 165.0, -3.0, Gender::Male).is_err());
    }

    #[test]
    fn test_bmr_is_idempotent() {
        let a = compute_bmr(82.5, 180.0, 41.0, Gender::Male).unwrap();
        let b = compute_bmr(82.5, 180.0, 41.0, Gender::Male).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tdee_all_multipliers() {
        let expected = [
            (ActivityLevel::Sedentary, 1800),
            (ActivityLevel::LightlyActive, 2063), // 2062.5 rounds half-up
            (ActivityLevel::ModeratelyActive, 2325),
            (ActivityLevel::VeryActive, 2588), // 2587.5 rounds half-up
            (ActivityLevel::ExtraActive, 2850),
        ];
        for (level, tdee) in expected {
            assert_eq!(compute_tdee(1500.0, level).unwrap(), tdee);
        }
    }

    #[test]
    fn test_tdee_rejects_bad_bmr() {
        assert!(compute_tdee(0.0, ActivityLevel::Sedentary).is_err());
        assert!(compute_tdee(f64::NAN, ActivityLevel::Sedentary).is_err());
    }

    #[test]
    fn test_activity_level_parse() {
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::parse(level.as_str()).unwrap(), level);
        }
        assert_eq!(
            ActivityLevel::parse("MODERATELY_ACTIVE").unwrap(),
            ActivityLevel::ModeratelyActive
        );
    }

    #[test]
    fn test_activity_level_parse_rejects_unknown() {
        let err = ActivityLevel::parse("couch_potato").unwrap_err();
        assert_eq!(
            err,
            EstimatorError::UnknownActivityLevel("couch_potato".to_string())
        );
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("male"), Some(Gender::Male));
        assert_eq!(Gender::parse("Female"), Some(Gender::Female));
        assert_eq!(Gender::parse("other"), None);
    }
}
