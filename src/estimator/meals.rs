//! Per-meal macro-nutrient allocation
//!
//! Splits a daily energy budget across breakfast, lunch, and dinner using
//! fixed energy ratios, then converts each meal's share into gram targets
//! for carbohydrate, protein, and fat.

use serde::{Deserialize, Serialize};

use super::energy::{compute_bmr, compute_tdee, ActivityLevel, Gender};
use super::{EstimatorError, EstimatorResult};

/// Energy share per macro-nutrient (sums to 1.0)
const CARB_ENERGY_RATIO: f64 = 0.5;
const PROTEIN_ENERGY_RATIO: f64 = 0.2;
const FAT_ENERGY_RATIO: f64 = 0.3;

/// Energy density in kcal per gram
const KCAL_PER_GRAM_CARB: f64 = 4.0;
const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Fixed per-meal dietary fiber guideline in grams. Not derived from the
/// energy budget; carried alongside the computed macros on backend payloads.
pub const FIBER_TARGET_GRAMS: f64 = 10.0;

/// Meal slot with its fixed share of the daily energy budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    /// All slots in day order
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(MealSlot::Breakfast),
            "lunch" => Some(MealSlot::Lunch),
            "dinner" => Some(MealSlot::Dinner),
            _ => None,
        }
    }

    /// Share of the daily energy budget for this meal (sums to 1.0)
    pub fn energy_ratio(&self) -> f64 {
        match self {
            MealSlot::Breakfast => 0.3,
            MealSlot::Lunch => 0.4,
            MealSlot::Dinner => 0.3,
        }
    }
}

/// Gram targets for a single meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub carb_g: i64,
    pub protein_g: i64,
    pub fat_g: i64,
}

/// Gram targets for all three meals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealMacroPlan {
    pub breakfast: MacroTargets,
    pub lunch: MacroTargets,
    pub dinner: MacroTargets,
}

impl MealMacroPlan {
    pub fn get(&self, slot: MealSlot) -> &MacroTargets {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    /// Iterate slots with their targets, in day order
    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, &MacroTargets)> + '_ {
        MealSlot::ALL.iter().map(move |slot| (*slot, self.get(*slot)))
    }
}

/// Full estimator output for one profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyNeeds {
    pub bmr: f64,
    pub tdee: i64,
    pub meal_plan: MealMacroPlan,
}

fn targets_for_energy(meal_energy: f64) -> MacroTargets {
    // Each macro rounds independently; totals may drift a gram or two from
    // the nominal ratios and are not renormalized.
    MacroTargets {
        carb_g: (meal_energy * CARB_ENERGY_RATIO / KCAL_PER_GRAM_CARB).round() as i64,
        protein_g: (meal_energy * PROTEIN_ENERGY_RATIO / KCAL_PER_GRAM_PROTEIN).round() as i64,
        fat_g: (meal_energy * FAT_ENERGY_RATIO / KCAL_PER_GRAM_FAT).round() as i64,
    }
}

/// Split a daily energy budget into per-meal gram targets.
pub fn allocate_meal_macros(tdee: i64) -> EstimatorResult<MealMacroPlan> {
    if tdee <= 0 {
        return Err(EstimatorError::InvalidInput {
            field: "tdee",
            value: tdee as f64,
        });
    }

    let tdee = tdee as f64;
    Ok(MealMacroPlan {
        breakfast: targets_for_energy(tdee * MealSlot::Breakfast.energy_ratio()),
        lunch: targets_for_energy(tdee * MealSlot::Lunch.energy_ratio()),
        dinner: targets_for_energy(tdee * MealSlot::Dinner.energy_ratio()),
    })
}

/// Run the full pipeline: BMR, TDEE, then the per-meal macro plan.
pub fn estimate_daily_needs(
    weight_kg: f64,
    height_cm: f64,
    age_years: f64,
    gender: Gender,
    activity_level: ActivityLevel,
) -> EstimatorResult<DailyNeeds> {
    let bmr = compute_bmr(weight_kg, height_cm, age_years, gender)?;
    let tdee = compute_tdee(bmr, activity_level)?;
    let meal_plan = allocate_meal_macros(tdee)?;
    Ok(DailyNeeds {
        bmr,
        tdee,
        meal_plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_ratios_sum_to_one() {
        let total: f64 = MealSlot::ALL.iter().map(|s| s.energy_ratio()).sum();
        assert!((total - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_allocate_2000_kcal() {
        let plan = allocate_meal_macros(2000).unwrap();

        // Breakfast: 600 kcal
        assert_eq!(
            plan.breakfast,
            MacroTargets { carb_g: 75, protein_g: 30, fat_g: 20 }
        );
        // Lunch: 800 kcal (fat 26.67 rounds to 27)
        assert_eq!(
            plan.lunch,
            MacroTargets { carb_g: 100, protein_g: 40, fat_g: 27 }
        );
        // Dinner shares the breakfast ratio
        assert_eq!(plan.dinner, plan.breakfast);
    }

    #[test]
    fn test_allocate_rounds_each_macro_independently() {
        // 1601 kcal: breakfast = 480.3 kcal -> carb 60.04 -> 60,
        // protein 24.02 -> 24, fat 16.01 -> 16
        let plan = allocate_meal_macros(1601).unwrap();
        assert_eq!(
            plan.breakfast,
            MacroTargets { carb_g: 60, protein_g: 24, fat_g: 16 }
        );
    }

    #[test]
    fn test_allocate_rejects_non_positive_tdee() {
        assert!(allocate_meal_macros(0).is_err());
        assert!(allocate_meal_macros(-1200).is_err());
    }

    #[test]
    fn test_allocate_is_idempotent() {
        assert_eq!(
            allocate_meal_macros(1847).unwrap(),
            allocate_meal_macros(1847).unwrap()
        );
    }

    #[test]
    fn test_meal_slot_parse() {
        assert_eq!(MealSlot::parse("breakfast"), Some(MealSlot::Breakfast));
        assert_eq!(MealSlot::parse("Lunch"), Some(MealSlot::Lunch));
        assert_eq!(MealSlot::parse("supper"), None);
    }

    #[test]
    fn test_estimate_daily_needs_pipeline() {
        // Female 55kg/165cm/25y moderately active:
        // BMR 1359.098, TDEE round(1359.098 * 1.55) = 2107
        let needs = estimate_daily_needs(
            55.0,
            165.0,
            25.0,
            Gender::Female,
            ActivityLevel::ModeratelyActive,
        )
        .unwrap();
        assert!((needs.bmr - 1359.098).abs() < 1e-9);
        assert_eq!(needs.tdee, 2107);
        assert_eq!(needs.meal_plan, allocate_meal_macros(2107).unwrap());
    }

    #[test]
    fn test_estimate_daily_needs_propagates_invalid_input() {
        let err = estimate_daily_needs(
            -1.0,
            165.0,
            25.0,
            Gender::Female,
            ActivityLevel::Sedentary,
        )
        .unwrap_err();
        assert!(matches!(err, EstimatorError::InvalidInput { .. }));
    }
}
