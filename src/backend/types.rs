//! Backend wire types
//!
//! Request and response schemas for every backend endpoint, validated at
//! the boundary by serde instead of assembled ad hoc.

use serde::{Deserialize, Serialize};

use crate::estimator::{ActivityLevel, Gender, MealMacroPlan, MealSlot, FIBER_TARGET_GRAMS};
use crate::models::HealthProfile;

/// Per-meal nutrient needs as the backend expects them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealNutrientNeeds {
    pub carb: i64,    // grams
    pub protein: i64, // grams
    pub fat: i64,     // grams
    pub fiber: f64,   // grams, fixed guideline
}

/// Nutrient needs for all three meals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientNeeds {
    pub breakfast: MealNutrientNeeds,
    pub lunch: MealNutrientNeeds,
    pub dinner: MealNutrientNeeds,
}

impl NutrientNeeds {
    pub fn from_plan(plan: &MealMacroPlan) -> Self {
        let needs = |slot: MealSlot| {
            let t = plan.get(slot);
            MealNutrientNeeds {
                carb: t.carb_g,
                protein: t.protein_g,
                fat: t.fat_g,
                fiber: FIBER_TARGET_GRAMS,
            }
        };
        Self {
            breakfast: needs(MealSlot::Breakfast),
            lunch: needs(MealSlot::Lunch),
            dinner: needs(MealSlot::Dinner),
        }
    }
}

/// Profile payload for `/api/user-data`, `/chat`, and
/// `/get_recipe_recommendation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDataUpload {
    pub height: f64,
    pub weight: f64,
    pub age: i64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub pre_meal_glucose: Option<f64>,
    pub pre_meal_insulin: Option<i64>,
    #[serde(rename = "TDEE")]
    pub tdee: i64,
    pub nutrient_needs: NutrientNeeds,
}

impl UserDataUpload {
    pub fn from_profile(profile: &HealthProfile, plan: &MealMacroPlan) -> Self {
        Self {
            height: profile.height_cm,
            weight: profile.weight_kg,
            age: profile.age,
            gender: profile.gender,
            activity_level: profile.activity_level,
            pre_meal_glucose: profile.pre_meal_glucose,
            pre_meal_insulin: profile.pre_meal_insulin,
            tdee: profile.tdee,
            nutrient_needs: NutrientNeeds::from_plan(plan),
        }
    }
}

/// Generic acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// Request body for `/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_data: UserDataUpload,
}

/// Reply body from `/chat`. The recommendation fields are only present
/// when the backend answered with a recipe recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
    #[serde(default)]
    pub meal_type: Option<MealSlot>,
    #[serde(default)]
    pub health_score: Option<f64>,
    #[serde(default, rename = "PBG")]
    pub predicted_glucose: Option<f64>,
    #[serde(default)]
    pub carb: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
}

impl ChatReply {
    /// True when the reply carries a recommendation worth recording
    pub fn has_recommendation(&self) -> bool {
        self.meal_type.is_some()
            && self
                .recommendations
                .as_ref()
                .is_some_and(|r| !r.is_empty())
    }
}

/// One recipe card from `/get_recipe_recommendation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCard {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response body from `/get_recipe_recommendation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recipes: Vec<RecipeCard>,
}

/// Request body for `/update_pref`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefUpdate {
    pub recipe: String,
    pub rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::allocate_meal_macros;

    #[test]
    fn test_user_data_wire_field_names() {
        let plan = allocate_meal_macros(2000).unwrap();
        let upload = UserDataUpload {
            height: 165.0,
            weight: 55.0,
            age: 25,
            gender: Gender::Female,
            activity_level: ActivityLevel::ModeratelyActive,
            pre_meal_glucose: Some(5.0),
            pre_meal_insulin: Some(0),
            tdee: 2000,
            nutrient_needs: NutrientNeeds::from_plan(&plan),
        };

        let json = serde_json::to_value(&upload).unwrap();
        assert_eq!(json["gender"], "female");
        assert_eq!(json["activity_level"], "moderately_active");
        assert_eq!(json["TDEE"], 2000);
        assert_eq!(json["nutrient_needs"]["breakfast"]["carb"], 75);
        assert_eq!(json["nutrient_needs"]["lunch"]["fiber"], 10.0);
    }

    #[test]
    fn test_chat_reply_with_recommendation() {
        let reply: ChatReply = serde_json::from_str(
            r#"{
                "message": "Here are two breakfast ideas.",
                "recommendations": ["Oat congee", "Egg white wrap"],
                "meal_type": "breakfast",
                "health_score": 8.4,
                "PBG": 7.2,
                "carb": 63.0,
                "protein": 25.0,
                "fat": 20.0,
                "fiber": 10.0
            }"#,
        )
        .unwrap();

        assert!(reply.has_recommendation());
        assert_eq!(reply.meal_type, Some(MealSlot::Breakfast));
        assert_eq!(reply.predicted_glucose, Some(7.2));
    }

    #[test]
    fn test_chat_reply_plain_answer() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"message": "Fruit is fine in moderation."}"#).unwrap();

        assert!(!reply.has_recommendation());
        assert!(reply.recommendations.is_none());
        assert!(reply.health_score.is_none());
    }

    #[test]
    fn test_chat_reply_empty_recommendations_not_recorded() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"message": "nothing today", "recommendations": [], "meal_type": "lunch"}"#,
        )
        .unwrap();

        assert!(!reply.has_recommendation());
    }
}
