//! Recipe recommendation tools
//!
//! Requests recipe cards from the backend for a meal slot and records the
//! result as a history entry, stamped with the stored macro targets for
//! that meal.

use serde::Serialize;

use crate::backend::{BackendClient, RecipeCard};
use crate::db::Database;
use crate::estimator::{MealSlot, FIBER_TARGET_GRAMS};
use crate::models::{
    MealTarget, RecipeLineCreate, RecommendationEntry, RecommendationEntryCreate,
};

use super::chat::load_user_data;

/// Response for get_recipe_recommendation
#[derive(Debug, Serialize)]
pub struct RecommendationToolResponse {
    pub meal_type: MealSlot,
    pub recipes: Vec<RecipeCard>,
    pub history_id: i64,
}

/// Ask the backend for recipes for the given meal (lunch when omitted).
pub async fn get_recipe_recommendation(
    db: &Database,
    backend: &BackendClient,
    meal_type: Option<&str>,
) -> Result<RecommendationToolResponse, String> {
    let slot = match meal_type {
        Some(s) => MealSlot::parse(s)
            .ok_or_else(|| format!("meal_type must be breakfast, lunch, or dinner, got '{}'", s))?,
        None => MealSlot::Lunch,
    };

    let user_data = load_user_data(db)?;

    let response = backend
        .recommend_recipes(&user_data)
        .await
        .map_err(|e| format!("Recommendation request failed: {}", e))?;

    if response.recipes.is_empty() {
        return Err("Backend returned no recipes".to_string());
    }

    let target = db
        .with_conn(|conn| MealTarget::get(conn, slot))
        .map_err(|e| format!("Database error: {}", e))?;

    let data = RecommendationEntryCreate {
        meal_type: slot,
        health_score: None,
        predicted_glucose: None,
        carb: target.as_ref().map(|t| t.carb_g as f64),
        protein: target.as_ref().map(|t| t.protein_g as f64),
        fat: target.as_ref().map(|t| t.fat_g as f64),
        fiber: Some(FIBER_TARGET_GRAMS),
        recipes: response
            .recipes
            .iter()
            .map(|card| RecipeLineCreate {
                name: card.name.clone(),
                description: card.description.clone(),
            })
            .collect(),
    };

    let entry = db
        .with_conn_mut(|conn| RecommendationEntry::create(conn, &data))
        .map_err(|e| format!("Failed to record recommendation: {}", e))?;

    Ok(RecommendationToolResponse {
        meal_type: slot,
        recipes: response.recipes,
        history_id: entry.id,
    })
}
