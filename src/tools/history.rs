//! Recommendation history tools
//!
//! Listing past recommendations and rating individual recipes. A rating is
//! reported to the backend first and only recorded locally once the report
//! succeeds.

use serde::Serialize;

use crate::backend::{BackendClient, PrefUpdate};
use crate::db::Database;
use crate::models::{HistoryRecipe, RecommendationDetail, RecommendationEntry};

/// Rating bounds for the 1-5 star scale
const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

/// Response for list_recommendation_history
#[derive(Debug, Serialize)]
pub struct HistoryListResponse {
    pub entries: Vec<RecommendationDetail>,
    pub total: usize,
}

/// Response for rate_recipe
#[derive(Debug, Serialize)]
pub struct RateRecipeResponse {
    pub recipe: String,
    pub rating: f64,
    pub backend_message: Option<String>,
}

/// Most recent history entries, newest first.
pub fn list_recommendation_history(
    db: &Database,
    limit: i64,
) -> Result<HistoryListResponse, String> {
    let entries = db
        .with_conn(|conn| RecommendationEntry::list_recent(conn, limit))
        .map_err(|e| format!("Failed to load history: {}", e))?;

    let total = entries.len();
    Ok(HistoryListResponse { entries, total })
}

/// One history entry with its recipes.
pub fn get_recommendation_entry(
    db: &Database,
    id: i64,
) -> Result<Option<RecommendationDetail>, String> {
    db.with_conn(|conn| RecommendationEntry::get(conn, id))
        .map_err(|e| format!("Failed to load history entry: {}", e))
}

/// Rate a recipe from a history entry on the 1-5 star scale.
pub async fn rate_recipe(
    db: &Database,
    backend: &BackendClient,
    history_id: i64,
    recipe: &str,
    rating: f64,
) -> Result<RateRecipeResponse, String> {
    if !rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        ));
    }

    let known = db
        .with_conn(|conn| HistoryRecipe::find(conn, history_id, recipe))
        .map_err(|e| format!("Database error: {}", e))?;
    if known.is_none() {
        return Err(format!(
            "Recipe '{}' not found on history entry {}",
            recipe, history_id
        ));
    }

    let update = PrefUpdate {
        recipe: recipe.to_string(),
        rating,
    };
    let ack = backend
        .update_preference(&update)
        .await
        .map_err(|e| format!("Rating upload failed: {}", e))?;

    db.with_conn(|conn| HistoryRecipe::set_rating(conn, history_id, recipe, rating))
        .map_err(|e| format!("Failed to record rating: {}", e))?;

    Ok(RateRecipeResponse {
        recipe: recipe.to_string(),
        rating,
        backend_message: ack.message,
    })
}
