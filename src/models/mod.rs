//! Data models
//!
//! Rust structs representing locally persisted assistant state.

mod chat;
mod history;
mod meal_plan;
mod profile;

pub use chat::{ChatMessage, ChatRole};
pub use history::{
    HistoryRecipe, RecipeLineCreate, RecommendationDetail, RecommendationEntry,
    RecommendationEntryCreate,
};
pub use meal_plan::MealTarget;
pub use profile::{HealthProfile, HealthProfileCreate};
