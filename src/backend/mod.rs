//! Recommendation backend collaborator
//!
//! The recommendation/prediction backend is opaque: this module only knows
//! its HTTP endpoints and their JSON payload shapes.

pub mod client;
pub mod types;

pub use client::{BackendClient, BackendError, DEFAULT_BACKEND_URL};
pub use types::{
    ChatReply, ChatRequest, MealNutrientNeeds, MessageAck, NutrientNeeds, PrefUpdate,
    RecipeCard, RecommendationResponse, UserDataUpload,
};
