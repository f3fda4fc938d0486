//! Glyco MCP Server Implementation
//!
//! Implements the MCP server with all Glyco tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::backend::BackendClient;
use crate::db::Database;
use crate::tools::status::StatusTracker;
use crate::tools::{chat, history, profile, recommend};

/// Glyco MCP Service
#[derive(Clone)]
pub struct GlycoService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    backend: BackendClient,
    tool_router: ToolRouter<GlycoService>,
}

impl GlycoService {
    pub fn new(database_path: PathBuf, database: Database, backend: BackendClient) -> Self {
        let status_tracker = StatusTracker::new(database_path, backend.base_url().to_string());
        Self {
            status_tracker: Arc::new(Mutex::new(status_tracker)),
            database,
            backend,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SubmitHealthProfileParams {
    /// Height in centimeters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// Age in whole years
    pub age: i64,
    /// Gender: male or female
    pub gender: String,
    /// Activity level: sedentary, lightly_active, moderately_active, very_active, extra_active
    pub activity_level: String,
    /// Pre-meal blood glucose in mmol/L (optional)
    pub pre_meal_glucose: Option<f64>,
    /// Pre-meal insulin dose in units (optional)
    pub pre_meal_insulin: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateNutrientNeedsParams {
    /// Height in centimeters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// Age in whole years
    pub age: i64,
    /// Gender: male or female
    pub gender: String,
    /// Activity level: sedentary, lightly_active, moderately_active, very_active, extra_active
    pub activity_level: String,
}

// ============================================================================
// Chat Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ChatParams {
    /// Message to send to the assistant backend
    pub message: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetChatTranscriptParams {
    /// Maximum messages to return (default 50)
    #[serde(default = "default_transcript_limit")]
    pub limit: i64,
}

fn default_transcript_limit() -> i64 { 50 }

// ============================================================================
// Recommendation Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecipeRecommendationParams {
    /// Meal slot: breakfast, lunch, or dinner (defaults to lunch)
    pub meal_type: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecommendationHistoryParams {
    /// Maximum entries to return (default 20)
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecommendationEntryParams {
    /// History entry ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RateRecipeParams {
    /// History entry ID the recipe belongs to
    pub history_id: i64,
    /// Recipe name exactly as it appears on the entry
    pub recipe: String,
    /// Rating on the 1-5 star scale
    pub rating: f64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl GlycoService {
    // --- Status ---

    #[tool(description = "Get the current status of the Glyco service including build info, database status, backend URL, and process information")]
    async fn glyco_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for using the Glyco assistant tools. Call this when starting a session or when unsure about the workflow.")]
    fn assistant_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ASSISTANT_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ASSISTANT_INSTRUCTIONS)]))
    }

    // --- Health Profile ---

    #[tool(description = "Submit the user's health profile. Computes BMR, TDEE and per-meal macro targets, stores them locally, and syncs the profile to the recommendation backend.")]
    async fn submit_health_profile(&self, Parameters(p): Parameters<SubmitHealthProfileParams>) -> Result<CallToolResult, McpError> {
        let input = profile::parse_profile_input(
            p.height, p.weight, p.age, &p.gender, &p.activity_level,
            p.pre_meal_glucose, p.pre_meal_insulin,
        ).map_err(|e| McpError::internal_error(e, None))?;
        let result = profile::submit_health_profile(&self.database, &self.backend, input)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get the stored health profile with its meal macro targets")]
    fn get_health_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_health_profile(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(profile) => serde_json::to_string_pretty(&profile),
            None => Ok(r#"{"error": "No health profile stored"}"#.to_string()),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Estimate BMR, TDEE and per-meal macro targets for the given inputs without storing anything")]
    fn estimate_nutrient_needs(&self, Parameters(p): Parameters<EstimateNutrientNeedsParams>) -> Result<CallToolResult, McpError> {
        let input = profile::parse_profile_input(
            p.height, p.weight, p.age, &p.gender, &p.activity_level, None, None,
        ).map_err(|e| McpError::internal_error(e, None))?;
        let result = profile::estimate_nutrient_needs(&input).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Chat ---

    #[tool(description = "Send a chat message to the assistant backend with the stored profile attached. Recipe recommendations in the reply are recorded in the history.")]
    async fn chat(&self, Parameters(p): Parameters<ChatParams>) -> Result<CallToolResult, McpError> {
        let result = chat::chat(&self.database, &self.backend, &p.message)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get the most recent chat transcript messages in chronological order")]
    fn get_chat_transcript(&self, Parameters(p): Parameters<GetChatTranscriptParams>) -> Result<CallToolResult, McpError> {
        let result = chat::get_chat_transcript(&self.database, p.limit).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete the stored chat transcript")]
    fn clear_chat_transcript(&self) -> Result<CallToolResult, McpError> {
        let result = chat::clear_chat_transcript(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Recommendations ---

    #[tool(description = "Request recipe recommendations from the backend for a meal and record them in the history")]
    async fn get_recipe_recommendation(&self, Parameters(p): Parameters<GetRecipeRecommendationParams>) -> Result<CallToolResult, McpError> {
        let result = recommend::get_recipe_recommendation(&self.database, &self.backend, p.meal_type.as_deref())
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List recent recommendation history entries, newest first, with their recipes and ratings")]
    fn list_recommendation_history(&self, Parameters(p): Parameters<ListRecommendationHistoryParams>) -> Result<CallToolResult, McpError> {
        let result = history::list_recommendation_history(&self.database, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get one recommendation history entry with its recipes")]
    fn get_recommendation_entry(&self, Parameters(p): Parameters<GetRecommendationEntryParams>) -> Result<CallToolResult, McpError> {
        let result = history::get_recommendation_entry(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(entry) => serde_json::to_string_pretty(&entry),
            None => Ok(format!(r#"{{"error": "History entry not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Rate a recommended recipe (1-5 stars). The rating is reported to the backend for preference learning, then recorded locally.")]
    async fn rate_recipe(&self, Parameters(p): Parameters<RateRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = history::rate_recipe(&self.database, &self.backend, p.history_id, &p.recipe, p.rating)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for GlycoService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "glyco".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Glyco Diet & Glucose Assistant".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Glyco - companion service for a diet and glucose management assistant. \
                 IMPORTANT: Call assistant_instructions for the workflow guide. \
                 Profile: submit_health_profile (required before chat/recipes), get_health_profile, \
                 estimate_nutrient_needs (pure what-if). \
                 Chat: chat, get_chat_transcript, clear_chat_transcript. \
                 Recipes: get_recipe_recommendation, list_recommendation_history, \
                 get_recommendation_entry, rate_recipe (1-5 stars). \
                 Status: glyco_status."
                    .into(),
            ),
        }
    }
}
