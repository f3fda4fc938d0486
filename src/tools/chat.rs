//! Chat tools
//!
//! A chat message is recorded locally, dispatched to the backend with the
//! stored profile attached, and the reply is reduced back into the store.
//! Replies that carry a recipe recommendation also produce a history entry.

use serde::Serialize;

use crate::backend::{BackendClient, ChatRequest, UserDataUpload};
use crate::db::Database;
use crate::models::{
    ChatMessage, ChatRole, HealthProfile, MealTarget, RecipeLineCreate, RecommendationDetail,
    RecommendationEntry, RecommendationEntryCreate,
};

/// Response for the chat tool
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Present when the reply was recorded as a recommendation
    pub history_entry: Option<RecommendationDetail>,
}

/// Response for get_chat_transcript
#[derive(Debug, Serialize)]
pub struct ChatTranscriptResponse {
    pub messages: Vec<ChatMessage>,
    pub total: usize,
}

/// Response for clear_chat_transcript
#[derive(Debug, Serialize)]
pub struct ClearChatResponse {
    pub deleted: usize,
}

/// Load the stored profile as a backend payload.
pub(crate) fn load_user_data(db: &Database) -> Result<UserDataUpload, String> {
    let (profile, targets) = db
        .with_conn(|conn| {
            let profile = HealthProfile::get(conn)?;
            let targets = MealTarget::get_all(conn)?;
            Ok((profile, targets))
        })
        .map_err(|e| format!("Database error: {}", e))?;

    let profile = profile
        .ok_or_else(|| "No health profile stored. Call submit_health_profile first.".to_string())?;
    let plan = MealTarget::to_plan(&targets)
        .ok_or_else(|| "Meal targets missing. Call submit_health_profile again.".to_string())?;

    Ok(UserDataUpload::from_profile(&profile, &plan))
}

/// Send a message to the assistant backend.
pub async fn chat(
    db: &Database,
    backend: &BackendClient,
    message: &str,
) -> Result<ChatResponse, String> {
    let message = message.trim();
    if message.is_empty() {
        return Err("Message cannot be empty".to_string());
    }

    let user_data = load_user_data(db)?;

    // The user message is part of the transcript even if the backend is
    // unreachable afterwards.
    db.with_conn(|conn| ChatMessage::append(conn, ChatRole::User, message))
        .map_err(|e| format!("Failed to record message: {}", e))?;

    let request = ChatRequest {
        message: message.to_string(),
        user_data,
    };
    let reply = backend
        .chat(&request)
        .await
        .map_err(|e| format!("Chat request failed: {}", e))?;

    db.with_conn(|conn| ChatMessage::append(conn, ChatRole::Assistant, &reply.message))
        .map_err(|e| format!("Failed to record reply: {}", e))?;

    let history_entry = match reply.meal_type {
        Some(meal_type) if reply.has_recommendation() => {
            let recipes = reply
                .recommendations
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(|name| RecipeLineCreate {
                    name,
                    description: None,
                })
                .collect();
            let data = RecommendationEntryCreate {
                meal_type,
                health_score: reply.health_score,
                predicted_glucose: reply.predicted_glucose,
                carb: reply.carb,
                protein: reply.protein,
                fat: reply.fat,
                fiber: reply.fiber,
                recipes,
            };
            let entry = db
                .with_conn_mut(|conn| RecommendationEntry::create(conn, &data))
                .map_err(|e| format!("Failed to record recommendation: {}", e))?;
            Some(entry)
        }
        _ => None,
    };

    Ok(ChatResponse {
        reply: reply.message,
        history_entry,
    })
}

/// Fetch the most recent transcript messages, oldest first.
pub fn get_chat_transcript(db: &Database, limit: i64) -> Result<ChatTranscriptResponse, String> {
    let messages = db
        .with_conn(|conn| ChatMessage::list_recent(conn, limit))
        .map_err(|e| format!("Failed to load transcript: {}", e))?;

    let total = messages.len();
    Ok(ChatTranscriptResponse { messages, total })
}

/// Delete the stored transcript.
pub fn clear_chat_transcript(db: &Database) -> Result<ClearChatResponse, String> {
    let deleted = db
        .with_conn(|conn| ChatMessage::clear(conn))
        .map_err(|e| format!("Failed to clear transcript: {}", e))?;

    Ok(ClearChatResponse { deleted })
}
