//! Backend HTTP client
//!
//! Thin typed wrapper over the backend's four endpoints.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::types::{
    ChatReply, ChatRequest, MessageAck, PrefUpdate, RecommendationResponse, UserDataUpload,
};

/// Fallback base URL when GLYCO_BACKEND_URL is not set
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Backend error types
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status} for {endpoint}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },
}

/// Result type for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

/// Client for the recommendation backend
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, body: &B) -> BackendResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("POST {}", url);

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status { endpoint, status });
        }

        Ok(response.json().await?)
    }

    /// Push the profile and its nutrient needs to `/api/user-data`
    pub async fn upload_user_data(&self, data: &UserDataUpload) -> BackendResult<MessageAck> {
        self.post_json("/api/user-data", data).await
    }

    /// Send a chat message with the user's profile to `/chat`
    pub async fn chat(&self, request: &ChatRequest) -> BackendResult<ChatReply> {
        self.post_json("/chat", request).await
    }

    /// Ask `/get_recipe_recommendation` for recipe cards
    pub async fn recommend_recipes(
        &self,
        data: &UserDataUpload,
    ) -> BackendResult<RecommendationResponse> {
        self.post_json("/get_recipe_recommendation", data).await
    }

    /// Report a recipe rating to `/update_pref`
    pub async fn update_preference(&self, update: &PrefUpdate) -> BackendResult<MessageAck> {
        self.post_json("/update_pref", update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = BackendClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_default_backend_url_parses() {
        assert!(reqwest::Url::parse(DEFAULT_BACKEND_URL).is_ok());
    }
}
