//! Typed client for the StudyLens backend API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use studylens_core::error::LensError;
use studylens_core::types::{
    HealthCheck, HistoryPage, ImageUploadRequest, PlansResponse, ProcessingResponse, UserProfile,
    UserUsage,
};
use studylens_core::ProcessingBackend;

use crate::token::{NoAuth, TokenProvider};

/// Default backend address for local development.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP client for the StudyLens backend.
///
/// Owns header normalization, bearer auth, and error decoding, so callers
/// only ever see typed responses or [`LensError`]. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            tokens,
        }
    }

    /// Client for anonymous endpoints (health, plans).
    pub fn anonymous() -> Self {
        Self::new(Arc::new(NoAuth))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Swap in a preconfigured `reqwest` client (timeouts, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    // --- Endpoints ---------------------------------------------------------

    pub async fn health(&self) -> Result<HealthCheck, LensError> {
        self.get_json("/health").await
    }

    pub async fn user_profile(&self) -> Result<UserProfile, LensError> {
        self.get_json("/user/profile").await
    }

    pub async fn user_usage(&self) -> Result<UserUsage, LensError> {
        self.get_json("/user/usage").await
    }

    /// Submit an image for OCR + LLM processing.
    pub async fn process_image(
        &self,
        request: &ImageUploadRequest,
    ) -> Result<ProcessingResponse, LensError> {
        debug!(
            bytes = request.image_data.len(),
            subject = request.subject.as_deref().unwrap_or("-"),
            "Submitting image for processing"
        );
        let builder = self
            .client
            .post(format!("{}/process", self.base_url))
            .json(request);
        self.send(builder).await
    }

    /// Fetch a stored processing result by request id.
    pub async fn processing_result(
        &self,
        request_id: &str,
    ) -> Result<ProcessingResponse, LensError> {
        self.get_json(&format!("/process/{}", request_id)).await
    }

    pub async fn history(&self, limit: u32) -> Result<HistoryPage, LensError> {
        self.get_json(&format!("/history?limit={}", limit)).await
    }

    pub async fn plans(&self) -> Result<PlansResponse, LensError> {
        self.get_json("/plans").await
    }

    // --- Request plumbing --------------------------------------------------

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LensError> {
        let builder = self.client.get(format!("{}{}", self.base_url, path));
        self.send(builder).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, LensError> {
        let mut builder = builder.header("Content-Type", "application/json");
        if let Some(token) = self.tokens.bearer_token() {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LensError::Network(e.to_string()))?;

        // Read the body before branching on the status; failure bodies carry
        // the message the user should see.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LensError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(LensError::Transport {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| LensError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProcessingBackend for ApiClient {
    fn name(&self) -> &str {
        "remote"
    }

    async fn process_image(
        &self,
        request: &ImageUploadRequest,
    ) -> Result<ProcessingResponse, LensError> {
        ApiClient::process_image(self, request).await
    }
}

/// Normalized message for a failed response: the body's `message`, then its
/// `error`, then a synthesized `HTTP {status}: {reason}` line.
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
            return message;
        }
        if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
            return error;
        }
    }

    match status.canonical_reason() {
        Some(reason) => format!("HTTP {}: {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}
