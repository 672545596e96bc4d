//! REST client for the review insight analysis backend.
//!
//! A thin binding over the backend's JSON endpoints. Every call is a single
//! request/response pair; there is no retry, batching, or streaming.
//!
//! # Example
//!
//! ```rust,ignore
//! use review_client::{ReviewClient, StartSessionRequest};
//!
//! let client = ReviewClient::new("http://localhost:8000");
//! client.configure("my-gemini-key").await?;
//!
//! let session = client
//!     .start_session(&StartSessionRequest {
//!         seller_description: "Waterproof hiking boots".into(),
//!         reviews: vec!["Leaked on the first day".into()],
//!     })
//!     .await?;
//!
//! let extraction = client.extract(&session.session_id).await?;
//! println!("{}", extraction.markdown);
//! ```

pub mod error;
pub mod types;

pub use error::{ClientError, Result};
pub use types::*;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// Backend address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Review analysis backend client.
#[derive(Debug, Clone)]
pub struct ReviewClient {
    http_client: Client,
    base_url: String,
}

impl Default for ReviewClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ReviewClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom TLS).
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configure the LLM API key on the backend.
    pub async fn configure(&self, api_key: &str) -> Result<MessageResponse> {
        self.post("/configure", &ApiKeyRequest { api_key }).await
    }

    /// Liveness check. The backend rejects this until a key is configured.
    pub async fn heartbeat(&self) -> Result<HeartbeatResponse> {
        self.get("/heartbeat").await
    }

    /// Start an analysis session and receive its identifier.
    pub async fn start_session(&self, request: &StartSessionRequest) -> Result<StartSessionResponse> {
        self.post("/start_session", request).await
    }

    /// Step 1: extract attributes from the session's reviews.
    pub async fn extract(&self, session_id: &str) -> Result<ExtractResponse> {
        self.post("/extract", &SessionIdRequest { session_id }).await
    }

    /// Step 2: match extracted attributes against the seller description.
    pub async fn match_attributes(&self, session_id: &str) -> Result<MatchResponse> {
        self.post("/match", &SessionIdRequest { session_id }).await
    }

    /// Step 3: group matched attributes by status and category.
    pub async fn categorize(&self, session_id: &str) -> Result<CategorizeResponse> {
        self.post("/categorize", &SessionIdRequest { session_id }).await
    }

    /// Flip the backend between parallel and serial processing.
    pub async fn toggle_parallel_processing(&self) -> Result<MessageResponse> {
        self.get("/set_num_worker").await
    }

    /// Run every step in one call without creating a session.
    pub async fn full_pipeline(&self, request: &StartSessionRequest) -> Result<CategorizedResult> {
        self.post("/full_pipeline", request).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http_client.get(&url).send().await.map_err(|e| {
            warn!(path, error = %e, "Backend request failed");
            ClientError::Network(e)
        })?;
        decode(path, response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(path, error = %e, "Backend request failed");
                ClientError::Network(e)
            })?;
        decode(path, response).await
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_response(status.as_u16(), &body);
        warn!(path, status = %status, error = %err, "Backend returned an error");
        return Err(err);
    }

    let bytes = response.bytes().await?;
    debug!(path, bytes = bytes.len(), "Backend response received");
    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::Parse(format!("Unexpected response from {}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = ReviewClient::new("https://reviews.example.com/");
        assert_eq!(client.base_url(), "https://reviews.example.com");
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(ReviewClient::default().base_url(), "http://localhost:8000");
    }
}
