//! The seam between the workflow controller and the analysis backend.

use async_trait::async_trait;
use review_client::{
    CategorizeResponse, CategorizedResult, ClientError, ExtractResponse, HeartbeatResponse,
    MatchResponse, MessageResponse, ReviewClient, StartSessionRequest, StartSessionResponse,
};

use crate::credentials::ApiKey;

pub type BackendResult<T> = std::result::Result<T, ClientError>;

/// Remote operations the workflow depends on.
///
/// Implemented by [`ReviewClient`] for real use and by
/// [`MockBackend`](crate::testing::MockBackend) in tests.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn configure(&self, api_key: &ApiKey) -> BackendResult<MessageResponse>;

    async fn heartbeat(&self) -> BackendResult<HeartbeatResponse>;

    async fn start_session(&self, request: &StartSessionRequest) -> BackendResult<StartSessionResponse>;

    async fn extract(&self, session_id: &str) -> BackendResult<ExtractResponse>;

    async fn match_attributes(&self, session_id: &str) -> BackendResult<MatchResponse>;

    async fn categorize(&self, session_id: &str) -> BackendResult<CategorizeResponse>;

    async fn toggle_parallel_processing(&self) -> BackendResult<MessageResponse>;

    async fn full_pipeline(&self, request: &StartSessionRequest) -> BackendResult<CategorizedResult>;
}

#[async_trait]
impl AnalysisBackend for ReviewClient {
    async fn configure(&self, api_key: &ApiKey) -> BackendResult<MessageResponse> {
        ReviewClient::configure(self, api_key.expose()).await
    }

    async fn heartbeat(&self) -> BackendResult<HeartbeatResponse> {
        ReviewClient::heartbeat(self).await
    }

    async fn start_session(&self, request: &StartSessionRequest) -> BackendResult<StartSessionResponse> {
        ReviewClient::start_session(self, request).await
    }

    async fn extract(&self, session_id: &str) -> BackendResult<ExtractResponse> {
        ReviewClient::extract(self, session_id).await
    }

    async fn match_attributes(&self, session_id: &str) -> BackendResult<MatchResponse> {
        ReviewClient::match_attributes(self, session_id).await
    }

    async fn categorize(&self, session_id: &str) -> BackendResult<CategorizeResponse> {
        ReviewClient::categorize(self, session_id).await
    }

    async fn toggle_parallel_processing(&self) -> BackendResult<MessageResponse> {
        ReviewClient::toggle_parallel_processing(self).await
    }

    async fn full_pipeline(&self, request: &StartSessionRequest) -> BackendResult<CategorizedResult> {
        ReviewClient::full_pipeline(self, request).await
    }
}
