//! The gated analysis workflow.
//!
//! The controller owns all per-run state and sequences the backend calls:
//! configure → start session → extract → match → categorize. Each action
//! checks its prerequisites locally before any request is sent, so a step can
//! never run ahead of the one it depends on.
//!
//! Failures are terminal for that attempt: nothing is retried and nothing
//! already stored is rolled back. The caller re-invokes the action.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut workflow = WorkflowController::new(ReviewClient::new(url));
//! workflow.configure(&ApiKey::new(key)).await?;
//! workflow.submit_input(description, "Great fit\nRuns small").await?;
//! workflow.extract().await?;
//! workflow.match_attributes().await?;
//! let report = workflow.categorize().await?;
//! ```

use review_client::{
    CategorizeResponse, CategorizedResult, ExtractResponse, MatchResponse, StartSessionRequest,
};
use tracing::{debug, info, warn};

use crate::backend::AnalysisBackend;
use crate::credentials::ApiKey;
use crate::error::{Result, WorkflowError};
use crate::input::parse_reviews;
use crate::status::ServerStatus;
use crate::step::{Step, StepState};

pub struct WorkflowController<B> {
    backend: B,
    status: ServerStatus,
    configured: bool,
    configuring: bool,
    credential_error: Option<String>,
    input: Option<StartSessionRequest>,
    session: StepState<String>,
    extraction: StepState<ExtractResponse>,
    matching: StepState<MatchResponse>,
    categorization: StepState<CategorizeResponse>,
}

impl<B: AnalysisBackend> WorkflowController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            status: ServerStatus::default(),
            configured: false,
            configuring: false,
            credential_error: None,
            input: None,
            session: StepState::Absent,
            extraction: StepState::Absent,
            matching: StepState::Absent,
            categorization: StepState::Absent,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // --- Gating flags ---

    pub fn status(&self) -> &ServerStatus {
        &self.status
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn is_configuring(&self) -> bool {
        self.configuring
    }

    /// Message from the last failed configuration attempt.
    pub fn credential_error(&self) -> Option<&str> {
        self.credential_error.as_deref()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_ready()
    }

    pub fn is_starting_session(&self) -> bool {
        self.session.is_loading()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.ready().map(String::as_str)
    }

    pub fn has_extraction(&self) -> bool {
        self.extraction.is_ready()
    }

    pub fn has_match(&self) -> bool {
        self.matching.is_ready()
    }

    pub fn has_categorization(&self) -> bool {
        self.categorization.is_ready()
    }

    pub fn is_loading(&self, step: Step) -> bool {
        match step {
            Step::Extract => self.extraction.is_loading(),
            Step::Match => self.matching.is_loading(),
            Step::Categorize => self.categorization.is_loading(),
        }
    }

    pub fn is_complete(&self, step: Step) -> bool {
        match step {
            Step::Extract => self.has_extraction(),
            Step::Match => self.has_match(),
            Step::Categorize => self.has_categorization(),
        }
    }

    /// Whether `step` may be triggered right now.
    pub fn can_run(&self, step: Step) -> bool {
        self.check_step(step).is_ok()
    }

    /// The first step that may be triggered right now.
    pub fn next_step(&self) -> Option<Step> {
        Step::all().iter().copied().find(|step| self.can_run(*step))
    }

    // --- Stored results ---

    /// Input submitted for the current (or last attempted) session.
    pub fn input(&self) -> Option<&StartSessionRequest> {
        self.input.as_ref()
    }

    pub fn extraction(&self) -> Option<&ExtractResponse> {
        self.extraction.ready()
    }

    pub fn matching(&self) -> Option<&MatchResponse> {
        self.matching.ready()
    }

    pub fn categorization(&self) -> Option<&CategorizeResponse> {
        self.categorization.ready()
    }

    // --- Actions ---

    /// Configure the API key on the backend and confirm it is alive.
    ///
    /// Discards the session and every step result first, whatever the outcome.
    pub async fn configure(&mut self, api_key: &ApiKey) -> Result<()> {
        if self.configuring {
            return Err(WorkflowError::ConfigurationInProgress);
        }
        if api_key.is_empty() {
            let err = WorkflowError::EmptyCredential;
            self.credential_error = Some(err.to_string());
            return Err(err);
        }

        self.configuring = true;
        self.configured = false;
        self.credential_error = None;
        self.status = ServerStatus::Configuring;
        self.clear_session();

        let result = self.configure_and_check(api_key).await;

        self.configuring = false;
        if let Err(err) = &result {
            self.credential_error = Some(err.to_string());
        }
        result
    }

    async fn configure_and_check(&mut self, api_key: &ApiKey) -> Result<()> {
        info!("Configuring API key on backend");
        let configured = self.backend.configure(api_key).await;
        if let Err(err) = configured {
            warn!(error = %err, "API key configuration failed");
            self.status = ServerStatus::ConfigurationFailed;
            return Err(WorkflowError::remote("Configuration failed", &err));
        }

        self.configured = true;
        self.status = ServerStatus::CheckingHeartbeat;

        let heartbeat = self.backend.heartbeat().await;
        match heartbeat {
            Ok(heartbeat) if heartbeat.is_success() => {
                self.status = ServerStatus::Online;
                info!("Backend online");
                Ok(())
            }
            Ok(heartbeat) => {
                warn!(status = %heartbeat.status, "Heartbeat reported failure");
                self.configured = false;
                self.status = ServerStatus::reported(&heartbeat.status);
                Err(WorkflowError::HeartbeatFailed {
                    status: heartbeat.status,
                })
            }
            Err(err) => {
                warn!(error = %err, "Heartbeat check failed");
                self.configured = false;
                self.status = ServerStatus::Offline;
                Err(WorkflowError::remote("Heartbeat check failed", &err))
            }
        }
    }

    /// Parse raw review text and start a session with it.
    pub async fn submit_input(&mut self, seller_description: &str, reviews_text: &str) -> Result<&str> {
        let reviews = parse_reviews(reviews_text)?;
        self.start_session(seller_description, reviews).await
    }

    /// Start a new analysis session, discarding any previous one.
    pub async fn start_session(&mut self, seller_description: &str, reviews: Vec<String>) -> Result<&str> {
        if !self.configured {
            return Err(WorkflowError::NotConfigured);
        }
        if self.session.is_loading() {
            return Err(WorkflowError::SessionInProgress);
        }
        if seller_description.trim().is_empty() {
            return Err(WorkflowError::EmptyDescription);
        }
        if reviews.is_empty() {
            return Err(WorkflowError::NoReviews);
        }

        let request = StartSessionRequest {
            seller_description: seller_description.to_string(),
            reviews,
        };
        self.clear_session();
        self.session = StepState::Loading;
        self.input = Some(request.clone());

        info!(reviews = request.reviews.len(), "Starting analysis session");
        let started = self.backend.start_session(&request).await;
        match started {
            Ok(response) => {
                info!(session_id = %response.session_id, "Session started");
                Ok(self.session.store(response.session_id).as_str())
            }
            Err(err) => {
                warn!(error = %err, "Failed to start session");
                self.session.reset();
                Err(WorkflowError::remote("Failed to start session", &err))
            }
        }
    }

    /// Step 1: extract attributes from the session's reviews.
    pub async fn extract(&mut self) -> Result<&ExtractResponse> {
        let session_id = self.check_step(Step::Extract)?.to_string();
        self.extraction = StepState::Loading;

        info!(%session_id, "Requesting attribute extraction");
        let extracted = self.backend.extract(&session_id).await;
        match extracted {
            Ok(response) => {
                debug!(reviews = response.extracted_attributes.len(), "Extraction complete");
                Ok(self.extraction.store(response))
            }
            Err(err) => {
                warn!(%session_id, error = %err, "Extraction failed");
                self.extraction.reset();
                Err(WorkflowError::remote("Failed to extract attributes", &err))
            }
        }
    }

    /// Step 2: match extracted attributes against the seller description.
    pub async fn match_attributes(&mut self) -> Result<&MatchResponse> {
        let session_id = self.check_step(Step::Match)?.to_string();
        self.matching = StepState::Loading;

        info!(%session_id, "Requesting attribute matching");
        let matched = self.backend.match_attributes(&session_id).await;
        match matched {
            Ok(response) => {
                debug!(tables = response.all_dataframes.len(), "Matching complete");
                Ok(self.matching.store(response))
            }
            Err(err) => {
                warn!(%session_id, error = %err, "Matching failed");
                self.matching.reset();
                Err(WorkflowError::remote("Failed to match attributes", &err))
            }
        }
    }

    /// Step 3: group matched attributes by status and category.
    pub async fn categorize(&mut self) -> Result<&CategorizeResponse> {
        let session_id = self.check_step(Step::Categorize)?.to_string();
        self.categorization = StepState::Loading;

        info!(%session_id, "Requesting categorization");
        let categorized = self.backend.categorize(&session_id).await;
        match categorized {
            Ok(response) => {
                debug!(items = response.item_count(), "Categorization complete");
                Ok(self.categorization.store(response))
            }
            Err(err) => {
                warn!(%session_id, error = %err, "Categorization failed");
                self.categorization.reset();
                Err(WorkflowError::remote("Failed to categorize attributes", &err))
            }
        }
    }

    /// Run `step`, whichever it is.
    pub async fn run_step(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Extract => self.extract().await.map(|_| ()),
            Step::Match => self.match_attributes().await.map(|_| ()),
            Step::Categorize => self.categorize().await.map(|_| ()),
        }
    }

    /// Flip backend parallel processing. Independent of the session gating.
    pub async fn toggle_parallel_processing(&self) -> Result<String> {
        let toggled = self.backend.toggle_parallel_processing().await;
        match toggled {
            Ok(response) => {
                info!(message = %response.message, "Toggled parallel processing");
                Ok(response.message)
            }
            Err(err) => Err(WorkflowError::remote("Failed to toggle parallel processing", &err)),
        }
    }

    /// Run every step in one backend call. No session is created and the
    /// current session is left untouched.
    pub async fn run_full_pipeline(
        &self,
        seller_description: &str,
        reviews: Vec<String>,
    ) -> Result<CategorizedResult> {
        if !self.configured {
            return Err(WorkflowError::NotConfigured);
        }
        if seller_description.trim().is_empty() {
            return Err(WorkflowError::EmptyDescription);
        }
        if reviews.is_empty() {
            return Err(WorkflowError::NoReviews);
        }

        let request = StartSessionRequest {
            seller_description: seller_description.to_string(),
            reviews,
        };
        info!(reviews = request.reviews.len(), "Running full pipeline");
        let result = self.backend.full_pipeline(&request).await;
        result.map_err(|err| WorkflowError::remote("Full pipeline failed", &err))
    }

    fn check_step(&self, step: Step) -> Result<&str> {
        if !self.configured {
            return Err(WorkflowError::NotConfigured);
        }
        let session_id = self.session_id().ok_or(WorkflowError::NoSession)?;
        if let Some(required) = step.prerequisite() {
            if !self.is_complete(required) {
                return Err(WorkflowError::PrerequisiteMissing { step, required });
            }
        }
        if self.is_loading(step) {
            return Err(WorkflowError::InProgress(step));
        }
        if self.is_complete(step) {
            return Err(WorkflowError::AlreadyComplete(step));
        }
        Ok(session_id)
    }

    fn clear_session(&mut self) {
        self.session.reset();
        self.extraction.reset();
        self.matching.reset();
        self.categorization.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Endpoint, MockBackend, MockCall};

    fn reviews() -> Vec<String> {
        vec!["The case is red".into(), "Battery lasts 10 hours".into()]
    }

    async fn configured() -> WorkflowController<MockBackend> {
        let mut workflow = WorkflowController::new(MockBackend::new());
        workflow.configure(&ApiKey::new("test-key")).await.unwrap();
        workflow
    }

    async fn with_session() -> WorkflowController<MockBackend> {
        let mut workflow = configured().await;
        workflow.start_session("Blue phone case", reviews()).await.unwrap();
        workflow
    }

    async fn fully_run() -> WorkflowController<MockBackend> {
        let mut workflow = with_session().await;
        workflow.extract().await.unwrap();
        workflow.match_attributes().await.unwrap();
        workflow.categorize().await.unwrap();
        workflow
    }

    #[tokio::test]
    async fn test_configure_sets_online() {
        let workflow = configured().await;

        assert!(workflow.is_configured());
        assert!(!workflow.is_configuring());
        assert_eq!(workflow.status(), &ServerStatus::Online);
        assert_eq!(workflow.credential_error(), None);
        assert_eq!(
            workflow.backend().calls(),
            vec![
                MockCall::Configure { api_key: "test-key".into() },
                MockCall::Heartbeat
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_key_rejected_locally() {
        let mut workflow = WorkflowController::new(MockBackend::new());

        let err = workflow.configure(&ApiKey::new("")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyCredential));
        assert_eq!(workflow.credential_error(), Some("API Key cannot be empty."));
        assert!(workflow.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_key_is_sent_to_backend() {
        let backend = MockBackend::new().with_failure(Endpoint::Configure, 400, "Invalid API Key provided.");
        let mut workflow = WorkflowController::new(backend);

        let err = workflow.configure(&ApiKey::new("  ")).await.unwrap_err();
        assert_eq!(err.to_string(), "Configuration failed: Invalid API Key provided.");
        assert_eq!(
            workflow.backend().calls(),
            vec![MockCall::Configure { api_key: "  ".into() }]
        );
    }

    #[tokio::test]
    async fn test_configure_failure_surfaces_detail() {
        let backend = MockBackend::new().with_failure(Endpoint::Configure, 400, "Invalid API Key provided.");
        let mut workflow = WorkflowController::new(backend);

        let err = workflow.configure(&ApiKey::new("bad")).await.unwrap_err();
        assert_eq!(err.to_string(), "Configuration failed: Invalid API Key provided.");
        assert!(!workflow.is_configured());
        assert_eq!(workflow.status(), &ServerStatus::ConfigurationFailed);
        assert_eq!(workflow.backend().call_count(Endpoint::Heartbeat), 0);
    }

    #[tokio::test]
    async fn test_heartbeat_failure_leaves_unconfigured() {
        let backend = MockBackend::new().with_heartbeat_status("heartbeat failed");
        let mut workflow = WorkflowController::new(backend);

        let err = workflow.configure(&ApiKey::new("key")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::HeartbeatFailed { .. }));
        assert!(!workflow.is_configured());
        assert_eq!(workflow.status().label(), "heartbeat failed");
        assert_eq!(
            workflow.credential_error(),
            Some("Heartbeat check failed after configuration.")
        );
    }

    #[tokio::test]
    async fn test_heartbeat_transport_error_is_offline() {
        let backend = MockBackend::new().with_failure(Endpoint::Heartbeat, 503, "unavailable");
        let mut workflow = WorkflowController::new(backend);

        let err = workflow.configure(&ApiKey::new("key")).await.unwrap_err();
        assert_eq!(err.to_string(), "Heartbeat check failed: unavailable");
        assert_eq!(workflow.status(), &ServerStatus::Offline);
        assert!(!workflow.is_configured());
    }

    #[tokio::test]
    async fn test_session_requires_configuration() {
        let mut workflow = WorkflowController::new(MockBackend::new());

        let err = workflow.start_session("desc", reviews()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotConfigured));
        assert!(workflow.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_session_rejects_empty_fields() {
        let mut workflow = configured().await;

        let err = workflow.start_session("   ", reviews()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyDescription));

        let err = workflow.start_session("desc", Vec::new()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NoReviews));

        assert_eq!(workflow.backend().call_count(Endpoint::StartSession), 0);
    }

    #[tokio::test]
    async fn test_steps_gated_in_order() {
        let mut workflow = configured().await;

        assert!(matches!(workflow.extract().await.unwrap_err(), WorkflowError::NoSession));
        assert_eq!(workflow.next_step(), None);

        workflow.start_session("desc", reviews()).await.unwrap();
        assert_eq!(workflow.next_step(), Some(Step::Extract));

        let err = workflow.match_attributes().await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::PrerequisiteMissing { step: Step::Match, required: Step::Extract }
        ));
        let err = workflow.categorize().await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::PrerequisiteMissing { step: Step::Categorize, required: Step::Match }
        ));

        workflow.extract().await.unwrap();
        assert_eq!(workflow.next_step(), Some(Step::Match));
        assert!(!workflow.can_run(Step::Categorize));

        workflow.match_attributes().await.unwrap();
        assert_eq!(workflow.next_step(), Some(Step::Categorize));

        let report = workflow.categorize().await.unwrap();
        assert_eq!(report.item_count(), 2);
        assert_eq!(workflow.next_step(), None);

        // no step request was sent while a prerequisite was missing
        let steps: Vec<Endpoint> = workflow
            .backend()
            .calls()
            .iter()
            .map(MockCall::endpoint)
            .filter(|e| matches!(e, Endpoint::Extract | Endpoint::Match | Endpoint::Categorize))
            .collect();
        assert_eq!(steps, vec![Endpoint::Extract, Endpoint::Match, Endpoint::Categorize]);
    }

    #[tokio::test]
    async fn test_steps_use_session_id() {
        let workflow = fully_run().await;
        let calls = workflow.backend().calls();

        assert!(calls.contains(&MockCall::Extract { session_id: "session-1".into() }));
        assert!(calls.contains(&MockCall::Categorize { session_id: "session-1".into() }));
    }

    #[tokio::test]
    async fn test_completed_step_not_rerun() {
        let mut workflow = with_session().await;
        workflow.extract().await.unwrap();

        let err = workflow.extract().await.unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyComplete(Step::Extract)));
        assert_eq!(workflow.backend().call_count(Endpoint::Extract), 1);
    }

    #[tokio::test]
    async fn test_loading_step_refused() {
        let mut workflow = with_session().await;
        workflow.extraction = StepState::Loading;

        assert!(workflow.is_loading(Step::Extract));
        let err = workflow.extract().await.unwrap_err();
        assert!(matches!(err, WorkflowError::InProgress(Step::Extract)));
        assert_eq!(workflow.backend().call_count(Endpoint::Extract), 0);
    }

    #[tokio::test]
    async fn test_resubmitting_input_clears_results() {
        let mut workflow = fully_run().await;
        assert!(workflow.has_categorization());

        let session = workflow.start_session("New description", reviews()).await.unwrap();
        assert_eq!(session, "session-2");

        assert!(workflow.has_session());
        assert!(!workflow.has_extraction());
        assert!(!workflow.has_match());
        assert!(!workflow.has_categorization());
        assert_eq!(workflow.input().unwrap().seller_description, "New description");
    }

    #[tokio::test]
    async fn test_reconfiguring_clears_session_and_results() {
        let mut workflow = fully_run().await;

        workflow.configure(&ApiKey::new("other-key")).await.unwrap();

        assert!(workflow.is_configured());
        assert!(!workflow.has_session());
        assert!(!workflow.has_extraction());
        assert!(!workflow.has_match());
        assert!(!workflow.has_categorization());
    }

    #[tokio::test]
    async fn test_failed_reconfigure_still_clears_session() {
        let mut workflow = fully_run().await;
        workflow.backend().fail(Endpoint::Configure, 400, "API quota exceeded.");

        workflow.configure(&ApiKey::new("key")).await.unwrap_err();

        assert!(!workflow.is_configured());
        assert!(!workflow.has_session());
        assert!(!workflow.has_categorization());
        assert!(matches!(
            workflow.start_session("desc", reviews()).await.unwrap_err(),
            WorkflowError::NotConfigured
        ));
    }

    #[tokio::test]
    async fn test_failed_step_can_be_retried() {
        let mut workflow = with_session().await;
        workflow
            .backend()
            .fail(Endpoint::Extract, 500, "Extraction failed: model timeout");

        let err = workflow.extract().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to extract attributes: Extraction failed: model timeout"
        );
        assert!(!workflow.has_extraction());
        assert!(!workflow.is_loading(Step::Extract));
        assert!(workflow.has_session());

        workflow.backend().recover(Endpoint::Extract);
        workflow.extract().await.unwrap();
        assert!(workflow.has_extraction());
    }

    #[tokio::test]
    async fn test_failed_session_start_keeps_input() {
        let mut workflow = configured().await;
        workflow.backend().fail(Endpoint::StartSession, 500, "boom");

        let err = workflow.start_session("desc", reviews()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to start session: boom");
        assert!(!workflow.has_session());
        assert!(!workflow.is_starting_session());
        assert_eq!(workflow.input().unwrap().reviews, reviews());
    }

    #[tokio::test]
    async fn test_submit_input_parses_reviews() {
        let mut workflow = configured().await;

        workflow
            .submit_input("desc", r#"["first", "second"]"#)
            .await
            .unwrap();
        assert_eq!(workflow.input().unwrap().reviews, vec!["first", "second"]);

        let err = workflow.submit_input("desc", r#"["first" "second"]"#).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidReviews(_)));
        // the existing session survives a parse error
        assert!(workflow.has_session());
    }

    #[tokio::test]
    async fn test_full_pipeline_leaves_session_alone() {
        let workflow = with_session().await;

        let results = workflow.run_full_pipeline("desc", reviews()).await.unwrap();
        assert!(results.contains_key("matching"));
        assert_eq!(workflow.session_id(), Some("session-1"));
    }

    #[tokio::test]
    async fn test_toggle_parallel_processing() {
        let workflow = WorkflowController::new(MockBackend::new());

        assert_eq!(
            workflow.toggle_parallel_processing().await.unwrap(),
            "Parallel processing disabled."
        );
        assert_eq!(
            workflow.toggle_parallel_processing().await.unwrap(),
            "Parallel processing enabled."
        );
    }
}
