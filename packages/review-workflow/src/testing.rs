//! Testing utilities including an in-memory backend.
//!
//! Useful for exercising the workflow without a running analysis server.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use serde_json::{Map, Value};
use std::sync::RwLock;

use review_client::{
    CategorizeResponse, CategorizedItem, CategorizedResult, ClientError, ExtractResponse, ExtractedAttribute,
    HeartbeatResponse, MatchResponse, MatchStatus, MatchedAttributeRecord, MessageResponse,
    StartSessionRequest, StartSessionResponse,
};

use crate::backend::{AnalysisBackend, BackendResult};
use crate::credentials::ApiKey;

/// Backend endpoints, used to script failures and inspect calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Configure,
    Heartbeat,
    StartSession,
    Extract,
    Match,
    Categorize,
    ToggleWorkers,
    FullPipeline,
}

/// Record of a call made to the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Configure { api_key: String },
    Heartbeat,
    StartSession { request: StartSessionRequest },
    Extract { session_id: String },
    Match { session_id: String },
    Categorize { session_id: String },
    ToggleWorkers,
    FullPipeline { request: StartSessionRequest },
}

impl MockCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            MockCall::Configure { .. } => Endpoint::Configure,
            MockCall::Heartbeat => Endpoint::Heartbeat,
            MockCall::StartSession { .. } => Endpoint::StartSession,
            MockCall::Extract { .. } => Endpoint::Extract,
            MockCall::Match { .. } => Endpoint::Match,
            MockCall::Categorize { .. } => Endpoint::Categorize,
            MockCall::ToggleWorkers => Endpoint::ToggleWorkers,
            MockCall::FullPipeline { .. } => Endpoint::FullPipeline,
        }
    }
}

/// A scripted backend.
///
/// Every endpoint succeeds with a fixture response unless a failure has been
/// scripted for it. Failures can be added or cleared while a test runs.
pub struct MockBackend {
    failures: RwLock<HashMap<Endpoint, (u16, String)>>,
    heartbeat_status: RwLock<String>,
    calls: RwLock<Vec<MockCall>>,
    sessions: AtomicUsize,
    parallel: AtomicBool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            failures: RwLock::new(HashMap::new()),
            heartbeat_status: RwLock::new("heartbeat success".to_string()),
            calls: RwLock::new(Vec::new()),
            sessions: AtomicUsize::new(0),
            parallel: AtomicBool::new(true),
        }
    }

    /// Make `endpoint` answer with `status` and `{"detail": detail}`.
    pub fn with_failure(self, endpoint: Endpoint, status: u16, detail: impl Into<String>) -> Self {
        self.fail(endpoint, status, detail);
        self
    }

    pub fn with_heartbeat_status(self, status: impl Into<String>) -> Self {
        self.set_heartbeat_status(status);
        self
    }

    pub fn fail(&self, endpoint: Endpoint, status: u16, detail: impl Into<String>) {
        self.failures
            .write()
            .unwrap()
            .insert(endpoint, (status, detail.into()));
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.failures.write().unwrap().remove(&endpoint);
    }

    pub fn set_heartbeat_status(&self, status: impl Into<String>) {
        *self.heartbeat_status.write().unwrap() = status.into();
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .count()
    }

    fn record(&self, call: MockCall) -> BackendResult<()> {
        let endpoint = call.endpoint();
        self.calls.write().unwrap().push(call);

        match self.failures.read().unwrap().get(&endpoint) {
            Some((status, detail)) => Err(ClientError::Api {
                status: *status,
                message: detail.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    async fn configure(&self, api_key: &ApiKey) -> BackendResult<MessageResponse> {
        self.record(MockCall::Configure {
            api_key: api_key.expose().to_string(),
        })?;
        Ok(MessageResponse {
            message: "API key configured successfully.".into(),
        })
    }

    async fn heartbeat(&self) -> BackendResult<HeartbeatResponse> {
        self.record(MockCall::Heartbeat)?;
        Ok(HeartbeatResponse {
            status: self.heartbeat_status.read().unwrap().clone(),
        })
    }

    async fn start_session(&self, request: &StartSessionRequest) -> BackendResult<StartSessionResponse> {
        self.record(MockCall::StartSession {
            request: request.clone(),
        })?;
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(StartSessionResponse {
            session_id: format!("session-{}", n),
        })
    }

    async fn extract(&self, session_id: &str) -> BackendResult<ExtractResponse> {
        self.record(MockCall::Extract {
            session_id: session_id.to_string(),
        })?;
        Ok(sample_extraction())
    }

    async fn match_attributes(&self, session_id: &str) -> BackendResult<MatchResponse> {
        self.record(MockCall::Match {
            session_id: session_id.to_string(),
        })?;
        Ok(sample_match())
    }

    async fn categorize(&self, session_id: &str) -> BackendResult<CategorizeResponse> {
        self.record(MockCall::Categorize {
            session_id: session_id.to_string(),
        })?;
        Ok(sample_categorization())
    }

    async fn toggle_parallel_processing(&self) -> BackendResult<MessageResponse> {
        self.record(MockCall::ToggleWorkers)?;
        let enabled = !self.parallel.fetch_xor(true, Ordering::SeqCst);
        Ok(MessageResponse {
            message: format!(
                "Parallel processing {}.",
                if enabled { "enabled" } else { "disabled" }
            ),
        })
    }

    async fn full_pipeline(&self, request: &StartSessionRequest) -> BackendResult<CategorizedResult> {
        self.record(MockCall::FullPipeline {
            request: request.clone(),
        })?;
        Ok(sample_categorization().results)
    }
}

// --- Fixtures ---

pub fn sample_extraction() -> ExtractResponse {
    ExtractResponse {
        extracted_attributes: vec![
            vec![ExtractedAttribute {
                attribute: "color".into(),
                value: "red".into(),
                extra: Default::default(),
            }],
            vec![ExtractedAttribute {
                attribute: "battery life".into(),
                value: "10 hours".into(),
                extra: Default::default(),
            }],
        ],
        markdown: "## Extracted Attributes\n\n- color: red\n- battery life: 10 hours\n".into(),
    }
}

pub fn sample_match() -> MatchResponse {
    MatchResponse {
        all_dataframes: vec![
            vec![MatchedAttributeRecord {
                attribute: "color".into(),
                value: "red".into(),
                status: MatchStatus::Contradictory,
                extra: evidence("Description lists the color as blue"),
            }],
            vec![MatchedAttributeRecord {
                attribute: "battery life".into(),
                value: "10 hours".into(),
                status: MatchStatus::Matching,
                extra: evidence("Up to 10 hours of playback"),
            }],
        ],
        markdown: "## Matched Attributes\n\n| attribute | status |\n|---|---|\n| color | contradictory |\n| battery life | matching |\n".into(),
    }
}

pub fn sample_categorization() -> CategorizeResponse {
    CategorizeResponse {
        results: categorized(),
        markdown: "## Categorized Results\n\n### contradictory\n- appearance: color\n\n### matching\n- performance: battery life\n".into(),
    }
}

fn categorized() -> CategorizedResult {
    let mut results = CategorizedResult::default();
    for status in ["missing", "matching", "contradictory", "partially_matching"] {
        results.insert(status.to_string(), Default::default());
    }
    results["contradictory"].insert(
        "appearance".to_string(),
        vec![CategorizedItem {
            attribute: "color".into(),
            value: "red".into(),
            extra: categorized_extra(MatchStatus::Contradictory, "Description lists the color as blue"),
        }],
    );
    results["matching"].insert(
        "performance".to_string(),
        vec![CategorizedItem {
            attribute: "battery life".into(),
            value: "10 hours".into(),
            extra: categorized_extra(MatchStatus::Matching, "Up to 10 hours of playback"),
        }],
    );
    results
}

fn evidence(text: &str) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("evidence".into(), text.into());
    extra
}

// Categorized items keep the status of the record they came from.
fn categorized_extra(status: MatchStatus, text: &str) -> Map<String, Value> {
    let mut extra = evidence(text);
    extra.insert("status".into(), String::from(status).into());
    extra
}
