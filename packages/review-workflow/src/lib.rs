//! Gated review-analysis workflow.
//!
//! Drives the analysis backend through its fixed sequence (configure, start
//! session, extract, match, categorize) and keeps the per-run state a user
//! interface renders: gating flags, loading flags, step results, and the
//! server status badge.
//!
//! The backend is reached through the [`AnalysisBackend`] trait, implemented
//! for [`review_client::ReviewClient`] and for [`testing::MockBackend`].

pub mod backend;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod export;
pub mod input;
pub mod status;
pub mod step;
pub mod testing;

pub use backend::{AnalysisBackend, BackendResult};
pub use controller::WorkflowController;
pub use credentials::ApiKey;
pub use error::{Result, WorkflowError};
pub use export::{export_report, Artifact, ArtifactFormat, ExportError, StepReport};
pub use input::{parse_reviews, ReviewInputError};
pub use status::{ServerStatus, StatusTone};
pub use step::{Step, StepState};
