//! Typed errors for the analysis workflow.

use thiserror::Error;

use crate::input::ReviewInputError;
use crate::step::Step;

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Reasons a workflow action was refused or failed.
///
/// Gating errors are raised locally before any request is sent. `Remote`
/// carries the message to show the user after a backend call failed.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("API Key cannot be empty.")]
    EmptyCredential,

    #[error("Configuration is already in progress.")]
    ConfigurationInProgress,

    #[error("Please configure the API key first.")]
    NotConfigured,

    #[error("Seller description cannot be empty.")]
    EmptyDescription,

    #[error("At least one review is required.")]
    NoReviews,

    #[error(transparent)]
    InvalidReviews(#[from] ReviewInputError),

    #[error("A session is already being started.")]
    SessionInProgress,

    #[error("Please submit input and start a session first.")]
    NoSession,

    #[error("The {required} step must be completed before {step}.")]
    PrerequisiteMissing { step: Step, required: Step },

    #[error("The {0} step is already running.")]
    InProgress(Step),

    #[error("The {0} step is already complete for this session.")]
    AlreadyComplete(Step),

    #[error("Heartbeat check failed after configuration.")]
    HeartbeatFailed { status: String },

    #[error("{context}: {message}")]
    Remote {
        context: &'static str,
        message: String,
    },
}

impl WorkflowError {
    pub(crate) fn remote(context: &'static str, err: &review_client::ClientError) -> Self {
        WorkflowError::Remote {
            context,
            message: err.user_message(),
        }
    }

    /// True for errors raised by local gating rather than by the backend.
    pub fn is_gating(&self) -> bool {
        !matches!(
            self,
            WorkflowError::Remote { .. } | WorkflowError::HeartbeatFailed { .. }
        )
    }
}
