//! Non-interactive run of the whole gated sequence.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use review_workflow::{AnalysisBackend, ApiKey, Step, WorkflowController};
use std::path::Path;

use super::{configure_backend, connect, export_step, resolve_api_key, show_step, InputArgs};
use crate::config::Config;
use crate::render;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write JSON and Markdown artifacts for every step
    #[arg(long)]
    pub export: bool,
}

pub async fn run(config: &Config, args: &RunArgs) -> Result<()> {
    let (description, reviews_text) = args.input.load()?;
    let api_key = resolve_api_key(config)?;
    let mut workflow = connect(config);

    let export_dir = args.export.then_some(config.export_dir.as_path());
    run_sequence(&mut workflow, &api_key, &description, &reviews_text, export_dir).await
}

/// Configure, start a session, then run every step in order, stopping at the
/// first failure.
pub async fn run_sequence<B: AnalysisBackend>(
    workflow: &mut WorkflowController<B>,
    api_key: &ApiKey,
    description: &str,
    reviews_text: &str,
    export_dir: Option<&Path>,
) -> Result<()> {
    configure_backend(workflow, api_key).await?;

    let session_id = workflow
        .submit_input(description, reviews_text)
        .await
        .context("Could not start an analysis session")?
        .to_string();
    let review_count = workflow.input().map_or(0, |input| input.reviews.len());
    render::print_success(format!("Session {} started with {} reviews", session_id, review_count));

    for &step in Step::all() {
        eprintln!("{}", render::progress_label(step).dimmed());
        workflow.run_step(step).await?;
        show_step(workflow, step)?;

        if let Some(dir) = export_dir {
            for path in export_step(workflow, step, dir)? {
                render::print_success(format!("Saved {}", path.display()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_workflow::testing::{Endpoint, MockBackend};

    #[tokio::test]
    async fn test_sequence_runs_every_step_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let mut workflow = WorkflowController::new(MockBackend::new());

        run_sequence(
            &mut workflow,
            &ApiKey::new("key"),
            "Blue phone case",
            "Case is red\nBattery is great",
            Some(dir.path()),
        )
        .await
        .unwrap();

        assert!(workflow.has_categorization());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 6);
    }

    #[tokio::test]
    async fn test_sequence_stops_at_first_failure() {
        let backend = MockBackend::new().with_failure(Endpoint::Match, 500, "Matching failed: quota");
        let mut workflow = WorkflowController::new(backend);

        let err = run_sequence(&mut workflow, &ApiKey::new("key"), "desc", "review", None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Matching failed: quota"));
        assert!(workflow.has_extraction());
        assert_eq!(workflow.backend().call_count(Endpoint::Categorize), 0);
    }

    #[tokio::test]
    async fn test_malformed_reviews_never_reach_backend() {
        let mut workflow = WorkflowController::new(MockBackend::new());

        let err = run_sequence(&mut workflow, &ApiKey::new("key"), "desc", "[\"a\" \"b\"]", None)
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("looks like JSON"));
        assert_eq!(workflow.backend().call_count(Endpoint::StartSession), 0);
    }
}
