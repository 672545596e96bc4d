//! Backend housekeeping commands and the one-shot pipeline.

use anyhow::{Context, Result};
use colored::Colorize;
use review_workflow::parse_reviews;

use super::{configure_backend, connect, resolve_api_key, InputArgs};
use crate::config::Config;
use crate::render;

/// Configure the key and report whether the backend is alive.
pub async fn heartbeat(config: &Config) -> Result<()> {
    let api_key = resolve_api_key(config)?;
    let mut workflow = connect(config);
    configure_backend(&mut workflow, &api_key).await
}

pub async fn toggle_workers(config: &Config) -> Result<()> {
    let workflow = connect(config);
    let message = workflow.toggle_parallel_processing().await?;
    render::print_success(message);
    Ok(())
}

/// Run every step in a single backend call, without a session.
pub async fn pipeline(config: &Config, args: &InputArgs) -> Result<()> {
    let (description, reviews_text) = args.load()?;
    let reviews = parse_reviews(&reviews_text)?;
    let api_key = resolve_api_key(config)?;

    let mut workflow = connect(config);
    configure_backend(&mut workflow, &api_key).await?;

    eprintln!("{}", "Running full pipeline...".dimmed());
    let results = workflow
        .run_full_pipeline(&description, reviews)
        .await
        .context("Full pipeline run did not complete")?;

    println!();
    render::print_categorized(&results);
    Ok(())
}
