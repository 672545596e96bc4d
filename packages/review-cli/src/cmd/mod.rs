pub mod interactive;
pub mod run;
pub mod server;

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Password};
use review_client::ReviewClient;
use review_workflow::{export_report, AnalysisBackend, ApiKey, ServerStatus, Step, WorkflowController};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::render;

/// Seller description and reviews supplied on the command line.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Seller description text, or @path to read it from a file
    #[arg(short, long)]
    pub description: String,

    /// File with reviews (JSON array or one per line); "-" reads stdin
    #[arg(short, long)]
    pub reviews: PathBuf,
}

impl InputArgs {
    /// Returns the description and the raw (unparsed) review text.
    pub fn load(&self) -> Result<(String, String)> {
        let description = read_text_arg(&self.description)?;
        let reviews = if self.reviews.as_os_str() == "-" {
            std::io::read_to_string(std::io::stdin()).context("Failed to read reviews from stdin")?
        } else {
            read_file(&self.reviews)?
        };
        Ok((description, reviews))
    }
}

/// `@path` reads the file; anything else is taken literally.
pub fn read_text_arg(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => read_file(Path::new(path)),
        None => Ok(value.to_string()),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn connect(config: &Config) -> WorkflowController<ReviewClient> {
    tracing::debug!(api_url = %config.api_url, "Connecting to analysis backend");
    WorkflowController::new(ReviewClient::new(config.api_url.clone()))
}

/// Key from the environment, else a hidden prompt.
pub fn resolve_api_key(config: &Config) -> Result<ApiKey> {
    if let Some(key) = &config.api_key {
        return Ok(key.clone());
    }
    prompt_api_key()
}

pub fn prompt_api_key() -> Result<ApiKey> {
    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Gemini API Key")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key")?;
    Ok(ApiKey::new(key))
}

/// Configure the backend, printing the resulting server status.
pub async fn configure_backend<B: AnalysisBackend>(
    workflow: &mut WorkflowController<B>,
    api_key: &ApiKey,
) -> Result<()> {
    println!("{}", render::status_badge(&ServerStatus::Configuring));
    let result = workflow.configure(api_key).await;
    println!("{}", render::status_badge(workflow.status()));
    result.map_err(Into::into)
}

/// Print the stored report for `step`, if it has run.
pub fn show_step<B: AnalysisBackend>(workflow: &WorkflowController<B>, step: Step) -> Result<()> {
    match step {
        Step::Extract => workflow.extraction().map(render::print_report).transpose()?,
        Step::Match => workflow.matching().map(render::print_report).transpose()?,
        Step::Categorize => workflow.categorization().map(render::print_report).transpose()?,
    };
    Ok(())
}

/// Write the JSON and Markdown artifacts for `step` into `dir`.
pub fn export_step<B: AnalysisBackend>(
    workflow: &WorkflowController<B>,
    step: Step,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let written = match step {
        Step::Extract => workflow.extraction().map(|r| export_report(r, dir)),
        Step::Match => workflow.matching().map(|r| export_report(r, dir)),
        Step::Categorize => workflow.categorization().map(|r| export_report(r, dir)),
    };
    match written {
        Some(paths) => Ok(paths?),
        None => anyhow::bail!("The {} step has no results to export yet.", step),
    }
}
