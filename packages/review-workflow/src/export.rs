//! Step result export as JSON and Markdown artifacts.
//!
//! Artifacts are named `<step>_<YYYYMMDD_HHMMSS>.<ext>`. The JSON artifact is
//! the backend response without its `markdown` field; the Markdown artifact is
//! that field verbatim.

use chrono::{Local, NaiveDateTime};
use review_client::{CategorizeResponse, ExtractResponse, MatchResponse};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::step::Step;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize {step} result: {source}")]
    Serialize {
        step: Step,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A step response that can be exported.
pub trait StepReport: Serialize {
    const STEP: Step;

    fn markdown(&self) -> &str;
}

impl StepReport for ExtractResponse {
    const STEP: Step = Step::Extract;

    fn markdown(&self) -> &str {
        &self.markdown
    }
}

impl StepReport for MatchResponse {
    const STEP: Step = Step::Match;

    fn markdown(&self) -> &str {
        &self.markdown
    }
}

impl StepReport for CategorizeResponse {
    const STEP: Step = Step::Categorize;

    fn markdown(&self) -> &str {
        &self.markdown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Markdown,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Json => "json",
            ArtifactFormat::Markdown => "md",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactFormat::Json => "application/json",
            ArtifactFormat::Markdown => "text/markdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub step: Step,
    pub format: ArtifactFormat,
    pub file_name: String,
    pub contents: String,
}

pub fn export_file_name(step: Step, format: ArtifactFormat, at: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        step.name(),
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Pretty-printed JSON of the response with `markdown` removed.
pub fn json_artifact<R: StepReport>(report: &R, at: NaiveDateTime) -> Result<Artifact, ExportError> {
    let to_err = |source| ExportError::Serialize { step: R::STEP, source };

    let mut value = serde_json::to_value(report).map_err(to_err)?;
    if let Some(object) = value.as_object_mut() {
        object.remove("markdown");
    }
    let contents = serde_json::to_string_pretty(&value).map_err(to_err)?;

    Ok(Artifact {
        step: R::STEP,
        format: ArtifactFormat::Json,
        file_name: export_file_name(R::STEP, ArtifactFormat::Json, at),
        contents,
    })
}

/// The Markdown report, or `None` when the backend sent none.
pub fn markdown_artifact<R: StepReport>(report: &R, at: NaiveDateTime) -> Option<Artifact> {
    let markdown = report.markdown();
    if markdown.is_empty() {
        return None;
    }
    Some(Artifact {
        step: R::STEP,
        format: ArtifactFormat::Markdown,
        file_name: export_file_name(R::STEP, ArtifactFormat::Markdown, at),
        contents: markdown.to_string(),
    })
}

pub fn write_artifact(dir: &Path, artifact: &Artifact) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(&artifact.file_name);
    std::fs::write(&path, &artifact.contents).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    info!(step = %artifact.step, path = %path.display(), "Exported artifact");
    Ok(path)
}

/// Write every available artifact for `report` into `dir`, stamped with the
/// current local time.
pub fn export_report<R: StepReport>(report: &R, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    let now = Local::now().naive_local();

    let mut written = vec![write_artifact(dir, &json_artifact(report, now)?)?];
    if let Some(markdown) = markdown_artifact(report, now) {
        written.push(write_artifact(dir, &markdown)?);
    }
    Ok(written)
}
