//! GitHub Actions integration
//!
//! Annotations are workflow commands printed on standard output. Step outputs
//! and the job summary are appended to the files GitHub names in
//! `GITHUB_OUTPUT` and `GITHUB_STEP_SUMMARY`.

use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::EnvProvider;
use crate::diagnostic::ValidationError;
use crate::error::Result;

/// `::error` workflow command for one finding.
///
/// GitHub counts lines and columns from 1.
pub fn annotation(error: &ValidationError) -> String {
    format!(
        "::error title={},file={},line={},col={}::{}",
        escape_property(&format!("xmllint {} error", error.category)),
        escape_property(&error.file.to_string_lossy()),
        error.line + 1,
        error.column + 1,
        escape_data(&error.message),
    )
}

/// Print one annotation per error.
pub fn emit_annotations<W: Write>(mut out: W, errors: &[ValidationError]) -> std::io::Result<()> {
    for error in errors {
        writeln!(out, "{}", annotation(error))?;
    }
    out.flush()
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// Files the runner provides for step outputs and the job summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GithubEnvironment {
    pub output_file: Option<PathBuf>,
    pub summary_file: Option<PathBuf>,
}

impl GithubEnvironment {
    pub fn from_env(env: &impl EnvProvider) -> Self {
        let path = |key: &str| env.get(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        Self {
            output_file: path("GITHUB_OUTPUT"),
            summary_file: path("GITHUB_STEP_SUMMARY"),
        }
    }

    /// Publish a step output. Values may span several lines.
    pub async fn set_output(&self, name: &str, value: &str) -> Result<()> {
        let Some(file) = &self.output_file else {
            tracing::debug!("GITHUB_OUTPUT is not set, dropping output {}", name);
            return Ok(());
        };

        let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
        append(file, &format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")).await
    }

    /// Add markdown to the job summary page.
    pub async fn append_summary(&self, markdown: &str) -> Result<()> {
        let Some(file) = &self.summary_file else {
            tracing::debug!("GITHUB_STEP_SUMMARY is not set, dropping summary");
            return Ok(());
        };

        append(file, &format!("{markdown}\n")).await
    }
}

async fn append(path: &Path, text: &str) -> Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
