//! xmllint subprocess wrapper
//!
//! xmllint is run once per file with `--noout`, so standard output stays empty
//! and everything it has to say about the document arrives on standard error.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{ActionError, Result};

/// On/off switch, spelled the way CI inputs spell it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    On,
    #[default]
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

/// Flags passed to every xmllint invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XmllintOptions {
    /// Relax xmllint's hardcoded parser limits (`--huge`)
    pub huge_files: Toggle,
    /// Validate against the document's DTD (`--validate`)
    pub validate: Toggle,
}

impl XmllintOptions {
    /// Command line flags, without the target file.
    pub fn args(&self) -> Vec<&'static str> {
        // newer versions of xmllint also have --pedantic and --strict-namespace
        let mut args = vec!["--noout"];
        if self.huge_files.is_on() {
            args.push("--huge");
        }
        if self.validate.is_on() {
            args.push("--validate");
        }
        args
    }
}

/// Outcome of linting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOutput {
    /// Whether the tool exited successfully
    pub success: bool,
    /// Human-readable exit status, for error messages
    pub status: String,
    /// Everything the tool wrote to standard error
    pub diagnostics: String,
}

/// Something that checks one XML file and reports xmllint-formatted diagnostics.
#[async_trait]
pub trait Linter: Send + Sync {
    async fn lint(&self, file: &Path) -> Result<LintOutput>;
}

/// Runs the real xmllint binary
#[derive(Debug, Clone)]
pub struct Xmllint {
    program: PathBuf,
    options: XmllintOptions,
}

impl Xmllint {
    pub fn new(program: impl Into<PathBuf>, options: XmllintOptions) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn options(&self) -> XmllintOptions {
        self.options
    }
}

#[async_trait]
impl Linter for Xmllint {
    async fn lint(&self, file: &Path) -> Result<LintOutput> {
        let output = Command::new(&self.program)
            .args(self.options.args())
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ActionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.stdout.is_empty() {
            tracing::debug!(
                "{} wrote {} bytes to stdout for {}",
                self.program.display(),
                output.stdout.len(),
                file.display()
            );
        }

        Ok(LintOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
