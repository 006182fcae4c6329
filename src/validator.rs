//! Validation engine
//!
//! Walks the configured files one at a time, runs the linter on each, parses
//! its diagnostics and collects every error in discovery order. Files are
//! never linted concurrently: each subprocess is awaited before the next one
//! starts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::diagnostic::{DiagnosticParser, ValidationError};
use crate::error::{ContractViolation, Result};
use crate::file_discovery::FileDiscovery;
use crate::xmllint::{Linter, Xmllint};

/// Aggregated results of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResults {
    /// Number of files handed to the linter
    pub files_checked: usize,
    /// Every error found, in file order then emission order
    pub errors: Vec<ValidationError>,
}

impl ValidationResults {
    /// Check if any file had validation errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Process exit status for a completed run
    pub fn exit_code(&self) -> u8 {
        if self.has_errors() { 1 } else { 0 }
    }
}

pub struct ValidationEngine<L> {
    linter: L,
    parser: DiagnosticParser,
    discovery: FileDiscovery,
}

impl ValidationEngine<Xmllint> {
    /// Engine running the configured xmllint over the configured files
    pub fn from_config(config: &Config, workspace: impl Into<PathBuf>) -> Result<Self> {
        let linter = Xmllint::new(config.xmllint.clone(), config.xmllint_options());
        Ok(Self::new(linter, workspace, config.file_discovery()?))
    }
}

impl<L: Linter> ValidationEngine<L> {
    /// Create a new validation engine rooted at `workspace`
    pub fn new(linter: L, workspace: impl Into<PathBuf>, discovery: FileDiscovery) -> Self {
        Self {
            linter,
            parser: DiagnosticParser::new(workspace),
            discovery,
        }
    }

    pub fn workspace(&self) -> &Path {
        self.parser.workspace()
    }

    pub fn linter(&self) -> &L {
        &self.linter
    }

    /// Validate every matching file.
    ///
    /// Stops at the first fatal error; findings never stop the run.
    pub async fn run(&self) -> Result<ValidationResults> {
        let mut results = ValidationResults::default();

        tracing::info!(
            "Validating {} under {}",
            self.discovery.pattern(),
            self.discovery.root().display()
        );

        for file in self.discovery.walk(self.workspace()) {
            let file = file?;
            let errors = self.validate_file(&file).await?;
            results.files_checked += 1;
            results.errors.extend(errors);
        }

        tracing::info!(
            "Checked {} file(s), found {} error(s)",
            results.files_checked,
            results.errors.len()
        );

        Ok(results)
    }

    /// Validate a single file (path absolute or relative to the workspace)
    pub async fn validate_file(&self, file: &Path) -> Result<Vec<ValidationError>> {
        let file = self.workspace().join(file);
        let output = self.linter.lint(&file).await?;
        let errors = self.parser.parse(&output.diagnostics)?;

        // xmllint's exit status and its diagnostics must tell the same story
        if errors.is_empty() != output.success {
            return Err(ContractViolation::ExitStatusMismatch {
                file,
                errors: errors.len(),
                status: output.status,
            }
            .into());
        }

        tracing::debug!("{}: {} error(s)", file.display(), errors.len());
        Ok(errors)
    }
}
