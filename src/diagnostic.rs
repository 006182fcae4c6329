//! Parser for xmllint's diagnostic stream.
//!
//! xmllint writes every error as three lines on standard error:
//!
//! ```text
//! /work/docs/a.xml:15: parser error : Opening and ending tag mismatch: a line 2 and root
//! <root><a></root>
//!          ^
//! ```
//!
//! The first line carries the file, a 1-based byte offset, the error category
//! and the message; the other two are the offending source line and a caret
//! pointing at the offset.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ContractViolation, Result};
use crate::locator;

/// Cached regex for the first line of a diagnostic triple
static MESSAGE_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

/// The category is captured as any word so that an unexpected one is reported
/// as `UnknownCategory` rather than as a malformed line.
fn message_line_regex() -> &'static Regex {
    MESSAGE_LINE_REGEX.get_or_init(|| {
        Regex::new(r"^(?P<file>.+):(?P<position>\d+): (?P<category>\S+) error : (?P<message>.+)$")
            .expect("Failed to compile diagnostic message regex")
    })
}

/// Kind of problem xmllint found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The document is not well-formed XML.
    Syntax,
    /// The document violates its DTD or schema.
    Validity,
}

impl Category {
    /// Map xmllint's own category word.
    pub fn from_tool(word: &str) -> Option<Self> {
        match word {
            "parser" => Some(Category::Syntax),
            "validity" => Some(Category::Validity),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Syntax => "syntax",
            Category::Validity => "validity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One error reported by xmllint, positioned and relative to the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub file: PathBuf,
    pub line: u64,
    pub column: u64,
    pub category: Category,
    pub message: String,
    /// Offending source line and caret line, joined by a newline.
    pub snippet: String,
}

impl ValidationError {
    /// The source line and the caret line of the snippet.
    pub fn snippet_lines(&self) -> (&str, &str) {
        self.snippet
            .split_once('\n')
            .unwrap_or((self.snippet.as_str(), ""))
    }
}

/// Fields of a diagnostic message line, before the offset is located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLine {
    pub file: PathBuf,
    pub position: u64,
    pub category: Category,
    pub message: String,
}

/// Parse the first line of a diagnostic triple.
pub fn parse_message_line(line: &str) -> std::result::Result<MessageLine, ContractViolation> {
    let malformed = || ContractViolation::MalformedMessage {
        line: line.to_string(),
    };

    let caps = message_line_regex().captures(line).ok_or_else(malformed)?;
    let position = caps["position"].parse().map_err(|_| malformed())?;
    let category =
        Category::from_tool(&caps["category"]).ok_or_else(|| ContractViolation::UnknownCategory {
            category: caps["category"].to_string(),
        })?;

    Ok(MessageLine {
        file: PathBuf::from(&caps["file"]),
        position,
        category,
        message: caps["message"].to_string(),
    })
}

/// Join the source line and the caret line, dropping the caret line's
/// leading alignment character.
fn build_snippet(source: &str, pointer: &str) -> String {
    let mut chars = pointer.chars();
    chars.next();
    format!("{}\n{}", source, chars.as_str())
}

/// Turns one captured diagnostic stream into [`ValidationError`] records.
#[derive(Debug, Clone)]
pub struct DiagnosticParser {
    workspace: PathBuf,
}

impl DiagnosticParser {
    /// Create a parser that reports paths relative to `workspace`.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Parse the complete standard error output of one xmllint invocation.
    ///
    /// Any deviation from the three-line format aborts the whole parse.
    pub fn parse(&self, output: &str) -> Result<Vec<ValidationError>> {
        let lines: Vec<&str> = output.lines().collect();
        if lines.len() % 3 != 0 {
            return Err(ContractViolation::LineCount { lines: lines.len() }.into());
        }

        let mut errors = Vec::with_capacity(lines.len() / 3);
        for triple in lines.chunks_exact(3) {
            errors.push(self.parse_triple(triple[0], triple[1], triple[2])?);
        }

        Ok(errors)
    }

    fn parse_triple(&self, message: &str, source: &str, pointer: &str) -> Result<ValidationError> {
        let parsed = parse_message_line(message)?;
        let absolute = self.workspace.join(&parsed.file);
        let file = self.relativize(&absolute)?;
        let location = locator::locate(&absolute, parsed.position)?;

        Ok(ValidationError {
            file,
            line: location.line,
            column: location.column,
            category: parsed.category,
            message: parsed.message,
            snippet: build_snippet(source, pointer),
        })
    }

    fn relativize(&self, path: &Path) -> std::result::Result<PathBuf, ContractViolation> {
        path.strip_prefix(&self.workspace)
            .map(Path::to_path_buf)
            .map_err(|_| ContractViolation::PathOutsideRoot {
                path: path.to_path_buf(),
                root: self.workspace.clone(),
            })
    }
}
