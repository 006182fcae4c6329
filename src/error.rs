use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all fatal failure modes.
///
/// Findings reported by xmllint are not errors: they are collected as
/// [`ValidationError`](crate::diagnostic::ValidationError) records.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File system traversal error: {path} - {reason}")]
    FileSystemTraversal { path: PathBuf, reason: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ActionError {
    /// Process exit status for a run aborted by this error.
    ///
    /// `1` is reserved for a completed run that found validation errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            ActionError::Config(_) => 2,
            _ => 3,
        }
    }
}

/// Configuration-specific error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The root path must be relative to the current working directory: {path}")]
    AbsoluteRoot { path: PathBuf },

    #[error("Invalid glob pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },

    #[error("Invalid configuration value: {field} = {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Cannot read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Disagreements between xmllint's output and what this crate expects of it.
///
/// None of these are recoverable: the run aborts instead of guessing.
#[derive(Error, Debug)]
pub enum ContractViolation {
    #[error("diagnostic output has {lines} lines, which is not a multiple of three")]
    LineCount { lines: usize },

    #[error("unrecognized diagnostic message line: {line:?}")]
    MalformedMessage { line: String },

    #[error("unknown xmllint error category: {category:?}")]
    UnknownCategory { category: String },

    #[error("reported path {path} is not under {root}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    #[error("byte offset {position} is outside {file} ({length} bytes read)")]
    OffsetOutOfRange {
        file: PathBuf,
        position: u64,
        length: u64,
    },

    #[error(
        "xmllint exit status disagrees with its output for {file}: {errors} error(s) parsed, exit status {status}"
    )]
    ExitStatusMismatch {
        file: PathBuf,
        errors: usize,
        status: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ActionError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
