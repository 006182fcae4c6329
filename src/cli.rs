use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::xmllint::Toggle;

/// Check XML files with xmllint and report errors to GitHub Actions.
///
/// Every input can also be supplied through the environment variable GitHub
/// sets for the action input of the same name (e.g. `INPUT_ROOT-FOLDER`).
#[derive(Parser, Debug, Clone)]
#[command(name = "xmllint-action")]
#[command(version)]
pub struct Cli {
    // Runners export inputs the workflow left out as empty strings. Empty paths
    // and patterns count as unset when merged; empty toggles read as off.
    /// Folder to search, relative to the working directory [default: .]
    #[arg(
        long = "root-folder",
        env = "INPUT_ROOT-FOLDER",
        hide_env = true,
        value_parser = OsStringValueParser::new().map(PathBuf::from)
    )]
    pub root_folder: Option<PathBuf>,

    /// Glob selecting the files to check [default: **/*.xml]
    #[arg(long = "file-pattern", env = "INPUT_FILE-PATTERN", hide_env = true)]
    pub file_pattern: Option<String>,

    /// Pass --huge to xmllint [default: off]
    #[arg(
        long = "huge-files",
        env = "INPUT_HUGE-FILES",
        hide_env = true,
        value_name = "on|off",
        value_parser = parse_toggle
    )]
    pub huge_files: Option<Toggle>,

    /// Pass --validate to xmllint [default: off]
    #[arg(
        long = "validate",
        env = "INPUT_VALIDATE",
        hide_env = true,
        value_name = "on|off",
        value_parser = parse_toggle
    )]
    pub validate: Option<Toggle>,

    /// xmllint executable [default: xmllint]
    #[arg(
        long = "xmllint",
        env = "XMLLINT",
        value_parser = OsStringValueParser::new().map(PathBuf::from)
    )]
    pub xmllint: Option<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Log filter (see https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
    #[arg(
        long = "log-level",
        env = "XMLLINT_ACTION_LOG",
        default_value = "info",
        hide_default_value = true
    )]
    pub log_level: String,
}

/// `on` or `off`. Runners export an empty string for inputs the workflow left
/// out, which reads as `off`.
fn parse_toggle(value: &str) -> Result<Toggle, String> {
    match value.trim() {
        "" => Ok(Toggle::Off),
        value => Toggle::from_str(value, true),
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
