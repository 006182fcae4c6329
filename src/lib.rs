//! # xmllint-action Library
//!
//! Runs `xmllint` over the XML files of a repository checkout and turns its
//! diagnostics into structured errors, GitHub annotations, step outputs and a
//! job summary.

pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod file_discovery;
pub mod github;
pub mod locator;
pub mod output;
pub mod validator;
pub mod xmllint;

pub use cli::Cli;
pub use config::{Config, ConfigManager, EnvProvider, SystemEnvProvider};
pub use diagnostic::{Category, DiagnosticParser, ValidationError};
pub use error::{ActionError, ConfigError, ContractViolation, Result};
pub use file_discovery::FileDiscovery;
pub use github::GithubEnvironment;
pub use locator::{Location, locate, locate_in};
pub use validator::{ValidationEngine, ValidationResults};
pub use xmllint::{LintOutput, Linter, Toggle, Xmllint, XmllintOptions};
