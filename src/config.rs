use crate::cli::Cli;
use crate::error::{ConfigError, ConfigResult};
use crate::file_discovery::FileDiscovery;
use crate::xmllint::{Toggle, XmllintOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Main application configuration.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Folder to search, relative to the working directory
    pub root_folder: PathBuf,
    /// Glob selecting the files to check
    pub file_pattern: String,
    /// Pass `--huge` to xmllint
    pub huge_files: Toggle,
    /// Pass `--validate` to xmllint
    pub validate: Toggle,
    /// xmllint executable, looked up on PATH unless it contains a separator
    pub xmllint: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_folder: PathBuf::from("."),
            file_pattern: "**/*.xml".to_string(),
            huge_files: Toggle::Off,
            validate: Toggle::Off,
            xmllint: PathBuf::from("xmllint"),
        }
    }
}

impl Config {
    pub fn xmllint_options(&self) -> XmllintOptions {
        XmllintOptions {
            huge_files: self.huge_files,
            validate: self.validate,
        }
    }

    pub fn file_discovery(&self) -> ConfigResult<FileDiscovery> {
        FileDiscovery::new(&self.root_folder, &self.file_pattern)
    }
}

const CONFIG_NAMES: [&str; 4] = [
    "xmllint-action.toml",
    "xmllint-action.json",
    ".xmllint-action.toml",
    ".xmllint-action.json",
];

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> CLI/environment
    pub async fn load_config(cli: &Cli, workspace: &Path) -> ConfigResult<Config> {
        let config = if let Some(config_path) = &cli.config {
            Self::load_from_file(config_path).await?
        } else if let Some(found) = Self::find_config_file(workspace).await? {
            found
        } else {
            Config::default()
        };

        let config = Self::merge_with_cli(config, cli);
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> ConfigResult<Config> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find a configuration file in the workspace, then in the user config directory
    pub async fn find_config_file(workspace: &Path) -> ConfigResult<Option<Config>> {
        let user_dir = dirs::config_dir().map(|dir| dir.join("xmllint-action"));

        for dir in std::iter::once(workspace.to_path_buf()).chain(user_dir) {
            for name in CONFIG_NAMES {
                let path = dir.join(name);
                if path.is_file() {
                    tracing::debug!("Using configuration file {}", path.display());
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence).
    ///
    /// Empty paths and patterns count as not given.
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(root_folder) = cli.root_folder.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            config.root_folder = root_folder.clone();
        }
        if let Some(file_pattern) = cli.file_pattern.as_ref().filter(|p| !p.trim().is_empty()) {
            config.file_pattern = file_pattern.clone();
        }
        if let Some(huge_files) = cli.huge_files {
            config.huge_files = huge_files;
        }
        if let Some(validate) = cli.validate {
            config.validate = validate;
        }
        if let Some(xmllint) = cli.xmllint.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            config.xmllint = xmllint.clone();
        }
        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> ConfigResult<()> {
        if config.root_folder.is_absolute() {
            return Err(ConfigError::AbsoluteRoot {
                path: config.root_folder.clone(),
            });
        }

        if config.file_pattern.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "file-pattern".to_string(),
                value: config.file_pattern.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        if config.xmllint.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "xmllint".to_string(),
                value: String::new(),
                reason: "must name an executable".to_string(),
            });
        }

        // Surface glob syntax errors before any file is touched
        config.file_discovery()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.root_folder, PathBuf::from("."));
        assert_eq!(config.file_pattern, "**/*.xml");
        assert_eq!(config.huge_files, Toggle::Off);
        assert_eq!(config.validate, Toggle::Off);
        assert_eq!(config.xmllint, PathBuf::from("xmllint"));
        assert_eq!(config.xmllint_options(), XmllintOptions::default());
        assert!(ConfigManager::validate_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_load_toml_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"
root-folder = "docs"
file-pattern = "**/*.svg"
validate = "on"
"#,
        )
        .unwrap();

        let config = ConfigManager::load_from_file(&config_path).await.unwrap();

        assert_eq!(config.root_folder, PathBuf::from("docs"));
        assert_eq!(config.file_pattern, "**/*.svg");
        assert_eq!(config.validate, Toggle::On);
        // unspecified fields keep their defaults
        assert_eq!(config.huge_files, Toggle::Off);
        assert_eq!(config.xmllint, PathBuf::from("xmllint"));
    }

    #[tokio::test]
    async fn test_load_json_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        fs::write(
            &config_path,
            r#"{ "huge-files": "on", "xmllint": "/usr/local/bin/xmllint" }"#,
        )
        .unwrap();

        let config = ConfigManager::load_from_file(&config_path).await.unwrap();

        assert_eq!(config.huge_files, Toggle::On);
        assert_eq!(config.xmllint, PathBuf::from("/usr/local/bin/xmllint"));
        assert_eq!(config.file_pattern, "**/*.xml");
    }

    #[tokio::test]
    async fn test_unsupported_file_format() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "validate: on").unwrap();

        match ConfigManager::load_from_file(&config_path).await {
            Err(ConfigError::UnsupportedFormat(ext)) => assert_eq!(ext, "yaml"),
            other => panic!("Expected UnsupportedFormat error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "validate = \"maybe\"").unwrap();

        let result = ConfigManager::load_from_file(&config_path).await;
        assert!(matches!(result, Err(ConfigError::TomlParsing(_))));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "{ invalid json }").unwrap();

        let result = ConfigManager::load_from_file(&config_path).await;
        assert!(matches!(result, Err(ConfigError::JsonParsing(_))));
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let result = ConfigManager::load_from_file(Path::new("/nonexistent/config.toml")).await;
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[tokio::test]
    async fn test_find_config_file_in_workspace() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".xmllint-action.toml"),
            "file-pattern = \"*.xhtml\"\n",
        )
        .unwrap();

        let config = ConfigManager::find_config_file(temp_dir.path())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(config.file_pattern, "*.xhtml");
    }

    #[test]
    fn test_merge_with_cli() {
        let cli = Cli::try_parse_from([
            "xmllint-action",
            "--file-pattern",
            "*.xsd",
            "--validate",
            "on",
        ])
        .unwrap();

        let mut base = Config::default();
        base.root_folder = PathBuf::from("schemas");
        base.huge_files = Toggle::On;

        let config = ConfigManager::merge_with_cli(base, &cli);
        assert_eq!(config.file_pattern, "*.xsd");
        assert_eq!(config.validate, Toggle::On);
        // values the CLI does not mention survive
        assert_eq!(config.root_folder, PathBuf::from("schemas"));
        assert_eq!(config.huge_files, Toggle::On);
    }

    #[test]
    fn test_merge_ignores_empty_inputs() {
        let cli = Cli::try_parse_from([
            "xmllint-action",
            "--root-folder",
            "",
            "--file-pattern",
            "",
            "--xmllint",
            "",
        ])
        .unwrap();

        let mut base = Config::default();
        base.root_folder = PathBuf::from("schemas");

        let config = ConfigManager::merge_with_cli(base, &cli);
        assert_eq!(config.root_folder, PathBuf::from("schemas"));
        assert_eq!(config.file_pattern, "**/*.xml");
        assert_eq!(config.xmllint, PathBuf::from("xmllint"));
        assert!(ConfigManager::validate_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_load_config_cli_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("action.toml");
        fs::write(&config_path, "root-folder = \"docs\"\nvalidate = \"on\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "xmllint-action",
            "--config",
            config_path.to_str().unwrap(),
            "--validate",
            "off",
        ])
        .unwrap();

        let config = ConfigManager::load_config(&cli, temp_dir.path())
            .await
            .unwrap();
        assert_eq!(config.root_folder, PathBuf::from("docs"));
        assert_eq!(config.validate, Toggle::Off);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(ConfigManager::validate_config(&config).is_ok());

        config.root_folder = std::env::temp_dir();
        assert!(matches!(
            ConfigManager::validate_config(&config),
            Err(ConfigError::AbsoluteRoot { .. })
        ));
        config.root_folder = PathBuf::from(".");

        config.file_pattern = "  ".to_string();
        assert!(matches!(
            ConfigManager::validate_config(&config),
            Err(ConfigError::InvalidValue { .. })
        ));

        config.file_pattern = "**/{a,b".to_string();
        assert!(matches!(
            ConfigManager::validate_config(&config),
            Err(ConfigError::InvalidPattern { .. })
        ));
        config.file_pattern = "**/*.xml".to_string();

        config.xmllint = PathBuf::new();
        assert!(matches!(
            ConfigManager::validate_config(&config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
