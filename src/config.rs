//! User configuration from `.cmrc` files and environment overrides.
//!
//! The file is JSON and is looked up in the current directory first, then in
//! the home directory. Every field has a default, so a partial file is fine.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::diff::ProcessorConfig;
use crate::error::ConfigError;
use crate::llm::Provider;
use crate::prompt::CommitStyle;

/// Config file name, looked up in the working directory and then `$HOME`.
pub const CONFIG_FILENAME: &str = ".cmrc";

/// Environment variable overriding the provider.
pub const PROVIDER_ENV_VAR: &str = "CM_PROVIDER";

/// Environment variable overriding the model.
pub const MODEL_ENV_VAR: &str = "CM_MODEL";

/// User configuration with defaults for every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Provider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub style: CommitStyle,
    pub include_body: bool,
    pub max_subject_length: usize,
    pub ticket_prefix: String,
    /// Files listed before the staged-file display collapses.
    pub max_file_display: usize,
    /// Token budget for the detailed diff.
    pub max_tokens: usize,
    pub max_lines_per_file: usize,
}

impl Default for Config {
    fn default() -> Self {
        let processor = ProcessorConfig::default();
        Self {
            provider: Provider::Auto,
            model: None,
            style: CommitStyle::Conventional,
            include_body: true,
            max_subject_length: 72,
            ticket_prefix: "Refs".to_string(),
            max_file_display: 10,
            max_tokens: processor.max_tokens,
            max_lines_per_file: processor.max_lines_per_file,
        }
    }
}

/// A loaded configuration and the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Read a config file. Unknown keys are ignored.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `local_dir/.cmrc`, then `home_dir/.cmrc`, else defaults.
    ///
    /// A file that exists but cannot be read or parsed is reported with a
    /// warning and replaced by the defaults.
    pub fn load_from(local_dir: &Path, home_dir: Option<&Path>) -> LoadedConfig {
        let candidates = std::iter::once(local_dir).chain(home_dir);

        for dir in candidates {
            let path = dir.join(CONFIG_FILENAME);
            if !path.is_file() {
                continue;
            }
            debug!("Loading config from {}", path.display());
            let config = Config::from_file(&path).unwrap_or_else(|e| {
                warn!("Could not load {}: {e}. Using defaults.", path.display());
                Config::default()
            });
            return LoadedConfig {
                config,
                path: Some(path),
            };
        }

        LoadedConfig {
            config: Config::default(),
            path: None,
        }
    }

    /// Load from the current directory and home directory, then apply
    /// environment overrides.
    ///
    /// The result is not validated; call [`Config::validate`] once command
    /// line overrides have been applied.
    pub fn load() -> Result<LoadedConfig, ConfigError> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let home = home_dir();
        Config::load_in(&cwd, home.as_deref())
    }

    /// [`Config::load_from`] followed by environment overrides.
    pub fn load_in(local_dir: &Path, home_dir: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let mut loaded = Config::load_from(local_dir, home_dir);
        loaded.config.apply_env_overrides()?;
        Ok(loaded)
    }

    /// Apply `CM_PROVIDER` and `CM_MODEL`. Empty values are ignored.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var(PROVIDER_ENV_VAR)
            && !value.trim().is_empty()
        {
            self.provider = value
                .parse()
                .map_err(|_| ConfigError::UnknownProvider(value.clone()))?;
        }
        if let Ok(value) = env::var(MODEL_ENV_VAR)
            && !value.trim().is_empty()
        {
            self.model = Some(value);
        }
        Ok(())
    }

    /// Reject limits that would make processing meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_tokens", self.max_tokens),
            ("max_lines_per_file", self.max_lines_per_file),
            ("max_subject_length", self.max_subject_length),
            ("max_file_display", self.max_file_display),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if self.ticket_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ticket_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            max_tokens: self.max_tokens,
            max_lines_per_file: self.max_lines_per_file,
        }
    }

    /// Pretty JSON for `--display-config`.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// The user's home directory from `HOME` (or `USERPROFILE` on Windows).
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn write_config(dir: &Path, content: &str) {
        std::fs::write(dir.join(CONFIG_FILENAME), content).unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.provider, Provider::Auto);
        assert_eq!(config.model, None);
        assert_eq!(config.style, CommitStyle::Conventional);
        assert!(config.include_body);
        assert_eq!(config.max_subject_length, 72);
        assert_eq!(config.ticket_prefix, "Refs");
        assert_eq!(config.max_tokens, 3000);
        assert_eq!(config.max_lines_per_file, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults_and_ignores_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{"provider": "ollama", "style": "simple", "max_tokens": 1500, "theme": "dark"}"#,
        );

        let loaded = Config::load_from(dir.path(), None);
        assert_eq!(loaded.path, Some(dir.path().join(CONFIG_FILENAME)));
        assert_eq!(loaded.config.provider, Provider::Ollama);
        assert_eq!(loaded.config.style, CommitStyle::Simple);
        assert_eq!(loaded.config.max_tokens, 1500);
        assert_eq!(loaded.config.max_lines_per_file, 200);
    }

    #[test]
    fn test_local_file_wins_over_home() {
        let local = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        write_config(local.path(), r#"{"ticket_prefix": "Local"}"#);
        write_config(home.path(), r#"{"ticket_prefix": "Home"}"#);

        let loaded = Config::load_from(local.path(), Some(home.path()));
        assert_eq!(loaded.config.ticket_prefix, "Local");
    }

    #[test]
    fn test_home_file_used_when_no_local() {
        let local = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        write_config(home.path(), r#"{"include_body": false}"#);

        let loaded = Config::load_from(local.path(), Some(home.path()));
        assert!(!loaded.config.include_body);
        assert_eq!(loaded.path, Some(home.path().join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "{not json");

        let loaded = Config::load_from(dir.path(), None);
        assert_eq!(loaded.config, Config::default());
        assert!(loaded.path.is_some());
    }

    #[test]
    fn test_from_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), r#"{"style": "fancy"}"#);

        let result = Config::from_file(&dir.path().join(CONFIG_FILENAME));
        assert!(matches!(result, Err(ConfigError::ParseFailed { .. })));
    }

    #[test]
    fn test_no_files_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(dir.path(), None);
        assert!(loaded.path.is_none());
        assert_eq!(loaded.config, Config::default());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = Config {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "max_tokens", .. })
        ));

        let config = Config {
            max_lines_per_file: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "max_lines_per_file", .. })
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides_provider_and_model() {
        temp_env::with_vars(
            [(PROVIDER_ENV_VAR, Some("claude")), (MODEL_ENV_VAR, Some("claude-haiku"))],
            || {
                let mut config = Config::default();
                config.apply_env_overrides().unwrap();
                assert_eq!(config.provider, Provider::Claude);
                assert_eq!(config.model.as_deref(), Some("claude-haiku"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_env_unknown_provider_is_an_error() {
        temp_env::with_var(PROVIDER_ENV_VAR, Some("gpt"), || {
            let mut config = Config::default();
            assert!(matches!(
                config.apply_env_overrides(),
                Err(ConfigError::UnknownProvider(p)) if p == "gpt"
            ));
        });
    }

    #[test]
    #[serial]
    fn test_env_empty_values_are_ignored() {
        temp_env::with_vars([(PROVIDER_ENV_VAR, Some("")), (MODEL_ENV_VAR, Some(""))], || {
            let mut config = Config::default();
            config.apply_env_overrides().unwrap();
            assert_eq!(config, Config::default());
        });
    }

    #[test]
    #[serial]
    fn test_load_in_leaves_validation_to_caller() {
        let local = tempfile::tempdir().unwrap();
        write_config(local.path(), r#"{"max_tokens": 0}"#);

        temp_env::with_vars_unset([PROVIDER_ENV_VAR, MODEL_ENV_VAR], || {
            let mut loaded = Config::load_in(local.path(), None).unwrap();
            assert_eq!(loaded.config.max_tokens, 0);
            assert!(loaded.config.validate().is_err());

            loaded.config.max_tokens = 800;
            assert!(loaded.config.validate().is_ok());
        });
    }

    #[test]
    fn test_processor_config_mirrors_limits() {
        let config = Config {
            max_tokens: 42,
            max_lines_per_file: 7,
            ..Default::default()
        };
        assert_eq!(
            config.processor_config(),
            ProcessorConfig {
                max_tokens: 42,
                max_lines_per_file: 7
            }
        );
    }
}
