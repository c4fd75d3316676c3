//! Configuration types for the onboarding wizard

use crate::definition::WizardDefinition;
use crate::submit::OutboxSubmitter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings plus the wizard being run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory submissions are written to
    pub outbox_dir: PathBuf,

    /// Give up on a submission after this many seconds (unset = wait forever)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_timeout_secs: Option<u64>,

    /// Artificial latency added to every submission, in milliseconds
    #[serde(default)]
    pub submit_delay_ms: u64,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Steps and fields of the wizard
    #[serde(default)]
    pub wizard: WizardDefinition,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            outbox_dir: PathBuf::from("Submissions"),
            submit_timeout_secs: None,
            submit_delay_ms: 0,
            verbose: false,
            wizard: WizardDefinition::default(),
        }
    }
}

impl Config {
    /// Submission timeout, if one is configured
    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Submitter writing into the configured outbox
    pub fn submitter(&self) -> OutboxSubmitter {
        OutboxSubmitter::new(&self.outbox_dir)
            .with_definition(self.wizard.clone())
            .with_delay(Duration::from_millis(self.submit_delay_ms))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config
            .wizard
            .validate()
            .map_err(|e| ConfigError::InvalidWizard {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(&Config::default())
            .map_err(|e| ConfigError::SerializeError { source: e })?;

        Ok(format!(
            r#"# Expert Onboarding Configuration File
# This file uses TOML format (https://toml.io)
#
# outbox_dir          directory submissions are written to
# submit_timeout_secs optional; a submission still running after this many
#                     seconds is reported as failed
# submit_delay_ms     artificial latency added to every submission
#
# [wizard] describes the steps. Each [[wizard.steps.fields]] entry takes:
#   key, label, kind ("text", "list", "choice" or "toggle"),
#   options (choice only), required, pattern (regex), placeholder
# List fields are typed as "a; b; c".

{body}"#
        ))
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// The wizard section cannot be run
    InvalidWizard { path: PathBuf, message: String },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::InvalidWizard { path, message } => {
                write!(f, "Invalid wizard in '{}': {}", path.display(), message)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::InvalidWizard { .. } => None,
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_config_parses_to_default() {
        let sample = Config::sample_config().unwrap();
        let parsed: Config = toml::from_str(&sample).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("wizard.toml");

        let mut config = Config::default();
        config.outbox_dir = dir.path().join("out");
        config.submit_timeout_secs = Some(30);
        config.wizard.title = "Partner Onboarding".into();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.submit_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_minimal_file_uses_default_wizard() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("minimal.toml");
        fs::write(&path, "outbox_dir = \"out\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.wizard, WizardDefinition::default());
        assert_eq!(config.submit_timeout(), None);
        assert_eq!(config.submit_delay_ms, 0);
    }

    #[test]
    fn test_custom_wizard_from_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
outbox_dir = "out"
submit_timeout_secs = 0

[wizard]
title = "Quick Signup"

[[wizard.steps]]
id = "contact"
title = "Contact"

[[wizard.steps.fields]]
key = "email"
label = "Email"
required = true
pattern = "@"

[[wizard.steps]]
id = "focus"
title = "Focus"

[[wizard.steps.fields]]
key = "area"
label = "Area"
kind = "choice"
options = ["NLP", "Vision"]
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.wizard.step_count(), 2);
        assert_eq!(config.wizard.step(2).unwrap().fields[0].options.len(), 2);
        assert_eq!(config.submit_timeout(), None);
    }

    #[test]
    fn test_invalid_wizard_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(
            &path,
            "outbox_dir = \"out\"\n\n[wizard]\ntitle = \"Nothing\"\nsteps = []\n",
        )
        .unwrap();

        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::InvalidWizard { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Config::load_from_file(dir.path().join("absent.toml")),
            Err(ConfigError::ReadError { .. })
        ));
    }
}
