// src/config/loader.rs
//! Layered configuration loader
//!
//! Sources are applied in order, later ones overriding earlier ones:
//!
//! 1. serde defaults on [`ProbeConfig`]
//! 2. TOML files, in the order given (missing files are skipped)
//! 3. environment variables prefixed `METABOLIC_`, with `__` separating
//!    nested keys (e.g. `METABOLIC_BASAL_COEFFICIENT=1.5`)
//!
//! The merged result is validated before it is returned.

use std::path::{Path, PathBuf};

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::constants::paths;
use crate::config::validator::{ConfigValidator, ValidationError};
use crate::config::ProbeConfig;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation errors: {}", join_errors(.0))]
    ValidationError(Vec<ValidationError>),

    #[error("IO error: {0}")]
    IoError(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  {}", e))
        .collect()
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<::config::ConfigError> for ConfigError {
    fn from(err: ::config::ConfigError) -> Self {
        match err {
            ::config::ConfigError::NotFound(key) => ConfigError::FileNotFound(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

/// Loads [`ProbeConfig`] from layered TOML files and the environment
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Loader over the default local config files, with environment overrides
    pub fn new() -> Self {
        Self::with_paths(vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ])
    }

    /// Loader over custom paths, with environment overrides
    pub fn with_paths(config_paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths,
            env_prefix: Some(paths::ENV_PREFIX.to_string()),
        }
    }

    /// Override the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Ignore environment variables entirely.
    pub fn without_environment(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Merge every source and validate the result.
    pub fn load(&self) -> Result<ProbeConfig, ConfigError> {
        let mut builder = Config::builder();

        for path in &self.config_paths {
            if path.exists() {
                debug!(path = %path.display(), "layering probe configuration file");
                builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
            } else {
                warn!(path = %path.display(), "skipping missing configuration file");
            }
        }

        builder = self.add_environment(builder);
        self.finish(builder)
    }

    /// Parse a TOML document, then apply environment overrides.
    pub fn load_from_str(&self, content: &str) -> Result<ProbeConfig, ConfigError> {
        let builder = Config::builder().add_source(File::from_str(content, FileFormat::Toml));
        let builder = self.add_environment(builder);
        self.finish(builder)
    }

    /// Load a single file, which must exist.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<ProbeConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        self.load_from_str(&content)
    }

    /// Validate a configuration file without environment overrides.
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ProbeConfig = toml::from_str(&content)?;

        ConfigValidator::new()
            .validate(&config)
            .map_err(ConfigError::ValidationError)
    }

    /// Write a configuration to a TOML file.
    pub fn export_config<P: AsRef<Path>>(&self, config: &ProbeConfig, path: P) -> Result<(), ConfigError> {
        let toml_content = toml::to_string_pretty(config)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    fn add_environment(&self, builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        match &self.env_prefix {
            Some(prefix) => builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator(paths::ENV_SEPARATOR)
                    .try_parsing(true),
            ),
            None => builder,
        }
    }

    fn finish(&self, builder: ConfigBuilder<DefaultState>) -> Result<ProbeConfig, ConfigError> {
        let config: ProbeConfig = builder.build()?.try_deserialize()?;

        ConfigValidator::new()
            .validate(&config)
            .map_err(ConfigError::ValidationError)?;

        debug!(
            probe = %config.name,
            muscles = config.metabolic_parameters.len(),
            "loaded probe configuration"
        );
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
