use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::Package;
use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {name}: {value}. Must be between 1 and 100")]
    InvalidPercent { name: &'static str, value: u8 },

    #[error(
        "Invalid thresholds: end_warning_percent ({0}) must not exceed completion_percent ({1})"
    )]
    WarningAfterCompletion(u8, u8),

    #[error("Invalid {0}: must be at least 1")]
    ZeroCount(&'static str),

    #[error("Invalid exploration_min_confidence: {0}. Must be between 0 and 100")]
    InvalidConfidence(u8),

    #[error("Invalid deepen_min_remaining_ratio: {0}. Must be between 0.0 and 1.0")]
    InvalidRatio(f64),

    #[error("Invalid max_attempts: {0}. Cannot be 0")]
    InvalidMaxAttempts(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Unknown default_package: {0}")]
    UnknownPackage(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .bilan/config.yaml (project config)
    /// 3. .bilan/local.yaml (local overrides, optional)
    /// 4. Environment variables (BILAN_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`ConfigLoader::load`], with `.bilan/` resolved under `project_dir`.
    pub fn load_from(project_dir: &Path) -> Result<Config> {
        let dir = project_dir.join(".bilan");
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("BILAN_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let engine = &config.engine;

        for (name, value) in [
            ("end_warning_percent", engine.end_warning_percent),
            ("completion_percent", engine.completion_percent),
        ] {
            if value == 0 || value > 100 {
                return Err(ConfigError::InvalidPercent { name, value });
            }
        }

        if engine.end_warning_percent > engine.completion_percent {
            return Err(ConfigError::WarningAfterCompletion(
                engine.end_warning_percent,
                engine.completion_percent,
            ));
        }

        if engine.exploration_min_confidence > 100 {
            return Err(ConfigError::InvalidConfidence(
                engine.exploration_min_confidence,
            ));
        }

        for (name, value) in [
            ("mini_synthesis_every", engine.mini_synthesis_every),
            ("scope_vigilance_answers", engine.scope_vigilance_answers),
            ("module_question_count", engine.module_question_count),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCount(name));
            }
        }

        if engine.mini_synthesis_window == 0 {
            return Err(ConfigError::ZeroCount("mini_synthesis_window"));
        }

        if !(0.0..=1.0).contains(&engine.deepen_min_remaining_ratio) {
            return Err(ConfigError::InvalidRatio(engine.deepen_min_remaining_ratio));
        }

        // Validate retry config
        if config.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.retry.max_attempts));
        }

        if config.retry.initial_backoff_ms > config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if Package::by_id(&config.default_package).is_err() {
            return Err(ConfigError::UnknownPackage(config.default_package.clone()));
        }

        Ok(())
    }
}
