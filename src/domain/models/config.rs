use serde::{Deserialize, Serialize};

/// Main configuration structure for the bilan engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Package used when none is given on the command line
    #[serde(default = "default_package")]
    pub default_package: String,

    /// Progression tuning constants
    #[serde(default)]
    pub engine: EngineConfig,

    /// Retry policy for question and summary generation
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_package() -> String {
    "essentiel".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_package: default_package(),
            engine: EngineConfig::default(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Product tuning constants of the progression engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Global progress at which the one-shot end warning fires
    #[serde(default = "default_end_warning_percent")]
    pub end_warning_percent: u8,

    /// Global progress at which the journey is complete
    #[serde(default = "default_completion_percent")]
    pub completion_percent: u8,

    /// Core answers required before career exploration is considered
    #[serde(default = "default_exploration_min_answers")]
    pub exploration_min_answers: u32,

    /// Minimum classifier confidence (0-100) to offer exploration
    #[serde(default = "default_exploration_min_confidence")]
    pub exploration_min_confidence: u8,

    /// Emit a mini-synthesis every N core answers
    #[serde(default = "default_mini_synthesis_every")]
    pub mini_synthesis_every: u32,

    /// Number of recent core answers fed to a mini-synthesis
    #[serde(default = "default_mini_synthesis_window")]
    pub mini_synthesis_window: usize,

    /// Out-of-scope checks run on the first N core answers
    #[serde(default = "default_scope_vigilance_answers")]
    pub scope_vigilance_answers: u32,

    /// Follow-up questions asked by an accepted module
    #[serde(default = "default_module_question_count")]
    pub module_question_count: u32,

    /// Share of phase time that must remain to deepen a category
    #[serde(default = "default_deepen_min_remaining_ratio")]
    pub deepen_min_remaining_ratio: f64,
}

const fn default_end_warning_percent() -> u8 {
    80
}

const fn default_completion_percent() -> u8 {
    100
}

const fn default_exploration_min_answers() -> u32 {
    10
}

const fn default_exploration_min_confidence() -> u8 {
    60
}

const fn default_mini_synthesis_every() -> u32 {
    6
}

const fn default_mini_synthesis_window() -> usize {
    6
}

const fn default_scope_vigilance_answers() -> u32 {
    5
}

const fn default_module_question_count() -> u32 {
    3
}

const fn default_deepen_min_remaining_ratio() -> f64 {
    0.25
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            end_warning_percent: default_end_warning_percent(),
            completion_percent: default_completion_percent(),
            exploration_min_answers: default_exploration_min_answers(),
            exploration_min_confidence: default_exploration_min_confidence(),
            mini_synthesis_every: default_mini_synthesis_every(),
            mini_synthesis_window: default_mini_synthesis_window(),
            scope_vigilance_answers: default_scope_vigilance_answers(),
            module_question_count: default_module_question_count(),
            deepen_min_remaining_ratio: default_deepen_min_remaining_ratio(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Total attempts, the first call included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    8_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for daily-rotated JSON log files (stdout only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
