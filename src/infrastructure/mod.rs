//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - Bounded retry for generation collaborators

pub mod config;
pub mod logging;
pub mod retry;

pub use config::{ConfigError, ConfigLoader};
pub use logging::LoggerImpl;
pub use retry::{RetryExhausted, RetryPolicy};
