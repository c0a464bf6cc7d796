//! Startup configuration errors. Any of these stops the process.

use thiserror::Error;

/// Reading `CLINIC_ASSIST__*` variables failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value is out of range or inconsistent with another.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("No AI provider configured")]
    NoAiProviderConfigured,

    #[error("Invalid clinic API base URL")]
    InvalidClinicApiUrl,

    #[error("Clinic API base URL must use HTTPS in production")]
    ClinicApiMustBeHttps,

    #[error("Tool round limit must be between 1 and 20")]
    InvalidToolRoundLimit,

    #[error("Turn timeout must be positive and shorter than the request timeout")]
    InvalidTurnTimeout,

    #[error("Hygiene retries must be between 0 and 3")]
    InvalidHygieneRetries,

    #[error("Temperature must be between 0.0 and 1.0")]
    InvalidTemperature,

    #[error("Clinic name cannot be empty")]
    EmptyClinicName,
}
