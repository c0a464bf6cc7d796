//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `CLINIC_ASSIST` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use clinic_assist::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod assistant;
mod clinic_api;
mod error;
mod server;

pub use ai::{AiConfig, AiProvider};
pub use assistant::AssistantConfig;
pub use clinic_api::ClinicApiConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// AI provider configuration (OpenAI/Anthropic)
    #[serde(default)]
    pub ai: AiConfig,

    /// Clinic backend hosting the scheduling, billing and patient services
    #[serde(default)]
    pub clinic_api: ClinicApiConfig,

    /// Turn limits and prompt settings
    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` when present, then reads `CLINIC_ASSIST__*` variables.
    ///
    /// - `CLINIC_ASSIST__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CLINIC_ASSIST__ASSISTANT__MAX_TOOL_ROUNDS=3` -> `assistant.max_tool_rounds = 3`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CLINIC_ASSIST")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.clinic_api.validate(&self.server.environment)?;
        self.assistant.validate(self.server.request_timeout_secs)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const BASE: [(&str, &str); 2] = [
        ("CLINIC_ASSIST__AI__ANTHROPIC_API_KEY", "sk-ant-test"),
        ("CLINIC_ASSIST__CLINIC_API__BASE_URL", "http://localhost:9002/api"),
    ];

    /// Loads with `BASE` plus `extra` set, then removes them again.
    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let vars: Vec<_> = BASE.iter().chain(extra).collect();
        for (key, value) in &vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        for (key, _) in &vars {
            env::remove_var(key);
        }
        result
    }

    #[test]
    fn minimal_environment_loads_and_validates() {
        let config = load_with(&[]).unwrap();

        assert_eq!(
            config.clinic_api.normalized_base_url().as_deref(),
            Some("http://localhost:9002/api")
        );
        assert_eq!(config.ai.primary_key(), Some("sk-ant-test"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.assistant.max_tool_rounds, 5);
        assert_eq!(config.assistant.clinic_name, "HealthAI Assist");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_variables_override_defaults() {
        let config = load_with(&[
            ("CLINIC_ASSIST__ASSISTANT__MAX_TOOL_ROUNDS", "3"),
            ("CLINIC_ASSIST__SERVER__PORT", "9090"),
        ])
        .unwrap();

        assert_eq!(config.assistant.max_tool_rounds, 3);
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn production_refuses_plain_http_backend() {
        let config = load_with(&[("CLINIC_ASSIST__SERVER__ENVIRONMENT", "production")]).unwrap();

        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::ClinicApiMustBeHttps));
    }

    #[test]
    fn in_memory_clinic_needs_no_backend_url() {
        let mut config = load_with(&[("CLINIC_ASSIST__CLINIC_API__USE_IN_MEMORY", "true")]).unwrap();
        config.clinic_api.base_url = None;

        assert!(config.clinic_api.use_in_memory);
        assert!(config.validate().is_ok());
    }
}
