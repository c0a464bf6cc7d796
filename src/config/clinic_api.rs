//! Clinic backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Where the scheduling, billing and patient collaborators live
#[derive(Debug, Clone, Deserialize)]
pub struct ClinicApiConfig {
    /// Base URL of the clinic REST backend (e.g. `https://clinic.internal/api`)
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Serve collaborators from the seeded in-memory clinic instead of HTTP
    #[serde(default)]
    pub use_in_memory: bool,
}

impl ClinicApiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash
    pub fn normalized_base_url(&self) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
    }

    /// Validate clinic backend configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.use_in_memory {
            return Ok(());
        }

        let url = self
            .normalized_base_url()
            .ok_or(ValidationError::MissingRequired("CLINIC_API__BASE_URL"))?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ValidationError::InvalidClinicApiUrl);
        }
        if *environment == Environment::Production && !url.starts_with("https://") {
            return Err(ValidationError::ClinicApiMustBeHttps);
        }
        Ok(())
    }
}

impl Default for ClinicApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout(),
            use_in_memory: false,
        }
    }
}

fn default_timeout() -> u64 {
    15
}
