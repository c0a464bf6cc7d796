//! Language model backend settings.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Which backend answers assistant turns and prompt flows.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAI,
    #[default]
    Anthropic,
}

impl AiProvider {
    fn key_variable(&self) -> &'static str {
        match self {
            AiProvider::OpenAI => "AI__OPENAI_API_KEY",
            AiProvider::Anthropic => "AI__ANTHROPIC_API_KEY",
        }
    }
}

/// Credentials and models for both backends; only the primary one is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub primary_provider: AiProvider,
    pub openai_model: String,
    pub anthropic_model: String,

    /// Replaces the primary provider's API root (proxies, local gateways).
    pub base_url: Option<String>,

    /// Per-request deadline for a single model call.
    pub timeout_secs: u64,

    /// Retries for rate limits, 5xx and network errors.
    pub max_retries: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            primary_provider: AiProvider::default(),
            openai_model: "gpt-4o-mini".to_string(),
            anthropic_model: "claude-3-5-haiku-20241022".to_string(),
            base_url: None,
            timeout_secs: 120,
            max_retries: 3,
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Non-blank key for `provider`.
    pub fn key_for(&self, provider: AiProvider) -> Option<&str> {
        let key = match provider {
            AiProvider::OpenAI => &self.openai_api_key,
            AiProvider::Anthropic => &self.anthropic_api_key,
        };
        key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.key_for(self.primary_provider)
    }

    pub fn primary_model(&self) -> &str {
        match self.primary_provider {
            AiProvider::OpenAI => &self.openai_model,
            AiProvider::Anthropic => &self.anthropic_model,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let any_key = [AiProvider::OpenAI, AiProvider::Anthropic]
            .into_iter()
            .any(|provider| self.key_for(provider).is_some());
        if !any_key {
            return Err(ValidationError::NoAiProviderConfigured);
        }
        if self.primary_key().is_none() {
            return Err(ValidationError::MissingRequired(
                self.primary_provider.key_variable(),
            ));
        }
        if self.primary_model().trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI model name"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anthropic() -> AiConfig {
        AiConfig {
            anthropic_api_key: Some("sk-ant-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn anthropic_is_primary_by_default() {
        let config = anthropic();
        assert_eq!(config.primary_provider, AiProvider::Anthropic);
        assert_eq!(config.primary_key(), Some("sk-ant-test"));
        assert_eq!(config.primary_model(), "claude-3-5-haiku-20241022");
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn no_keys_at_all() {
        assert_eq!(
            AiConfig::default().validate(),
            Err(ValidationError::NoAiProviderConfigured)
        );
    }

    #[test]
    fn primary_without_key_names_the_missing_variable() {
        let config = AiConfig {
            primary_provider: AiProvider::OpenAI,
            ..anthropic()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AI__OPENAI_API_KEY"))
        );
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = AiConfig {
            primary_provider: AiProvider::OpenAI,
            openai_api_key: Some("  ".to_string()),
            ..anthropic()
        };
        assert!(config.key_for(AiProvider::OpenAI).is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    fn openai_primary_uses_openai_model() {
        let config = AiConfig {
            primary_provider: AiProvider::OpenAI,
            openai_api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(config.primary_model(), "gpt-4o-mini");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = AiConfig {
            timeout_secs: 0,
            ..anthropic()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }
}
