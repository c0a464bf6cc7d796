//! Assistant turn configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Limits and presentation settings for assistant turns
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Clinic name rendered into persona prompts
    #[serde(default = "default_clinic_name")]
    pub clinic_name: String,

    /// Maximum tool-call rounds per turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Wall-clock budget for one turn, in seconds
    #[serde(default = "default_turn_timeout")]
    pub turn_timeout_secs: u64,

    /// Completion token cap per model call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// How many times a malformed final answer is sent back to the model
    #[serde(default = "default_hygiene_retries")]
    pub hygiene_retries: u32,
}

impl AssistantConfig {
    /// Get turn timeout as Duration
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    /// Validate assistant settings against the enclosing request timeout
    pub fn validate(&self, request_timeout_secs: u64) -> Result<(), ValidationError> {
        if self.clinic_name.trim().is_empty() {
            return Err(ValidationError::EmptyClinicName);
        }
        if !(1..=20).contains(&self.max_tool_rounds) {
            return Err(ValidationError::InvalidToolRoundLimit);
        }
        if self.turn_timeout_secs == 0 || self.turn_timeout_secs >= request_timeout_secs {
            return Err(ValidationError::InvalidTurnTimeout);
        }
        if self.hygiene_retries > 3 {
            return Err(ValidationError::InvalidHygieneRetries);
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        Ok(())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            clinic_name: default_clinic_name(),
            max_tool_rounds: default_max_tool_rounds(),
            turn_timeout_secs: default_turn_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            hygiene_retries: default_hygiene_retries(),
        }
    }
}

fn default_clinic_name() -> String {
    "HealthAI Assist".to_string()
}

fn default_max_tool_rounds() -> u32 {
    5
}

fn default_turn_timeout() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.2
}

fn default_hygiene_retries() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AssistantConfig::default();
        assert_eq!(config.max_tool_rounds, 5);
        assert_eq!(config.turn_timeout(), Duration::from_secs(60));
        assert!(config.validate(90).is_ok());
    }

    #[test]
    fn test_round_limit_bounds() {
        for rounds in [0, 21] {
            let config = AssistantConfig {
                max_tool_rounds: rounds,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(90),
                Err(ValidationError::InvalidToolRoundLimit)
            ));
        }
    }

    #[test]
    fn test_turn_timeout_must_fit_inside_request_timeout() {
        let config = AssistantConfig {
            turn_timeout_secs: 90,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(90),
            Err(ValidationError::InvalidTurnTimeout)
        ));
    }

    #[test]
    fn test_hygiene_retry_bound() {
        let config = AssistantConfig {
            hygiene_retries: 4,
            ..Default::default()
        };
        assert!(config.validate(90).is_err());
    }

    #[test]
    fn test_blank_clinic_name_is_rejected() {
        let config = AssistantConfig {
            clinic_name: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(90),
            Err(ValidationError::EmptyClinicName)
        ));
    }
}
