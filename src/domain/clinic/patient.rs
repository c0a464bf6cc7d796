//! Patient directory records.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PatientId, ValidationError};

/// A patient as listed in the clinic directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub email: String,
    /// Initials or image reference shown in the dashboard.
    #[serde(default)]
    pub avatar: String,
}

impl Patient {
    /// Case-insensitive substring match on the name.
    pub fn matches_name(&self, filter: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&filter.trim().to_lowercase())
    }

    /// Two-letter initials, used when the backend sends no avatar.
    pub fn initials(name: &str) -> String {
        name.split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// The authenticated patient a patient-facing turn runs on behalf of.
///
/// Supplied by the gateway, never by the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    id: PatientId,
    name: String,
}

impl PatientIdentity {
    pub fn new(id: PatientId, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("patient.name"));
        }
        Ok(Self { id, name })
    }

    pub fn id(&self) -> &PatientId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_take_first_two_words() {
        assert_eq!(Patient::initials("john ronald doe"), "JR");
        assert_eq!(Patient::initials("Cher"), "C");
    }

    #[test]
    fn name_filter_is_case_insensitive() {
        let patient = Patient {
            id: PatientId::new("p1").unwrap(),
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            avatar: "JS".to_string(),
        };
        assert!(patient.matches_name("smi"));
        assert!(patient.matches_name(" JANE "));
        assert!(!patient.matches_name("doe"));
    }

    #[test]
    fn identity_requires_a_name() {
        let id = PatientId::new("p1").unwrap();
        assert!(PatientIdentity::new(id.clone(), "   ").is_err());
        let identity = PatientIdentity::new(id, " John Doe ").unwrap();
        assert_eq!(identity.name(), "John Doe");
    }
}
