//! Errors raised by the clinic collaborators (scheduling, billing, directory).

use thiserror::Error;

/// Failure of a call into a clinic service.
///
/// `Rejected` carries the service's own wording and is shown to the model
/// verbatim. Everything else is infrastructure trouble and gets a generic
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The service refused the request on business grounds.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The service is down or returned a server error.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),

    /// The service answered with something we could not read.
    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("request timed out")]
    Timeout,
}

impl CollaboratorError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Text handed to the model as the failed tool result.
    pub fn user_message(&self) -> String {
        match self {
            CollaboratorError::Rejected(message) => message.clone(),
            CollaboratorError::Timeout => {
                "The clinic system took too long to respond. Please try again shortly.".to_string()
            }
            _ => "The clinic system is temporarily unavailable. Please try again later.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_wording_is_preserved() {
        let err = CollaboratorError::rejected("The 09:00 slot on 2024-08-15 is already booked.");
        assert_eq!(err.user_message(), "The 09:00 slot on 2024-08-15 is already booked.");
    }

    #[test]
    fn infrastructure_detail_is_hidden() {
        let err = CollaboratorError::unavailable("500 from 10.0.0.4");
        assert!(!err.user_message().contains("10.0.0.4"));
    }
}
