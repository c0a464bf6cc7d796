//! SuggestResponsesHandler - draft replies to a patient inquiry.

use std::sync::Arc;

use super::{complete_once, require, FlowError};
use crate::ports::AIProvider;

const SYSTEM_PROMPT: &str = "You help clinic staff answer patient inquiries quickly. Given an \
inquiry, write several short replies a doctor or staff member could send. Put each reply on its \
own line starting with \"- \". Do not add any other text.";

/// Upper bound on suggestions returned.
const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct SuggestResponsesCommand {
    pub patient_inquiry: String,
}

pub struct SuggestResponsesHandler {
    provider: Arc<dyn AIProvider>,
}

impl SuggestResponsesHandler {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(&self, cmd: SuggestResponsesCommand) -> Result<Vec<String>, FlowError> {
        require("patientInquiry", &cmd.patient_inquiry)?;
        let prompt = format!("Patient Inquiry: {}", cmd.patient_inquiry.trim());
        let text =
            complete_once(self.provider.as_ref(), "flow.suggestions", SYSTEM_PROMPT, prompt, 512)
                .await?;

        let suggestions = parse_list(&text);
        if suggestions.is_empty() {
            return Err(FlowError::EmptyResponse);
        }
        Ok(suggestions)
    }
}

/// Reads `- item`, `* item` or `1. item` lines. Falls back to non-empty
/// lines when the model ignored the list format.
fn parse_list(text: &str) -> Vec<String> {
    let bulleted: Vec<String> = text
        .lines()
        .filter_map(|line| strip_marker(line.trim()))
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();

    let items = if bulleted.is_empty() {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        bulleted
    };
    items.into_iter().take(MAX_SUGGESTIONS).collect()
}

fn strip_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(rest.trim());
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ").or_else(|| line[digits..].strip_prefix(") ")) {
            return Some(rest.trim());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;

    #[test]
    fn parses_bullets_and_numbers() {
        let text = "Here you go:\n- Sure, we can see you Monday.\n* Please call the front desk.\n3. We'll send a refill.";
        assert_eq!(
            parse_list(text),
            vec![
                "Sure, we can see you Monday.",
                "Please call the front desk.",
                "We'll send a refill."
            ]
        );
    }

    #[test]
    fn falls_back_to_lines_and_caps_count() {
        let text = "a\nb\n\nc\nd\ne\nf\ng";
        assert_eq!(parse_list(text).len(), MAX_SUGGESTIONS);
    }

    #[tokio::test]
    async fn handler_returns_suggestions() {
        let provider = Arc::new(
            MockAIProvider::new().with_response("- Yes, Tuesday works.\n- Could you share more details?"),
        );
        let handler = SuggestResponsesHandler::new(provider);
        let suggestions = handler
            .handle(SuggestResponsesCommand {
                patient_inquiry: "Can I come in Tuesday?".into(),
            })
            .await
            .unwrap();
        assert_eq!(suggestions.len(), 2);
    }
}
