//! Final-answer check.
//!
//! Catches answers that would leak tool plumbing to the user: raw JSON,
//! code fences, tool-call markup or execution traces.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static TOOL_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)("(tool_calls|tool_use|function_call|arguments|input_schema)"\s*:)|</?tool_(call|use|result)>"#)
        .expect("tool markup pattern compiles")
});

static EXECUTION_TRACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*(running|calling|executing|invoking)\s+(tool|function)")
        .expect("execution trace pattern compiles")
});

/// Why an answer cannot be shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HygieneViolation {
    Empty,
    CodeFence,
    RawJson,
    ToolMarkup,
    ExecutionTrace,
}

impl HygieneViolation {
    /// Instruction sent back to the model when it is asked to try again.
    pub fn correction(&self) -> &'static str {
        match self {
            HygieneViolation::Empty => {
                "Your reply was empty. Answer the user's request in plain sentences."
            }
            HygieneViolation::CodeFence | HygieneViolation::RawJson => {
                "Rewrite your reply as friendly plain sentences. Do not include JSON or code blocks."
            }
            HygieneViolation::ToolMarkup | HygieneViolation::ExecutionTrace => {
                "Rewrite your reply without any mention of tool calls or how you got the information."
            }
        }
    }
}

impl fmt::Display for HygieneViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HygieneViolation::Empty => "empty answer",
            HygieneViolation::CodeFence => "code fence",
            HygieneViolation::RawJson => "raw JSON",
            HygieneViolation::ToolMarkup => "tool-call markup",
            HygieneViolation::ExecutionTrace => "execution trace",
        };
        f.write_str(label)
    }
}

/// Returns the first problem found in a candidate final answer.
pub fn inspect_final_answer(text: &str) -> Result<(), HygieneViolation> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(HygieneViolation::Empty);
    }
    if trimmed.contains("```") {
        return Err(HygieneViolation::CodeFence);
    }
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Err(HygieneViolation::RawJson);
    }
    if TOOL_MARKUP.is_match(trimmed) {
        return Err(HygieneViolation::ToolMarkup);
    }
    if EXECUTION_TRACE.is_match(trimmed) {
        return Err(HygieneViolation::ExecutionTrace);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_answers_pass() {
        for answer in [
            "The available slots are 9:00 AM and 10:00 AM.",
            "Here are the appointments for today: - 10:00 AM: John Doe (Check-up) - 11:30 AM: Jane Smith (Consultation)",
            "Your total outstanding balance is $120 [2 invoices].",
        ] {
            assert_eq!(inspect_final_answer(answer), Ok(()), "{}", answer);
        }
    }

    #[test]
    fn raw_payloads_are_caught() {
        assert_eq!(inspect_final_answer("[\"09:00\", \"10:00\"]"), Err(HygieneViolation::RawJson));
        assert_eq!(
            inspect_final_answer("{\"success\": true, \"message\": \"booked\"}"),
            Err(HygieneViolation::RawJson)
        );
        assert_eq!(
            inspect_final_answer("Sure!\n```json\n{}\n```"),
            Err(HygieneViolation::CodeFence)
        );
    }

    #[test]
    fn tool_plumbing_is_caught() {
        assert_eq!(
            inspect_final_answer("Calling {\"name\": \"bookAppointment\", \"arguments\": {}}"),
            Err(HygieneViolation::ToolMarkup)
        );
        assert_eq!(
            inspect_final_answer("[Running tool getAvailableSlots...] The slots are 9 AM."),
            Err(HygieneViolation::ExecutionTrace)
        );
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(inspect_final_answer("  \n "), Err(HygieneViolation::Empty));
    }
}
