//! SummarizeAppointmentHandler - condenses intake notes for clinicians.

use std::sync::Arc;

use super::{complete_once, require, FlowError};
use crate::ports::AIProvider;

const SYSTEM_PROMPT: &str = "You are an AI assistant for medical professionals. You summarize \
patient appointment details so doctors and clinic staff can review the key information before \
the appointment. Be concise and accurate. Focus on symptoms, medical history and anything else \
relevant. Do not invent details that are not in the notes.";

#[derive(Debug, Clone)]
pub struct SummarizeAppointmentCommand {
    pub appointment_details: String,
}

pub struct SummarizeAppointmentHandler {
    provider: Arc<dyn AIProvider>,
}

impl SummarizeAppointmentHandler {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(&self, cmd: SummarizeAppointmentCommand) -> Result<String, FlowError> {
        require("appointmentDetails", &cmd.appointment_details)?;
        let prompt = format!("Appointment Details:\n{}", cmd.appointment_details.trim());
        complete_once(self.provider.as_ref(), "flow.summarize", SYSTEM_PROMPT, prompt, 512).await
    }
}
