//! PersonalizeReminderHandler - appointment reminders worded for SMS or email.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{complete_once, require, FlowError};
use crate::ports::AIProvider;

const SYSTEM_PROMPT: &str = "You write personalized appointment reminder messages for patients. \
The message must state the appointment details clearly and invite the patient to confirm or \
reschedule. Keep the tone professional and friendly. Reply with the message only.";

/// How the reminder will be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderChannel {
    #[serde(rename = "SMS")]
    Sms,
    Email,
}

impl ReminderChannel {
    fn style(&self) -> &'static str {
        match self {
            ReminderChannel::Sms => {
                "This is an SMS: keep it to one or two short sentences with no greeting line."
            }
            ReminderChannel::Email => {
                "This is an email: open with a friendly greeting, give the full details and close \
                 with a thank-you from the clinic."
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersonalizeReminderCommand {
    pub patient_name: String,
    pub appointment_date_time: String,
    pub channel: ReminderChannel,
    pub clinic_name: String,
    pub doctor_name: String,
    pub appointment_type: String,
}

pub struct PersonalizeReminderHandler {
    provider: Arc<dyn AIProvider>,
}

impl PersonalizeReminderHandler {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(&self, cmd: PersonalizeReminderCommand) -> Result<String, FlowError> {
        require("patientName", &cmd.patient_name)?;
        require("appointmentDateTime", &cmd.appointment_date_time)?;
        require("clinicName", &cmd.clinic_name)?;
        require("doctorName", &cmd.doctor_name)?;
        require("appointmentType", &cmd.appointment_type)?;

        let prompt = format!(
            "Patient Name: {}\nAppointment Date and Time: {}\nClinic Name: {}\nDoctor Name: {}\n\
             Appointment Type: {}\n\n{}",
            cmd.patient_name.trim(),
            cmd.appointment_date_time.trim(),
            cmd.clinic_name.trim(),
            cmd.doctor_name.trim(),
            cmd.appointment_type.trim(),
            cmd.channel.style(),
        );
        let max_tokens = match cmd.channel {
            ReminderChannel::Sms => 160,
            ReminderChannel::Email => 512,
        };
        complete_once(self.provider.as_ref(), "flow.reminder", SYSTEM_PROMPT, prompt, max_tokens).await
    }
}
