//! HTTP handlers for prompt flow endpoints.

use std::sync::Arc;

use axum::extract::{Json, State};

use super::dto::{
    ReminderRequest, ReminderResponse, SuggestionsRequest, SuggestionsResponse, SummarizeRequest,
    SummarizeResponse,
};
use crate::adapters::http::error::ApiError;
use crate::application::handlers::{
    PersonalizeReminderCommand, PersonalizeReminderHandler, SuggestResponsesCommand,
    SuggestResponsesHandler, SummarizeAppointmentCommand, SummarizeAppointmentHandler,
};

#[derive(Clone)]
pub struct FlowsAppState {
    pub summarize: Arc<SummarizeAppointmentHandler>,
    pub reminder: Arc<PersonalizeReminderHandler>,
    pub suggestions: Arc<SuggestResponsesHandler>,
}

/// POST /api/flows/summarize
pub async fn summarize(
    State(state): State<FlowsAppState>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let summary = state
        .summarize
        .handle(SummarizeAppointmentCommand {
            appointment_details: request.appointment_details,
        })
        .await?;
    Ok(Json(SummarizeResponse { summary }))
}

/// POST /api/flows/reminder
pub async fn reminder(
    State(state): State<FlowsAppState>,
    Json(request): Json<ReminderRequest>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let personalized_message = state
        .reminder
        .handle(PersonalizeReminderCommand {
            patient_name: request.patient_name,
            appointment_date_time: request.appointment_date_time,
            channel: request.preferred_communication_method,
            clinic_name: request.clinic_name,
            doctor_name: request.doctor_name,
            appointment_type: request.appointment_type,
        })
        .await?;
    Ok(Json(ReminderResponse {
        personalized_message,
    }))
}

/// POST /api/flows/suggestions
pub async fn suggestions(
    State(state): State<FlowsAppState>,
    Json(request): Json<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let suggested_responses = state
        .suggestions
        .handle(SuggestResponsesCommand {
            patient_inquiry: request.patient_inquiry,
        })
        .await?;
    Ok(Json(SuggestionsResponse {
        suggested_responses,
    }))
}
