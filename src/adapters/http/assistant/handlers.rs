//! HTTP handlers for assistant endpoints.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use tokio_util::sync::CancellationToken;

use super::dto::{
    AssistantRequest, AssistantResponse, ListToolsQuery, PatientAssistantRequest,
    ToolListResponse,
};
use crate::adapters::http::error::{ApiError, ErrorResponse};
use crate::application::handlers::{
    AskAdministratorCommand, AskAdministratorHandler, AskPatientCommand, AskPatientHandler,
};
use crate::domain::assistant::tools::ToolRegistry;
use crate::domain::assistant::{Persona, PersonaKind};
use crate::domain::clinic::PatientIdentity;
use crate::domain::foundation::{ErrorCode, PatientId, ValidationError};

/// Shared state for assistant endpoints.
#[derive(Clone)]
pub struct AssistantAppState {
    pub administrator: Arc<AskAdministratorHandler>,
    pub patient: Arc<AskPatientHandler>,
    pub registry: Arc<ToolRegistry>,
    pub administrator_persona: Arc<Persona>,
    pub patient_persona: Arc<Persona>,
}

fn require_query(query: &str) -> Result<String, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ValidationError::empty_field("query").into());
    }
    Ok(query.to_string())
}

/// Cancels the turn if the client goes away and axum drops this future.
fn request_scoped_cancel() -> (CancellationToken, tokio_util::sync::DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

/// POST /api/assistant
pub async fn ask_assistant(
    State(state): State<AssistantAppState>,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>, ApiError> {
    let query = require_query(&request.query)?;
    let (cancel, _guard) = request_scoped_cancel();

    let reply = state
        .administrator
        .handle_with_cancel(AskAdministratorCommand { query }, cancel)
        .await;

    Ok(Json(AssistantResponse {
        response: reply.response,
    }))
}

/// POST /api/patient/assistant
pub async fn ask_patient_assistant(
    State(state): State<AssistantAppState>,
    Json(request): Json<PatientAssistantRequest>,
) -> Result<Json<AssistantResponse>, ApiError> {
    let query = require_query(&request.query)?;
    let id = PatientId::new(request.patient.id)
        .map_err(|_| ValidationError::empty_field("patient.id"))?;
    let patient = PatientIdentity::new(id, request.patient.name)?;
    let (cancel, _guard) = request_scoped_cancel();

    let reply = state
        .patient
        .handle_with_cancel(AskPatientCommand { query, patient }, cancel)
        .await;

    Ok(Json(AssistantResponse {
        response: reply.response,
    }))
}

/// GET /api/assistant/tools
pub async fn list_tools(
    State(state): State<AssistantAppState>,
    Query(query): Query<ListToolsQuery>,
) -> Result<Json<ToolListResponse>, ApiError> {
    let kind = match query.persona.as_deref() {
        None => PersonaKind::Administrator,
        Some(raw) => raw.parse::<PersonaKind>().map_err(|_| {
            ApiError::BadRequest(ErrorResponse::new(
                ErrorCode::UnknownPersona,
                format!("Unknown persona '{}'", raw),
            ))
        })?,
    };
    let persona = match kind {
        PersonaKind::Administrator => &state.administrator_persona,
        PersonaKind::Patient => &state.patient_persona,
    };

    let tools = state
        .registry
        .model_tools(persona.tools(), persona.binds_identity())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(ToolListResponse {
        persona: kind.to_string(),
        tools,
    }))
}
