//! Data transfer objects for assistant endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::assistant::tools::ModelTool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantRequest {
    #[serde(default)]
    pub query: String,
}

/// The calling patient, as asserted by the authenticated gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientAssistantRequest {
    #[serde(default)]
    pub query: String,
    pub patient: PatientDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListToolsQuery {
    /// `admin`, `administrator` or `patient`. Defaults to administrator.
    pub persona: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolListResponse {
    pub persona: String,
    pub tools: Vec<ModelTool>,
}
