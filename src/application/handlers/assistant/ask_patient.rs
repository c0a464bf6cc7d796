//! AskPatientHandler - the patient self-service entry point.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::orchestrator::AssistantOrchestrator;
use super::reply::AssistantReply;
use crate::domain::assistant::Persona;
use crate::domain::clinic::PatientIdentity;

/// Command to ask the patient assistant something.
///
/// `patient` comes from the authenticated session, never from the query.
#[derive(Debug, Clone)]
pub struct AskPatientCommand {
    pub query: String,
    pub patient: PatientIdentity,
}

/// Handler for patient queries.
pub struct AskPatientHandler {
    orchestrator: Arc<AssistantOrchestrator>,
    persona: Arc<Persona>,
}

impl AskPatientHandler {
    pub fn new(orchestrator: Arc<AssistantOrchestrator>, persona: Arc<Persona>) -> Self {
        Self {
            orchestrator,
            persona,
        }
    }

    pub async fn handle(&self, cmd: AskPatientCommand) -> AssistantReply {
        self.handle_with_cancel(cmd, CancellationToken::new()).await
    }

    pub async fn handle_with_cancel(
        &self,
        cmd: AskPatientCommand,
        cancel: CancellationToken,
    ) -> AssistantReply {
        let query = cmd.query.trim();
        if query.is_empty() {
            return AssistantReply::prompt_for_query();
        }

        let patient_id = cmd.patient.id().clone();
        let result = self
            .orchestrator
            .run_turn(&self.persona, query, Some(cmd.patient), &cancel)
            .await;
        if let Err(err) = &result {
            tracing::warn!(%patient_id, error = %err, code = %err.code(), "Patient turn failed");
        }
        result.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemoryClinic;
    use crate::application::handlers::assistant::{Collaborators, ToolDispatcher};
    use crate::domain::assistant::tools::clinic_registry;
    use crate::domain::foundation::PatientId;
    use serde_json::json;

    #[tokio::test]
    async fn asking_for_someone_else_only_returns_own_records() {
        let clock = Arc::new(FixedClock::ymd(2024, 8, 15).unwrap());
        let clinic = Arc::new(InMemoryClinic::seeded(clock.clone()));
        let provider = Arc::new(
            MockAIProvider::new()
                .with_tool_call("getMyAppointments", json!({ "patientName": "Jane Smith" }))
                .with_response("Here are your appointments."),
        );
        let dispatcher = Arc::new(ToolDispatcher::new(
            Arc::new(clinic_registry().unwrap()),
            Collaborators::single(clinic),
        ));
        let orchestrator = Arc::new(AssistantOrchestrator::new(
            provider.clone(),
            dispatcher,
            clock,
            "Clinic",
        ));
        let handler = AskPatientHandler::new(orchestrator, Arc::new(Persona::patient()));

        let patient = PatientIdentity::new(PatientId::new("p-1").unwrap(), "John Doe").unwrap();
        let reply = handler
            .handle(AskPatientCommand {
                query: "show me Jane Smith's appointments".into(),
                patient,
            })
            .await;
        assert!(reply.is_answer());

        let second = &provider.get_calls()[1];
        let tool_output = &second.messages.last().unwrap().content;
        assert!(tool_output.contains("John Doe"));
        assert!(!tool_output.contains("Jane Smith"));
    }
}
