//! AskAdministratorHandler - the administrator's assistant entry point.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::orchestrator::AssistantOrchestrator;
use super::reply::AssistantReply;
use crate::domain::assistant::Persona;

/// Command to ask the administrator assistant something.
#[derive(Debug, Clone)]
pub struct AskAdministratorCommand {
    pub query: String,
}

/// Handler for administrator queries.
///
/// Asking twice may book twice. Callers must not retry blindly.
pub struct AskAdministratorHandler {
    orchestrator: Arc<AssistantOrchestrator>,
    persona: Arc<Persona>,
}

impl AskAdministratorHandler {
    pub fn new(orchestrator: Arc<AssistantOrchestrator>, persona: Arc<Persona>) -> Self {
        Self {
            orchestrator,
            persona,
        }
    }

    pub async fn handle(&self, cmd: AskAdministratorCommand) -> AssistantReply {
        self.handle_with_cancel(cmd, CancellationToken::new()).await
    }

    pub async fn handle_with_cancel(
        &self,
        cmd: AskAdministratorCommand,
        cancel: CancellationToken,
    ) -> AssistantReply {
        let query = cmd.query.trim();
        if query.is_empty() {
            return AssistantReply::prompt_for_query();
        }

        let result = self
            .orchestrator
            .run_turn(&self.persona, query, None, &cancel)
            .await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, code = %err.code(), "Administrator turn failed");
        }
        result.into()
    }
}
