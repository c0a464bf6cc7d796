//! Assistant handlers - dispatch, orchestration and the persona entry points.

mod ask_administrator;
mod ask_patient;
mod dispatcher;
mod orchestrator;
mod reply;

pub use ask_administrator::{AskAdministratorCommand, AskAdministratorHandler};
pub use ask_patient::{AskPatientCommand, AskPatientHandler};
pub use dispatcher::{Collaborators, DispatchContext, ToolDispatcher};
pub use orchestrator::{AssistantOrchestrator, CompletedTurn, TurnLimits};
pub use reply::AssistantReply;
