//! Application handlers.
//!
//! - `assistant` - tool dispatch, turn orchestration, persona entry points
//! - `flows` - single-shot prompt flows (summaries, reminders, suggestions)

pub mod assistant;
pub mod flows;

pub use assistant::{
    AskAdministratorCommand, AskAdministratorHandler, AskPatientCommand, AskPatientHandler,
    AssistantOrchestrator, AssistantReply, Collaborators, CompletedTurn, DispatchContext,
    ToolDispatcher, TurnLimits,
};
pub use flows::{
    FlowError, PersonalizeReminderCommand, PersonalizeReminderHandler, ReminderChannel,
    SuggestResponsesCommand, SuggestResponsesHandler, SummarizeAppointmentCommand,
    SummarizeAppointmentHandler,
};
