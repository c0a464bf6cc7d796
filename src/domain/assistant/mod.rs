//! Assistant domain - tools, personas and the shape of a turn.
//!
//! - `tools` - tool schemas, the registry and call/result values
//! - `persona` - administrator and patient configurations
//! - `turn` - the per-request conversation record and its phase machine
//! - `hygiene` - checks a final answer before it reaches the user

pub mod errors;
pub mod hygiene;
pub mod persona;
pub mod tools;
pub mod turn;

pub use errors::{AssistantError, DispatchError, PersonaError};
pub use hygiene::{inspect_final_answer, HygieneViolation};
pub use persona::{Persona, PersonaKind, PromptContext};
pub use turn::{ConversationTurn, ToolExchange, TurnPhase};
