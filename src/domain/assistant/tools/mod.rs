//! Tool schemas - what the model may call and how its arguments are checked.
//!
//! ## Key Types
//!
//! - [`ToolDefinition`] - name, description, scope, ordered parameters
//! - [`ToolRegistry`] - unique-name catalog built at startup
//! - [`ToolSet`] - the subset of tool names a persona may use
//! - [`ToolCallRequest`] / [`ToolCallResult`] - one call and its outcome

pub mod definitions;
mod parameter;
mod tool_call;
mod tool_definition;
mod tool_registry;

pub use definitions::{clinic_registry, ToolName};
pub use parameter::{FieldViolation, ParameterKind, ParameterSpec, SchemaViolation};
pub use tool_call::{ToolCallRequest, ToolCallResult};
pub use tool_definition::{ModelTool, ToolDefinition, ToolScope};
pub use tool_registry::{RegistryError, ToolRegistry, ToolSet};
