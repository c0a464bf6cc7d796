//! Tool Registry - the closed set of tools the assistant can call.
//!
//! Names are unique and the registry is built once at startup; after that
//! it is shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::{ModelTool, ToolDefinition};

/// Failures while building or querying the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateToolName(String),

    #[error("no tool named '{0}' is registered")]
    UnknownTool(String),
}

/// Central registry of tool definitions, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition. Names must be unique.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), RegistryError> {
        let name = definition.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateToolName(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, definition);
        Ok(())
    }

    /// Finds a definition by exact name.
    pub fn lookup(&self, name: &str) -> Result<&ToolDefinition, RegistryError> {
        self.tools
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }

    /// Definitions named by a tool set, in the set's order.
    pub fn resolve(&self, tools: &ToolSet) -> Result<Vec<&ToolDefinition>, RegistryError> {
        tools.iter().map(|name| self.lookup(name)).collect()
    }

    /// Model-facing schemas for a tool set.
    pub fn model_tools(
        &self,
        tools: &ToolSet,
        hide_identity: bool,
    ) -> Result<Vec<ModelTool>, RegistryError> {
        Ok(self
            .resolve(tools)?
            .into_iter()
            .map(|definition| definition.model_tool(hide_identity))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// An ordered, duplicate-free set of tool names. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolSet(Arc<Vec<String>>);

impl ToolSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self(Arc::new(unique))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assistant::tools::ToolScope;

    fn tool(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, format!("{} description", name), ToolScope::Public)
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("getAvailableSlots")).unwrap();
        let err = registry.register(tool("getAvailableSlots")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateToolName("getAvailableSlots".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_is_exact() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("getInvoices")).unwrap();
        assert!(registry.lookup("getInvoices").is_ok());
        assert_eq!(
            registry.lookup("getinvoices").unwrap_err(),
            RegistryError::UnknownTool("getinvoices".into())
        );
    }

    #[test]
    fn definitions_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(tool(name)).unwrap();
        }
        let names: Vec<&str> = registry.definitions().map(|d| d.name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn model_tools_fail_on_unregistered_name() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("a")).unwrap();
        let set = ToolSet::new(["a", "missing"]);
        assert_eq!(
            registry.model_tools(&set, false).unwrap_err(),
            RegistryError::UnknownTool("missing".into())
        );
    }

    #[test]
    fn tool_set_deduplicates_preserving_order() {
        let set = ToolSet::new(["b", "a", "b"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
    }
}
