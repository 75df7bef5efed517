//! # Templates
//!
//! Named, reusable action groups with default parameters, applied by
//! [`TemplateApply`](crate::container::TemplateApply).

use crate::action::{IntoTestAction, TestAction};
use dashmap::DashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered actions plus default parameter values
#[derive(Clone)]
pub struct Template {
    name: String,
    actions: Vec<Arc<dyn TestAction>>,
    parameters: Vec<(String, Value)>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }

    /// Default value, overridden by parameters given when the template is applied
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[Arc<dyn TestAction>] {
        &self.actions
    }

    pub fn parameters(&self) -> &[(String, Value)] {
        &self.parameters
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("actions", &self.actions.len())
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Shared template lookup; clones see the same registrations
#[derive(Clone, Default)]
pub struct TemplateRegistry {
    templates: Arc<DashMap<String, Arc<Template>>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, returning the one it replaced
    pub fn register(&self, template: Template) -> Option<Arc<Template>> {
        let name = template.name().to_string();
        let previous = self.templates.insert(name.clone(), Arc::new(template));
        if previous.is_some() {
            warn!(template = %name, "Template registration replaced an existing template");
        } else {
            debug!(template = %name, "📋 Template registered");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.templates.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::EchoAction;

    #[test]
    fn test_register_and_lookup() {
        let registry = TemplateRegistry::new();
        let shared = registry.clone();
        assert!(registry
            .register(Template::new("greet").with_action(EchoAction::new("hi")))
            .is_none());

        assert!(shared.contains("greet"));
        assert_eq!(shared.get("greet").unwrap().actions().len(), 1);
        assert!(shared.get("other").is_none());

        let replaced = registry.register(Template::new("greet"));
        assert_eq!(replaced.unwrap().actions().len(), 1);
        assert_eq!(registry.names(), vec!["greet".to_string()]);
    }
}
