//! Applies a registered template.

use crate::action::{execute_actions, TestAction};
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult};
use crate::template::TemplateRegistry;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Runs the actions of a named template on the shared context
///
/// The template is looked up when the action executes, so templates may be
/// registered after the test was built. Template defaults are written
/// first, then the parameters given here, in order.
pub struct TemplateApply {
    name: String,
    template_name: String,
    parameters: Vec<(String, Value)>,
    registry: TemplateRegistry,
}

impl TemplateApply {
    pub fn new(template_name: impl Into<String>, registry: TemplateRegistry) -> Self {
        let template_name = template_name.into();
        Self {
            name: format!("template:{template_name}"),
            template_name,
            parameters: Vec::new(),
            registry,
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }
}

#[async_trait]
impl TestAction for TemplateApply {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        let template = self.registry.get(&self.template_name).ok_or_else(|| {
            ActionFailure::usage(format!("Unknown template '{}'", self.template_name))
        })?;

        debug!(
            template = %self.template_name,
            parameters = self.parameters.len(),
            actions = template.actions().len(),
            "📋 Applying template"
        );
        context.create_variables(template.parameters().iter().cloned())?;
        context.create_variables(self.parameters.iter().cloned())?;
        execute_actions(template.actions(), context).await
    }
}
