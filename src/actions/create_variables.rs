use crate::action::TestAction;
use crate::context::TestContext;
use crate::error::ActionResult;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Defines context variables in declaration order
///
/// String values are resolved when the action runs, so later definitions
/// may reference earlier ones.
#[derive(Debug, Clone, Default)]
pub struct CreateVariablesAction {
    variables: Vec<(String, Value)>,
}

impl CreateVariablesAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.push((name.into(), value.into()));
        self
    }
}

#[async_trait]
impl TestAction for CreateVariablesAction {
    fn name(&self) -> &str {
        "create-variables"
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        context.create_variables(self.variables.iter().cloned())?;
        debug!(
            count = self.variables.len(),
            names = ?self.variables.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            "Created variables"
        );
        Ok(())
    }
}
