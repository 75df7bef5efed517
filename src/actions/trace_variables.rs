use crate::action::TestAction;
use crate::context::TestContext;
use crate::error::ActionResult;
use async_trait::async_trait;
use tracing::info;

/// Logs the current value of all or selected variables
#[derive(Debug, Clone, Default)]
pub struct TraceVariablesAction {
    names: Vec<String>,
}

impl TraceVariablesAction {
    /// Trace every variable
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }
}

#[async_trait]
impl TestAction for TraceVariablesAction {
    fn name(&self) -> &str {
        "trace-variables"
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        let names = if self.names.is_empty() {
            context.variable_names()
        } else {
            self.names.clone()
        };

        for name in names {
            let value = context.get_variable(&name)?;
            info!(variable = %name, value = %value, "🔍 Variable");
        }
        Ok(())
    }
}
