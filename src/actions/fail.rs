use crate::action::TestAction;
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult};
use async_trait::async_trait;

/// Always fails with an execution failure carrying the resolved message
#[derive(Debug, Clone)]
pub struct FailAction {
    message: String,
}

impl FailAction {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailAction {
    fn default() -> Self {
        Self::new("Generated error to interrupt test execution")
    }
}

#[async_trait]
impl TestAction for FailAction {
    fn name(&self) -> &str {
        "fail"
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        let message = context.resolve_dynamic_value(&self.message)?;
        Err(ActionFailure::execution(message))
    }
}
