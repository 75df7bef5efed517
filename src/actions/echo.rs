use crate::action::TestAction;
use crate::context::TestContext;
use crate::error::ActionResult;
use async_trait::async_trait;
use tracing::info;

/// Logs a message after resolving variables and functions in it
#[derive(Debug, Clone)]
pub struct EchoAction {
    message: String,
}

impl EchoAction {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl TestAction for EchoAction {
    fn name(&self) -> &str {
        "echo"
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        let message = context.resolve_dynamic_value(&self.message)?;
        info!(message = %message, "📣 {message}");
        Ok(())
    }
}
