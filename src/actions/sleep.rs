use crate::action::TestAction;
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Suspends the current flow for a fixed or variable-driven duration
#[derive(Debug, Clone)]
pub struct SleepAction {
    millis: String,
}

impl SleepAction {
    pub fn new(duration: Duration) -> Self {
        Self {
            millis: duration.as_millis().to_string(),
        }
    }

    /// Duration in milliseconds given as an expression such as `${delay}`
    pub fn from_expression(millis: impl Into<String>) -> Self {
        Self {
            millis: millis.into(),
        }
    }
}

#[async_trait]
impl TestAction for SleepAction {
    fn name(&self) -> &str {
        "sleep"
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        let resolved = context.resolve_dynamic_value(&self.millis)?;
        let millis: u64 = resolved.trim().parse().map_err(|_| {
            ActionFailure::usage(format!("Invalid sleep duration '{resolved}' (expected milliseconds)"))
        })?;

        debug!(duration_ms = millis, "💤 Sleeping");
        sleep(Duration::from_millis(millis)).await;
        Ok(())
    }
}
