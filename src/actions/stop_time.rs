use crate::action::TestAction;
use crate::context::TestContext;
use crate::error::ActionResult;
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

/// Default time line used when no id is given
pub const DEFAULT_TIMELINE_ID: &str = "TESTFLOW_TIMELINE";

/// Measures elapsed time along a named time line
///
/// The first run for an id stores the start timestamp in the variable
/// `<id>`. Later runs log the time since then and store it in
/// `<id>_elapsed_ms`.
#[derive(Debug, Clone)]
pub struct StopTimeAction {
    id: String,
    suffix: Option<String>,
}

impl StopTimeAction {
    pub fn new() -> Self {
        Self::with_id(DEFAULT_TIMELINE_ID)
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            suffix: None,
        }
    }

    /// Label added to the log line
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn elapsed_variable(&self) -> String {
        format!("{}_elapsed_ms", self.id)
    }
}

impl Default for StopTimeAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestAction for StopTimeAction {
    fn name(&self) -> &str {
        "stop-time"
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        let now = Utc::now().timestamp_millis();
        let suffix = self.suffix.as_deref().unwrap_or("");

        if context.has_variable(&self.id) {
            let started: i64 = context.get_variable_as(&self.id)?;
            let elapsed = now - started;
            context.set_variable(self.elapsed_variable(), elapsed);
            info!(timeline = %self.id, elapsed_ms = elapsed, "⏱️ TimeWatcher {} after {elapsed} ms {suffix}", self.id);
        } else {
            context.set_variable(self.id.as_str(), now);
            info!(timeline = %self.id, "⏱️ Starting TimeWatcher: {} {suffix}", self.id);
        }
        Ok(())
    }
}
