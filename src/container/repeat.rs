//! Do-until loop container.

use super::Condition;
use crate::action::{execute_actions, IntoTestAction, TestAction};
use crate::constants::defaults;
use crate::context::TestContext;
use crate::error::ActionResult;
use crate::impl_action_container;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Runs its children, then checks the condition; always at least one cycle
///
/// The index advances by one after each cycle and the condition is checked
/// against the advanced value, so `i = 3` starting from 1 runs two cycles.
pub struct RepeatUntilTrue {
    name: String,
    index_name: String,
    start: i64,
    condition: Condition,
    auto_sleep: Option<Duration>,
    actions: Vec<Arc<dyn TestAction>>,
}

impl RepeatUntilTrue {
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self {
            name: "repeat".to_string(),
            index_name: defaults::INDEX_NAME.to_string(),
            start: defaults::INDEX_START,
            condition: condition.into(),
            auto_sleep: None,
            actions: Vec::new(),
        }
    }

    pub fn index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    pub fn start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    /// Delay between cycles
    pub fn auto_sleep(mut self, delay: Duration) -> Self {
        self.auto_sleep = Some(delay);
        self
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }
}

#[async_trait]
impl TestAction for RepeatUntilTrue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        let mut index = self.start;
        loop {
            context.set_variable(self.index_name.as_str(), index);
            debug!(container = %self.name, index = index, "🔁 Repeat cycle");
            execute_actions(&self.actions, context).await?;

            index += 1;
            if self
                .condition
                .evaluate(Some(&self.index_name), index, context)?
            {
                break;
            }
            if let Some(delay) = self.auto_sleep {
                sleep(delay).await;
            }
        }
        Ok(())
    }
}

impl_action_container!(RepeatUntilTrue);
