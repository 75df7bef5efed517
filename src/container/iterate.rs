//! Counting loop container.

use super::Condition;
use crate::action::{execute_actions, IntoTestAction, TestAction};
use crate::constants::defaults;
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult};
use crate::impl_action_container;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Loops while the condition holds, checking it before every cycle
///
/// The index variable is written to the context before each condition check,
/// so a condition that is false initially runs zero cycles.
pub struct Iterate {
    name: String,
    index_name: String,
    start: i64,
    step: i64,
    condition: Condition,
    actions: Vec<Arc<dyn TestAction>>,
}

impl Iterate {
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self {
            name: "iterate".to_string(),
            index_name: defaults::INDEX_NAME.to_string(),
            start: defaults::INDEX_START,
            step: defaults::INDEX_STEP,
            condition: condition.into(),
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

    pub fn step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }
}

#[async_trait]
impl TestAction for Iterate {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        if self.step == 0 {
            return Err(ActionFailure::usage("Iterate step must not be zero"));
        }

        let mut index = self.start;
        let mut cycles = 0u64;
        loop {
            context.set_variable(self.index_name.as_str(), index);
            if !self
                .condition
                .evaluate(Some(&self.index_name), index, context)?
            {
                break;
            }

            debug!(container = %self.name, index = index, "🔁 Iterate cycle");
            execute_actions(&self.actions, context).await?;
            cycles += 1;
            index += self.step;
        }

        debug!(container = %self.name, cycles = cycles, "Iterate finished");
        Ok(())
    }
}

impl_action_container!(Iterate);
