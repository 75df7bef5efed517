//! Guarded container.

use super::Condition;
use crate::action::{execute_actions, IntoTestAction, TestAction};
use crate::constants::events;
use crate::context::TestContext;
use crate::error::ActionResult;
use crate::impl_action_container;
use crate::logging::log_action_event;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs its children as a sequence only when the condition holds
pub struct Conditional {
    name: String,
    condition: Condition,
    actions: Vec<Arc<dyn TestAction>>,
}

impl Conditional {
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self {
            name: "conditional".to_string(),
            condition: condition.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }
}

#[async_trait]
impl TestAction for Conditional {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        if self.condition.evaluate(None, 0, context)? {
            execute_actions(&self.actions, context).await
        } else {
            log_action_event(
                events::ACTION_SKIPPED,
                &self.name,
                "skipped",
                Some("condition evaluated to false"),
            );
            Ok(())
        }
    }
}

impl_action_container!(Conditional);
