//! Deferred cleanup container.

use crate::action::{execute_actions, ActionContainer, IntoTestAction, TestAction};
use crate::context::TestContext;
use crate::error::ActionResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Holds actions that run after the test body, whatever its outcome
///
/// Closing this container hands its children to the test case's finally
/// list; it is never executed in place.
pub struct FinallySequence {
    name: String,
    actions: Vec<Arc<dyn TestAction>>,
}

impl FinallySequence {
    pub fn new() -> Self {
        Self {
            name: "finally".to_string(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }
}

impl Default for FinallySequence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestAction for FinallySequence {
    fn name(&self) -> &str {
        &self.name
    }

    /// Only reached when attached somewhere other than through a runner
    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        warn!(container = %self.name, "Finally block executed inline");
        execute_actions(&self.actions, context).await
    }
}

impl ActionContainer for FinallySequence {
    fn add_action(&mut self, action: Arc<dyn TestAction>) {
        self.actions.push(action);
    }

    fn actions(&self) -> &[Arc<dyn TestAction>] {
        &self.actions
    }

    fn is_finally_block(&self) -> bool {
        true
    }

    fn take_actions(&mut self) -> Vec<Arc<dyn TestAction>> {
        std::mem::take(&mut self.actions)
    }

    fn into_action(self: Box<Self>) -> Arc<dyn TestAction> {
        Arc::new(*self)
    }
}
