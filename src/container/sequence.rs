//! Plain ordered container.

use crate::action::{execute_actions, IntoTestAction, TestAction};
use crate::context::TestContext;
use crate::error::ActionResult;
use crate::impl_action_container;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs its children in order; the first failure aborts the rest
pub struct Sequence {
    name: String,
    actions: Vec<Arc<dyn TestAction>>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::named("sequential")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestAction for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        execute_actions(&self.actions, context).await
    }
}

impl_action_container!(Sequence);
