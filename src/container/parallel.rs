//! Concurrent fan-out container.

use crate::action::{run_action, IntoTestAction, TestAction};
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult};
use crate::impl_action_container;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error};

/// Starts every direct child on its own tokio task and waits for all of them
///
/// Siblings are never cancelled. Branches share the test context, so they
/// must not depend on each other's variable writes. Every failure is logged;
/// the container then fails with an aggregate whose representative is the
/// first failure in declaration order.
pub struct Parallel {
    name: String,
    actions: Vec<Arc<dyn TestAction>>,
}

impl Parallel {
    pub fn new() -> Self {
        Self {
            name: "parallel".to_string(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }
}

impl Default for Parallel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestAction for Parallel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        debug!(container = %self.name, branches = self.actions.len(), "🚀 Starting parallel branches");

        let handles = self.actions.iter().map(|action| {
            let action = Arc::clone(action);
            let context = context.clone();
            tokio::spawn(async move { run_action(action.as_ref(), &context).await })
        });
        let outcomes = join_all(handles).await;

        let mut failures = Vec::new();
        for (action, outcome) in self.actions.iter().zip(outcomes) {
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(failure)) => failure,
                Err(join_error) => ActionFailure::execution(format!(
                    "Parallel branch '{}' did not complete: {join_error}",
                    action.name()
                ))
                .in_action(action.name()),
            };
            error!(
                container = %self.name,
                branch = %action.name(),
                error = %failure,
                "❌ Parallel branch failed"
            );
            failures.push(failure);
        }

        if failures.is_empty() {
            return Ok(());
        }
        if let Some(position) = failures.iter().position(ActionFailure::is_usage_fault) {
            return Err(failures.swap_remove(position));
        }
        Err(ActionFailure::aggregate(failures))
    }
}

impl_action_container!(Parallel);
