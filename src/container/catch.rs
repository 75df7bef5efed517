//! Failure-suppressing container.

use crate::action::{run_action, IntoTestAction, TestAction};
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult, FailureKind};
use crate::impl_action_container;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Runs children in order and suppresses matching failures
///
/// A child failing with a matching kind is logged and the remaining
/// children still run. Usage faults always propagate.
pub struct Catch {
    name: String,
    expected: Option<FailureKind>,
    actions: Vec<Arc<dyn TestAction>>,
}

impl Catch {
    /// Catch every recoverable failure
    pub fn new() -> Self {
        Self {
            name: "catch".to_string(),
            expected: None,
            actions: Vec::new(),
        }
    }

    /// Catch only failures of the given kind
    pub fn kind(mut self, kind: FailureKind) -> Self {
        self.expected = Some(kind);
        self
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }

    fn catches(&self, failure: &ActionFailure) -> bool {
        failure.kind.is_recoverable() && self.expected.map_or(true, |kind| kind == failure.kind)
    }
}

impl Default for Catch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestAction for Catch {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        for action in &self.actions {
            match run_action(action.as_ref(), context).await {
                Ok(()) => {}
                Err(failure) if self.catches(&failure) => {
                    info!(
                        container = %self.name,
                        action = %action.name(),
                        error = %failure,
                        "🛡️ Caught failure"
                    );
                }
                Err(failure) => return Err(failure),
            }
        }
        Ok(())
    }
}

impl_action_container!(Catch);
