//! Container asserting that its children fail.

use super::MessageMatcher;
use crate::action::{execute_actions, IntoTestAction, TestAction};
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult, FailureKind};
use crate::impl_action_container;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Succeeds only if the wrapped actions fail as expected
///
/// The children run as one sequence. Completion without failure is an
/// `AssertionUnmet`, as is a failure of another kind or with a message the
/// matcher rejects. Usage faults propagate unchanged.
pub struct AssertException {
    name: String,
    expected_kind: Option<FailureKind>,
    message: Option<String>,
    actions: Vec<Arc<dyn TestAction>>,
}

impl AssertException {
    /// Expect an execution failure with any message
    pub fn new() -> Self {
        Self {
            name: "assert".to_string(),
            expected_kind: Some(FailureKind::ExecutionFailure),
            message: None,
            actions: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: FailureKind) -> Self {
        self.expected_kind = Some(kind);
        self
    }

    /// Accept a failure of any recoverable kind
    pub fn any_kind(mut self) -> Self {
        self.expected_kind = None;
        self
    }

    /// Expected message; plain text or a `@matcher('arg')@` expression
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }

    fn expected_description(&self) -> String {
        self.expected_kind
            .map_or_else(|| "any".to_string(), |kind| kind.to_string())
    }

    fn verify(&self, failure: &ActionFailure, context: &TestContext) -> ActionResult<()> {
        if let Some(expected) = self.expected_kind {
            if failure.kind != expected {
                return Err(ActionFailure::assertion(format!(
                    "Caught failure of kind '{}' but expected '{expected}': {}",
                    failure.kind, failure.message
                )));
            }
        }

        if let Some(message) = &self.message {
            let expected = context.resolve_dynamic_value(message)?;
            if !MessageMatcher::parse(&expected)?.matches(&failure.message) {
                return Err(ActionFailure::assertion(format!(
                    "Caught failure message '{}' does not match expected '{expected}'",
                    failure.message
                )));
            }
        }
        Ok(())
    }
}

impl Default for AssertException {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestAction for AssertException {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        if self.actions.is_empty() {
            return Err(ActionFailure::usage(
                "Assert exception container has no action to execute",
            ));
        }

        match execute_actions(&self.actions, context).await {
            Ok(()) => Err(ActionFailure::assertion(format!(
                "Missing asserted exception '{}'",
                self.expected_description()
            ))),
            Err(failure) if failure.is_usage_fault() => Err(failure),
            Err(failure) => {
                self.verify(&failure, context)?;
                info!(
                    container = %self.name,
                    kind = %failure.kind,
                    error = %failure.message,
                    "✅ Asserted failure as expected"
                );
                Ok(())
            }
        }
    }
}

impl_action_container!(AssertException);
