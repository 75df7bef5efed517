//! # Test Actions
//!
//! The capability every unit of test behaviour implements, and the container
//! seam for actions that own and drive children.
//!
//! ## Architecture
//!
//! ```text
//! TestAction ───────────────┬── leaf actions (echo, sleep, fail, ...)
//!   execute(&TestContext)   │
//!                           └── ActionContainer
//!                                 add_action / actions / into_action
//!                                 Sequence, Iterate, Parallel, Catch, ...
//! ```
//!
//! Failures are values: `execute` returns an [`ActionResult`] and containers
//! pattern-match on the failure kind instead of unwinding.

use crate::constants::events;
use crate::context::TestContext;
use crate::error::ActionResult;
use crate::logging::log_action_event;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// A unit of test behaviour executed against the shared context
#[async_trait]
pub trait TestAction: Send + Sync {
    /// Name used in logs and failure reports
    fn name(&self) -> &str;

    /// Optional human-readable description
    fn description(&self) -> Option<&str> {
        None
    }

    /// Execute against the shared test context
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The action completed as expected
    /// * `Err(ActionFailure)` - Classified failure, inspected by enclosing containers
    async fn execute(&self, context: &TestContext) -> ActionResult<()>;
}

/// An action that owns an ordered list of children
///
/// The child list is append-only while the test is being built and is only
/// read once execution starts.
pub trait ActionContainer: TestAction {
    fn add_action(&mut self, action: Arc<dyn TestAction>);

    fn actions(&self) -> &[Arc<dyn TestAction>];

    fn action_count(&self) -> usize {
        self.actions().len()
    }

    /// Finally blocks hand their children to the test case instead of running inline
    fn is_finally_block(&self) -> bool {
        false
    }

    fn take_actions(&mut self) -> Vec<Arc<dyn TestAction>>;

    /// Freeze the container into a shareable action
    fn into_action(self: Box<Self>) -> Arc<dyn TestAction>;
}

/// Conversion accepted by builders wherever an action is attached
pub trait IntoTestAction {
    fn into_test_action(self) -> Arc<dyn TestAction>;
}

impl<A: TestAction + 'static> IntoTestAction for A {
    fn into_test_action(self) -> Arc<dyn TestAction> {
        Arc::new(self)
    }
}

impl IntoTestAction for Arc<dyn TestAction> {
    fn into_test_action(self) -> Arc<dyn TestAction> {
        self
    }
}

/// Execute one action with lifecycle logging, tagging failures with its name
pub async fn run_action(action: &dyn TestAction, context: &TestContext) -> ActionResult<()> {
    log_action_event(events::ACTION_STARTED, action.name(), "running", action.description());

    match action.execute(context).await {
        Ok(()) => {
            log_action_event(events::ACTION_COMPLETED, action.name(), "success", None);
            Ok(())
        }
        Err(failure) => {
            log_action_event(events::ACTION_FAILED, action.name(), "failed", Some(&failure.message));
            warn!(
                action = %action.name(),
                kind = %failure.kind,
                error = %failure.message,
                "❌ Action failed"
            );
            Err(failure.in_action(action.name()))
        }
    }
}

/// Execute actions in order, stopping at the first failure
pub async fn execute_actions(
    actions: &[Arc<dyn TestAction>],
    context: &TestContext,
) -> ActionResult<()> {
    for action in actions {
        run_action(action.as_ref(), context).await?;
    }
    Ok(())
}

/// Implements the child bookkeeping of [`ActionContainer`] for a struct with
/// an `actions: Vec<Arc<dyn TestAction>>` field.
#[macro_export]
macro_rules! impl_action_container {
    ($container:ty) => {
        impl $crate::action::ActionContainer for $container {
            fn add_action(&mut self, action: ::std::sync::Arc<dyn $crate::action::TestAction>) {
                self.actions.push(action);
            }

            fn actions(&self) -> &[::std::sync::Arc<dyn $crate::action::TestAction>] {
                &self.actions
            }

            fn take_actions(&mut self) -> Vec<::std::sync::Arc<dyn $crate::action::TestAction>> {
                ::std::mem::take(&mut self.actions)
            }

            fn into_action(
                self: Box<Self>,
            ) -> ::std::sync::Arc<dyn $crate::action::TestAction> {
                ::std::sync::Arc::new(*self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ActionFailure, FailureKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        name: String,
        runs: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl TestAction for Counting {
        fn name(&self) -> &str {
            &self.name
        }

        async fn execute(&self, _context: &TestContext) -> ActionResult<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ActionFailure::execution("counting failed"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_execute_actions_stops_at_first_failure() {
        let runs = Arc::new(AtomicUsize::new(0));
        let make = |name: &str, fail: bool| -> Arc<dyn TestAction> {
            Arc::new(Counting {
                name: name.to_string(),
                runs: Arc::clone(&runs),
                fail,
            })
        };
        let actions = vec![make("a", false), make("b", true), make("c", false)];

        let failure = execute_actions(&actions, &TestContext::new())
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::ExecutionFailure);
        assert_eq!(failure.action.as_deref(), Some("b"));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
