//! Test case bookkeeping and result reporting.

use super::hooks::{TestHooks, TestListener};
use super::TestCaseState;
use crate::action::{run_action, IntoTestAction, TestAction};
use crate::constants::events;
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult};
use crate::logging::{log_action_event, log_test_event};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Final verdict of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    Succeeded,
    Failed,
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result reported when a test case finishes
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub outcome: TestOutcome,
    /// First unrecovered body failure, otherwise the first finally failure
    pub cause: Option<ActionFailure>,
    pub finally_failures: Vec<ActionFailure>,
    pub duration: Duration,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.outcome == TestOutcome::Succeeded
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == TestOutcome::Failed
    }
}

/// A named test: ordered body actions, ordered finally actions and the
/// outcome of running them
///
/// Body actions run once each, in order. After the first unrecovered failure
/// the remaining body actions are skipped. Finally actions always run, each
/// exactly once, and their failures are collected rather than aborting the
/// rest of the finally list.
pub struct TestCase {
    name: String,
    variables: Vec<(String, Value)>,
    actions: Vec<Arc<dyn TestAction>>,
    finally_actions: Vec<Arc<dyn TestAction>>,
    hooks: TestHooks,
    listeners: Vec<Arc<dyn TestListener>>,
    state: TestCaseState,
    failure: Option<ActionFailure>,
    finally_failures: Vec<ActionFailure>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    started: Option<Instant>,
    duration: Duration,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            actions: Vec::new(),
            finally_actions: Vec::new(),
            hooks: TestHooks::default(),
            listeners: Vec::new(),
            state: TestCaseState::Created,
            failure: None,
            finally_failures: Vec::new(),
            started_at: None,
            finished_at: None,
            started: None,
            duration: Duration::ZERO,
        }
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }

    pub fn with_finally(mut self, action: impl IntoTestAction) -> Self {
        self.finally_actions.push(action.into_test_action());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.push((name.into(), value.into()));
        self
    }

    pub fn with_hooks(mut self, hooks: TestHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn TestListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TestCaseState {
        self.state
    }

    pub fn actions(&self) -> &[Arc<dyn TestAction>] {
        &self.actions
    }

    pub fn finally_actions(&self) -> &[Arc<dyn TestAction>] {
        &self.finally_actions
    }

    /// First unrecovered body failure
    pub fn failure(&self) -> Option<&ActionFailure> {
        self.failure.as_ref()
    }

    pub fn finally_failures(&self) -> &[ActionFailure] {
        &self.finally_failures
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn add_action(&mut self, action: Arc<dyn TestAction>) {
        self.actions.push(action);
    }

    pub fn add_finally_actions(&mut self, actions: impl IntoIterator<Item = Arc<dyn TestAction>>) {
        self.finally_actions.extend(actions);
    }

    pub fn add_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.push((name.into(), value.into()));
    }

    pub fn add_listener(&mut self, listener: Arc<dyn TestListener>) {
        self.listeners.push(listener);
    }

    pub fn set_hooks(&mut self, hooks: TestHooks) {
        self.hooks = hooks;
    }

    fn transition(&mut self, next: TestCaseState) -> ActionResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(ActionFailure::usage(format!(
                "Test case '{}' cannot move from {} to {next}",
                self.name, self.state
            )));
        }
        debug!(test_name = %self.name, from = %self.state, to = %next, "Test case state transition");
        self.state = next;
        Ok(())
    }

    /// Record an unrecovered failure; only the first one is kept
    pub fn record_failure(&mut self, failure: ActionFailure) {
        if self.failure.is_none() {
            self.failure = Some(failure);
        }
        if self.state == TestCaseState::Running {
            self.state = TestCaseState::Failed;
        }
    }

    /// Define the test variables and run the before-test hooks
    pub async fn start(&mut self, context: &TestContext) -> ActionResult<()> {
        self.transition(TestCaseState::Running)?;
        self.started_at = Some(Utc::now());
        self.started = Some(Instant::now());
        for listener in &self.listeners {
            listener.on_test_start(&self.name);
        }

        if let Err(failure) = context.create_variables(self.variables.iter().cloned()) {
            self.record_failure(failure);
        }
        let before = self.hooks.before_actions().to_vec();
        for action in before {
            self.execute_action(action, context).await?;
        }
        Ok(())
    }

    /// Execute one body action unless an earlier one already failed
    ///
    /// The action's own failure is recorded on the test case, not returned;
    /// the `Err` case is reserved for calling this outside a running test.
    pub async fn execute_action(
        &mut self,
        action: Arc<dyn TestAction>,
        context: &TestContext,
    ) -> ActionResult<()> {
        if !self.state.is_active() {
            return Err(ActionFailure::usage(format!(
                "Test case '{}' is {} and cannot execute '{}'",
                self.name,
                self.state,
                action.name()
            )));
        }

        if self.failure.is_some() {
            log_action_event(
                events::ACTION_SKIPPED,
                action.name(),
                "skipped",
                Some("an earlier action failed"),
            );
            return Ok(());
        }

        if let Err(failure) = run_action(action.as_ref(), context).await {
            self.record_failure(failure);
        }
        Ok(())
    }

    /// Run every finally action and after-test hook once, collecting failures
    pub async fn run_finally(&mut self, context: &TestContext) -> ActionResult<()> {
        if self.state == TestCaseState::Running {
            self.transition(TestCaseState::Succeeded)?;
        }
        self.transition(TestCaseState::Finalizing)?;
        log_test_event(events::TEST_FINALIZING, &self.name, "finalizing", None);

        let deferred: Vec<Arc<dyn TestAction>> = self
            .finally_actions
            .iter()
            .chain(self.hooks.after_actions())
            .cloned()
            .collect();
        if !deferred.is_empty() {
            info!(test_name = %self.name, actions = deferred.len(), "🧹 Running finally actions");
        }

        for action in deferred {
            if let Err(failure) = run_action(action.as_ref(), context).await {
                error!(
                    test_name = %self.name,
                    action = %action.name(),
                    error = %failure,
                    "❌ Finally action failed"
                );
                self.finally_failures.push(failure);
            }
        }
        Ok(())
    }

    /// Run the finally phase if still pending and report the result
    pub async fn finish(&mut self, context: &TestContext) -> ActionResult<TestResult> {
        if self.state != TestCaseState::Finalizing {
            self.run_finally(context).await?;
        }
        self.transition(TestCaseState::Done)?;
        self.finished_at = Some(Utc::now());
        self.duration = self
            .started
            .map(|started| started.elapsed())
            .unwrap_or_default();

        let result = self.result();
        for listener in &self.listeners {
            match &result.cause {
                Some(cause) if result.is_failure() => listener.on_test_failure(&result, cause),
                _ => listener.on_test_success(&result),
            }
            listener.on_test_finish(&result);
        }
        Ok(result)
    }

    /// Batch mode: start, run every body action, then finish
    pub async fn run(&mut self, context: &TestContext) -> ActionResult<TestResult> {
        self.start(context).await?;
        let actions = self.actions.clone();
        for action in actions {
            self.execute_action(action, context).await?;
        }
        self.finish(context).await
    }

    pub fn result(&self) -> TestResult {
        let cause = self
            .failure
            .clone()
            .or_else(|| self.finally_failures.first().cloned());
        TestResult {
            name: self.name.clone(),
            outcome: if cause.is_some() {
                TestOutcome::Failed
            } else {
                TestOutcome::Succeeded
            },
            cause,
            finally_failures: self.finally_failures.clone(),
            duration: self.duration,
        }
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("actions", &self.actions.len())
            .field("finally_actions", &self.finally_actions.len())
            .field("failure", &self.failure)
            .finish()
    }
}
