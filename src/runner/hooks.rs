//! Before/after test hooks and lifecycle listeners.

use super::TestResult;
use crate::action::{IntoTestAction, TestAction};
use crate::constants::events;
use crate::error::ActionFailure;
use crate::logging::log_test_event;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Action sequences run around every test body
///
/// Before-test actions run at start, ahead of the body. After-test actions
/// run at finish, after the finally actions.
#[derive(Clone, Default)]
pub struct TestHooks {
    before_test: Vec<Arc<dyn TestAction>>,
    after_test: Vec<Arc<dyn TestAction>>,
}

impl TestHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_test(mut self, action: impl IntoTestAction) -> Self {
        self.before_test.push(action.into_test_action());
        self
    }

    pub fn after_test(mut self, action: impl IntoTestAction) -> Self {
        self.after_test.push(action.into_test_action());
        self
    }

    pub fn before_actions(&self) -> &[Arc<dyn TestAction>] {
        &self.before_test
    }

    pub fn after_actions(&self) -> &[Arc<dyn TestAction>] {
        &self.after_test
    }
}

impl fmt::Debug for TestHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestHooks")
            .field("before_test", &self.before_test.len())
            .field("after_test", &self.after_test.len())
            .finish()
    }
}

/// Observer of test case lifecycle events
pub trait TestListener: Send + Sync {
    fn on_test_start(&self, _test_name: &str) {}

    fn on_test_success(&self, _result: &TestResult) {}

    fn on_test_failure(&self, _result: &TestResult, _cause: &ActionFailure) {}

    fn on_test_finish(&self, _result: &TestResult) {}
}

/// Listener writing every lifecycle event to the structured log
#[derive(Debug, Clone, Default)]
pub struct LoggingTestListener;

impl TestListener for LoggingTestListener {
    fn on_test_start(&self, test_name: &str) {
        log_test_event(events::TEST_STARTED, test_name, "running", None);
    }

    fn on_test_success(&self, result: &TestResult) {
        log_test_event(events::TEST_SUCCEEDED, &result.name, "succeeded", None);
    }

    fn on_test_failure(&self, result: &TestResult, cause: &ActionFailure) {
        error!(
            test_name = %result.name,
            kind = %cause.kind,
            action = cause.action.as_deref(),
            error = %cause.message,
            "❌ Test failed"
        );
        log_test_event(events::TEST_FAILED, &result.name, "failed", Some(&cause.message));
    }

    fn on_test_finish(&self, result: &TestResult) {
        let duration = format!("{} ms", result.duration.as_millis());
        log_test_event(events::TEST_FINISHED, &result.name, "done", Some(&duration));
    }
}
