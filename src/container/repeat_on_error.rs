//! Retry-until-success container.

use super::Condition;
use crate::action::{execute_actions, IntoTestAction, TestAction};
use crate::config::ExecutionConfig;
use crate::constants::defaults;
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult};
use crate::impl_action_container;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Repeats its children until they succeed
///
/// Before each cycle the termination condition is checked against the
/// current index. A failed cycle is logged and swallowed, the container
/// sleeps and tries again with the next index. When the condition is met or
/// `max_attempts` cycles have run without success, the last failure is
/// propagated. Usage faults are never retried.
///
/// The delay starts at `auto_sleep` and is multiplied by `backoff_multiplier`
/// after every failed cycle, capped at `max_auto_sleep`.
pub struct RepeatOnErrorUntilTrue {
    name: String,
    index_name: String,
    start: i64,
    condition: Condition,
    auto_sleep: Duration,
    backoff_multiplier: f64,
    max_auto_sleep: Duration,
    max_attempts: Option<u32>,
    actions: Vec<Arc<dyn TestAction>>,
}

impl RepeatOnErrorUntilTrue {
    pub fn new(condition: impl Into<Condition>) -> Self {
        Self::from_config(condition, &ExecutionConfig::default())
    }

    /// Take delay settings from the execution configuration
    pub fn from_config(condition: impl Into<Condition>, config: &ExecutionConfig) -> Self {
        Self {
            name: "repeat-on-error".to_string(),
            index_name: defaults::INDEX_NAME.to_string(),
            start: defaults::INDEX_START,
            condition: condition.into(),
            auto_sleep: Duration::from_millis(config.default_auto_sleep_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_auto_sleep: Duration::from_millis(config.max_auto_sleep_ms),
            max_attempts: None,
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

    pub fn auto_sleep(mut self, delay: Duration) -> Self {
        self.auto_sleep = delay;
        if self.max_auto_sleep < delay {
            self.max_auto_sleep = delay;
        }
        self
    }

    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn max_auto_sleep(mut self, max: Duration) -> Self {
        self.max_auto_sleep = max;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_action(mut self, action: impl IntoTestAction) -> Self {
        self.actions.push(action.into_test_action());
        self
    }

    fn should_stop(&self, index: i64, attempts: u32, context: &TestContext) -> ActionResult<bool> {
        if self.max_attempts.is_some_and(|max| attempts >= max) {
            return Ok(true);
        }
        self.condition
            .evaluate(Some(&self.index_name), index, context)
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        delay
            .mul_f64(self.backoff_multiplier)
            .min(self.max_auto_sleep)
    }
}

#[async_trait]
impl TestAction for RepeatOnErrorUntilTrue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ActionFailure::usage(format!(
                "Backoff multiplier must be at least 1.0, got {}",
                self.backoff_multiplier
            )));
        }

        let mut index = self.start;
        let mut attempts = 0u32;
        let mut delay = self.auto_sleep;
        let mut last_failure: Option<ActionFailure> = None;

        let mut stop = self.should_stop(index, attempts, context)?;
        while !stop {
            context.set_variable(self.index_name.as_str(), index);
            attempts += 1;
            debug!(container = %self.name, index = index, attempt = attempts, "🔁 Repeat-on-error cycle");

            match execute_actions(&self.actions, context).await {
                Ok(()) => {
                    if attempts > 1 {
                        info!(container = %self.name, attempts = attempts, "✅ Succeeded after retry");
                    }
                    return Ok(());
                }
                Err(failure) if !failure.kind.is_recoverable() => return Err(failure),
                Err(failure) => {
                    info!(
                        container = %self.name,
                        index = index,
                        error = %failure,
                        "Caught failure in repeat-on-error cycle, retrying"
                    );
                    last_failure = Some(failure);
                }
            }

            index += 1;
            stop = self.should_stop(index, attempts, context)?;
            if !stop && !delay.is_zero() {
                debug!(container = %self.name, delay_ms = delay.as_millis() as u64, "Sleeping before next cycle");
                sleep(delay).await;
                delay = self.next_delay(delay);
            }
        }

        match last_failure {
            Some(failure) => {
                warn!(container = %self.name, attempts = attempts, error = %failure, "❌ Giving up after repeated failures");
                Err(failure)
            }
            None => Ok(()),
        }
    }
}

impl_action_container!(RepeatOnErrorUntilTrue);
