//! Recording and scripted actions shared by the integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use testflow::{ActionFailure, ActionResult, TestAction, TestContext};
use tokio::time::{sleep, Instant};

/// Ordered log of labels written by [`Record`] actions
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, label: impl Into<String>) {
        self.entries.lock().push(label.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn record(&self, label: &str) -> Record {
        Record {
            label: label.to_string(),
            log: self.clone(),
        }
    }
}

/// Appends its label, with `${...}` resolved, to the shared log
pub struct Record {
    label: String,
    log: EventLog,
}

#[async_trait]
impl TestAction for Record {
    fn name(&self) -> &str {
        &self.label
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        self.log.push(context.resolve_dynamic_value(&self.label)?);
        Ok(())
    }
}

/// Fails the first `failures` executions, then succeeds
pub struct Flaky {
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl Flaky {
    pub fn new(failures: usize) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                failures,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl TestAction for Flaky {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn execute(&self, _context: &TestContext) -> ActionResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(ActionFailure::execution(format!("flaky failure #{}", call + 1)))
        } else {
            Ok(())
        }
    }
}

/// Sleeps, optionally fails, and records when it completed
pub struct TimedBranch {
    name: String,
    delay: Duration,
    fail: bool,
    completed_at: Arc<Mutex<Option<Instant>>>,
}

impl TimedBranch {
    pub fn new(name: &str, delay: Duration, fail: bool) -> (Self, Arc<Mutex<Option<Instant>>>) {
        let completed_at = Arc::new(Mutex::new(None));
        (
            Self {
                name: name.to_string(),
                delay,
                fail,
                completed_at: Arc::clone(&completed_at),
            },
            completed_at,
        )
    }
}

#[async_trait]
impl TestAction for TimedBranch {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _context: &TestContext) -> ActionResult<()> {
        sleep(self.delay).await;
        *self.completed_at.lock() = Some(Instant::now());
        if self.fail {
            Err(ActionFailure::execution(format!("{} failed", self.name)))
        } else {
            Ok(())
        }
    }
}
