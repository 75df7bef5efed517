//! Correlation manager that waits for late-arriving entries.

use super::{CorrelationManager, ObjectStore};
use crate::config::CorrelationConfig;
use crate::error::{ActionFailure, ActionResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Correlation manager that polls the store until an entry appears
///
/// Request and reply may race: the reply-consuming path can start its
/// lookup before the request side has stored anything. `find` therefore
/// re-checks the store every `polling_interval` until the entry shows up or
/// the timeout elapses.
#[derive(Debug)]
pub struct PollingCorrelationManager<T> {
    store: ObjectStore<T>,
    polling_interval: Duration,
    default_timeout: Duration,
    retry_message: String,
}

impl<T: Clone> PollingCorrelationManager<T> {
    /// Create a manager; a zero polling interval is a usage fault
    pub fn new(polling_interval: Duration, retry_message: impl Into<String>) -> ActionResult<Self> {
        if polling_interval.is_zero() {
            return Err(ActionFailure::usage(
                "Correlation polling interval must be greater than zero",
            ));
        }
        let defaults = CorrelationConfig::default();
        Ok(Self {
            store: ObjectStore::new(),
            polling_interval,
            default_timeout: defaults.default_timeout(),
            retry_message: retry_message.into(),
        })
    }

    pub fn from_config(config: &CorrelationConfig) -> ActionResult<Self> {
        let mut manager = Self::new(config.polling_interval(), config.retry_message.clone())?;
        manager.default_timeout = config.default_timeout();
        Ok(manager)
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn object_store(&self) -> &ObjectStore<T> {
        &self.store
    }
}

impl<T> PollingCorrelationManager<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// `find` using the configured default timeout
    pub async fn find_with_default_timeout(&self, key: &str) -> ActionResult<T> {
        self.find(key, self.default_timeout).await
    }
}

#[async_trait]
impl<T> CorrelationManager<T> for PollingCorrelationManager<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn store(&self, key: &str, value: T) -> Option<T> {
        self.store.add(key, value)
    }

    async fn find(&self, key: &str, timeout: Duration) -> ActionResult<T> {
        let started = Instant::now();
        // `None` when the timeout is too large to represent: wait without a deadline
        let deadline = started.checked_add(timeout);
        let mut polls = 0u32;

        loop {
            if let Some(value) = self.store.get(key) {
                debug!(
                    correlation_key = %key,
                    polls = polls,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "Correlation entry found"
                );
                return Ok(value);
            }

            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                info!(
                    correlation_key = %key,
                    timeout_ms = timeout.as_millis() as u64,
                    polls = polls,
                    "⏱️ Correlation lookup timed out"
                );
                return Err(ActionFailure::correlation_not_found(key, &self.retry_message));
            }

            polls += 1;
            debug!(
                correlation_key = %key,
                interval_ms = self.polling_interval.as_millis() as u64,
                "{} - trying again",
                self.retry_message
            );
            let wait = deadline.map_or(self.polling_interval, |deadline| {
                self.polling_interval.min(deadline - now)
            });
            sleep(wait).await;
        }
    }
}
