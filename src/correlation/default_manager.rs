//! Non-blocking correlation manager.

use super::{CorrelationManager, ObjectStore};
use crate::error::{ActionFailure, ActionResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Correlation manager whose `find` answers immediately
///
/// The timeout passed to `find` is ignored; an absent key fails at once.
#[derive(Debug)]
pub struct DefaultCorrelationManager<T> {
    store: ObjectStore<T>,
}

impl<T: Clone> DefaultCorrelationManager<T> {
    pub fn new() -> Self {
        Self {
            store: ObjectStore::new(),
        }
    }

    /// Underlying store, exposed for diagnostics
    pub fn object_store(&self) -> &ObjectStore<T> {
        &self.store
    }

    /// Current value without failing on absence
    pub fn peek(&self, key: &str) -> Option<T> {
        self.store.get(key)
    }
}

impl<T: Clone> Default for DefaultCorrelationManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> CorrelationManager<T> for DefaultCorrelationManager<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn store(&self, key: &str, value: T) -> Option<T> {
        self.store.add(key, value)
    }

    async fn find(&self, key: &str, _timeout: Duration) -> ActionResult<T> {
        debug!(correlation_key = %key, "Finding correlation entry");
        self.store
            .get(key)
            .ok_or_else(|| ActionFailure::correlation_not_found(key, "Correlation lookup failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[tokio::test]
    async fn test_find_present_and_absent() {
        let manager = DefaultCorrelationManager::new();
        manager.store("reply-1", "queue://replies".to_string());

        let found = manager.find("reply-1", Duration::from_secs(1)).await.unwrap();
        assert_eq!(found, "queue://replies");

        let failure = manager.find("reply-2", Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::CorrelationNotFound);
        assert!(failure.message.contains("reply-2"));
    }
}
