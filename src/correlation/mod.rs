//! # Correlation Store
//!
//! Bridges two temporally decoupled actions: a request-side action that
//! learns reply-routing information and a reply-side action that needs it
//! later, possibly before it has arrived.
//!
//! ## Flow
//!
//! ```text
//! request side                               reply side
//! ─────────────                              ──────────
//! key_name = correlator.correlation_key_name(consumer)
//! key      = correlator.correlation_key(headers)
//! manager.save_correlation_key(key_name, key, ctx)
//! manager.store(key, reply_to) ───────┐
//!                                     │      key   = manager.get_correlation_key(key_name, ctx)
//!                                     └────▶ reply = manager.find(key, timeout).await
//! ```
//!
//! Entries are never removed by a lookup. A second `store` under the same
//! key overwrites the first (last write wins) and is reported through the
//! duplicate-write diagnostics of [`ObjectStore`].

pub mod correlator;
pub mod default_manager;
pub mod object_store;
pub mod polling_manager;

use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult};
use async_trait::async_trait;
use std::time::Duration;

pub use correlator::{DefaultMessageCorrelator, HeaderMessageCorrelator, MessageCorrelator};
pub use default_manager::DefaultCorrelationManager;
pub use object_store::ObjectStore;
pub use polling_manager::PollingCorrelationManager;

/// Contract transport adapters use to hand off and retrieve reply-routing state
#[async_trait]
pub trait CorrelationManager<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Associate `value` with `key`, returning the value it replaced
    fn store(&self, key: &str, value: T) -> Option<T>;

    /// Look up the value for `key`, waiting at most `timeout`
    async fn find(&self, key: &str, timeout: Duration) -> ActionResult<T>;

    /// Remember the raw correlation key under `key_name` in the test context
    fn save_correlation_key(&self, key_name: &str, key: &str, context: &TestContext) {
        context.set_variable(key_name, key);
    }

    /// Read the correlation key saved under `key_name` and resolve it
    fn get_correlation_key(&self, key_name: &str, context: &TestContext) -> ActionResult<String> {
        if !context.has_variable(key_name) {
            return Err(ActionFailure::execution(format!(
                "Failed to get correlation key for '{key_name}'"
            )));
        }
        let raw = context.get_variable(key_name)?;
        context.resolve_dynamic_value(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_key_round_trip_through_context() {
        let manager = DefaultCorrelationManager::<String>::new();
        let context = TestContext::new();
        context.set_variable("conversation", "42");

        manager.save_correlation_key("reply_key", "order-${conversation}", &context);
        let key = manager.get_correlation_key("reply_key", &context).unwrap();
        assert_eq!(key, "order-42");
    }

    #[test]
    fn test_missing_correlation_key_fails() {
        let manager = DefaultCorrelationManager::<String>::new();
        let failure = manager
            .get_correlation_key("never_saved", &TestContext::new())
            .unwrap_err();
        assert!(failure.message.contains("never_saved"));
    }
}
