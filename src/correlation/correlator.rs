//! Derivation of correlation key names and raw keys from message headers.

use crate::constants::defaults;
use crate::error::{ActionFailure, ActionResult};
use std::collections::HashMap;

/// Computes where a consumer keeps its correlation key and what the key is
pub trait MessageCorrelator: Send + Sync {
    /// Context variable name holding the correlation key for `consumer_name`
    fn correlation_key_name(&self, consumer_name: &str) -> String;

    /// Raw correlation key extracted from message headers
    fn correlation_key(&self, headers: &HashMap<String, String>) -> ActionResult<String>;
}

/// Correlates on the message id header
#[derive(Debug, Clone, Default)]
pub struct DefaultMessageCorrelator;

impl MessageCorrelator for DefaultMessageCorrelator {
    fn correlation_key_name(&self, consumer_name: &str) -> String {
        format!("{}{consumer_name}", defaults::CORRELATION_KEY_PREFIX)
    }

    fn correlation_key(&self, headers: &HashMap<String, String>) -> ActionResult<String> {
        header_value(headers, defaults::MESSAGE_ID_HEADER)
    }
}

/// Correlates on an arbitrary header such as a conversation id
#[derive(Debug, Clone)]
pub struct HeaderMessageCorrelator {
    header: String,
}

impl HeaderMessageCorrelator {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl MessageCorrelator for HeaderMessageCorrelator {
    fn correlation_key_name(&self, consumer_name: &str) -> String {
        format!(
            "{}{consumer_name}_{}",
            defaults::CORRELATION_KEY_PREFIX,
            self.header
        )
    }

    fn correlation_key(&self, headers: &HashMap<String, String>) -> ActionResult<String> {
        header_value(headers, &self.header)
    }
}

fn header_value(headers: &HashMap<String, String>, header: &str) -> ActionResult<String> {
    headers.get(header).cloned().ok_or_else(|| {
        ActionFailure::execution(format!(
            "Unable to correlate message - missing header '{header}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_correlator_uses_message_id() {
        let correlator = DefaultMessageCorrelator;
        let headers = HashMap::from([(
            defaults::MESSAGE_ID_HEADER.to_string(),
            "msg-1".to_string(),
        )]);

        assert_eq!(
            correlator.correlation_key_name("orders"),
            "testflow_message_correlator_orders"
        );
        assert_eq!(correlator.correlation_key(&headers).unwrap(), "msg-1");
        assert!(correlator.correlation_key(&HashMap::new()).is_err());
    }

    #[test]
    fn test_header_correlator_scopes_key_name() {
        let correlator = HeaderMessageCorrelator::new("conversation_id");
        let headers = HashMap::from([("conversation_id".to_string(), "c-9".to_string())]);

        assert_eq!(
            correlator.correlation_key_name("orders"),
            "testflow_message_correlator_orders_conversation_id"
        );
        assert_eq!(correlator.correlation_key(&headers).unwrap(), "c-9");
    }
}
