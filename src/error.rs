//! # Error Types
//!
//! Failure taxonomy for test action execution plus the crate-level error used
//! by configuration and logging setup.
//!
//! Every action returns an [`ActionResult`]. Containers inspect the
//! [`FailureKind`] of a failed child to decide whether to suppress, retry or
//! propagate it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classified kind of an action failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A leaf action's work did not complete as expected
    ExecutionFailure,
    /// Invalid container nesting or invalid configuration; never retried
    UsageFault,
    /// An asserted failure did not happen or did not match
    AssertionUnmet,
    /// Correlation store lookup timed out
    CorrelationNotFound,
    /// One or more parallel branches failed
    AggregateFailure,
}

impl FailureKind {
    /// Usage faults are programmer errors and bypass every recovery policy
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::UsageFault)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailure => write!(f, "execution_failure"),
            Self::UsageFault => write!(f, "usage_fault"),
            Self::AssertionUnmet => write!(f, "assertion_unmet"),
            Self::CorrelationNotFound => write!(f, "correlation_not_found"),
            Self::AggregateFailure => write!(f, "aggregate_failure"),
        }
    }
}

impl std::str::FromStr for FailureKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "execution_failure" => Ok(Self::ExecutionFailure),
            "usage_fault" => Ok(Self::UsageFault),
            "assertion_unmet" => Ok(Self::AssertionUnmet),
            "correlation_not_found" => Ok(Self::CorrelationNotFound),
            "aggregate_failure" => Ok(Self::AggregateFailure),
            _ => Err(format!("Invalid failure kind: {s}")),
        }
    }
}

/// Failure returned by a test action
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct ActionFailure {
    /// Classified kind used by Catch, AssertException and retry containers
    pub kind: FailureKind,
    /// Human-readable failure message
    pub message: String,
    /// Name of the action that produced the failure, if known
    pub action: Option<String>,
    /// Underlying failures, only populated for aggregate failures
    pub causes: Vec<ActionFailure>,
}

impl ActionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
            causes: Vec::new(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(FailureKind::ExecutionFailure, message)
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(FailureKind::UsageFault, message)
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(FailureKind::AssertionUnmet, message)
    }

    pub fn correlation_not_found(key: &str, detail: &str) -> Self {
        Self::new(
            FailureKind::CorrelationNotFound,
            format!("{detail} - no value found for correlation key '{key}'"),
        )
    }

    /// Aggregate failure: message of the representative failure, all causes kept
    pub fn aggregate(causes: Vec<ActionFailure>) -> Self {
        let message = match causes.first() {
            Some(first) if causes.len() == 1 => first.message.clone(),
            Some(first) => format!("{} (and {} more failures)", first.message, causes.len() - 1),
            None => "Aggregate failure without causes".to_string(),
        };
        Self {
            kind: FailureKind::AggregateFailure,
            message,
            action: None,
            causes,
        }
    }

    /// Tag the failure with the action name unless an inner action already did
    pub fn in_action(mut self, action: &str) -> Self {
        if self.action.is_none() {
            self.action = Some(action.to_string());
        }
        self
    }

    pub fn is_usage_fault(&self) -> bool {
        self.kind == FailureKind::UsageFault
    }
}

pub type ActionResult<T> = std::result::Result<T, ActionFailure>;

/// Crate-level errors outside of action execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TestflowError {
    #[error("Action failed: {0}")]
    Action(#[from] ActionFailure),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
}

impl From<config::ConfigError> for TestflowError {
    fn from(error: config::ConfigError) -> Self {
        TestflowError::ConfigurationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TestflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_round_trip() {
        for kind in [
            FailureKind::ExecutionFailure,
            FailureKind::UsageFault,
            FailureKind::AssertionUnmet,
            FailureKind::CorrelationNotFound,
            FailureKind::AggregateFailure,
        ] {
            assert_eq!(kind.to_string().parse::<FailureKind>().unwrap(), kind);
        }
        assert!("bogus".parse::<FailureKind>().is_err());
    }

    #[test]
    fn test_aggregate_uses_first_cause() {
        let failure = ActionFailure::aggregate(vec![
            ActionFailure::execution("first"),
            ActionFailure::execution("second"),
        ]);
        assert_eq!(failure.kind, FailureKind::AggregateFailure);
        assert!(failure.message.starts_with("first"));
        assert_eq!(failure.causes.len(), 2);
    }

    #[test]
    fn test_in_action_keeps_innermost_name() {
        let failure = ActionFailure::execution("boom")
            .in_action("inner")
            .in_action("outer");
        assert_eq!(failure.action.as_deref(), Some("inner"));
        assert_eq!(failure.to_string(), "execution_failure: boom");
    }
}
