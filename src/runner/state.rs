use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseState {
    /// Built but not started
    Created,
    /// Executing before-hooks and body actions
    Running,
    /// Body finished without an unrecovered failure
    Succeeded,
    /// A before-hook or body action failed; later body actions are skipped
    Failed,
    /// Running finally actions and after-hooks
    Finalizing,
    /// Result is final
    Done,
}

impl TestCaseState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Body actions may still be submitted
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Failed)
    }

    pub fn can_transition_to(&self, next: TestCaseState) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Running)
                | (Self::Running, Self::Succeeded)
                | (Self::Running, Self::Failed)
                | (Self::Succeeded, Self::Finalizing)
                | (Self::Failed, Self::Finalizing)
                | (Self::Finalizing, Self::Done)
        )
    }
}

impl Default for TestCaseState {
    fn default() -> Self {
        Self::Created
    }
}

impl fmt::Display for TestCaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for TestCaseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "running" => Ok(Self::Running),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "finalizing" => Ok(Self::Finalizing),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid test case state: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        use TestCaseState::*;

        assert!(Created.can_transition_to(Running));
        assert!(Running.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Finalizing));
        assert!(Finalizing.can_transition_to(Done));

        assert!(!Created.can_transition_to(Done));
        assert!(!Failed.can_transition_to(Succeeded));
        assert!(!Done.can_transition_to(Running));
        assert!(Done.is_terminal());
    }

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(TestCaseState::Finalizing.to_string(), "finalizing");
        assert_eq!(
            "succeeded".parse::<TestCaseState>().unwrap(),
            TestCaseState::Succeeded
        );
        assert!("paused".parse::<TestCaseState>().is_err());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&TestCaseState::Running).unwrap();
        assert_eq!(json, "\"running\"");
        let parsed: TestCaseState = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed, TestCaseState::Done);
    }
}
