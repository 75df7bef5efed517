//! # System Constants
//!
//! Defaults and well-known names shared by containers, the correlation store
//! and the test lifecycle.

/// Test lifecycle event names used in structured log fields
pub mod events {
    pub const TEST_STARTED: &str = "test.started";
    pub const TEST_SUCCEEDED: &str = "test.succeeded";
    pub const TEST_FAILED: &str = "test.failed";
    pub const TEST_FINALIZING: &str = "test.finalizing";
    pub const TEST_FINISHED: &str = "test.finished";

    pub const ACTION_STARTED: &str = "action.started";
    pub const ACTION_COMPLETED: &str = "action.completed";
    pub const ACTION_FAILED: &str = "action.failed";
    pub const ACTION_SKIPPED: &str = "action.skipped";
}

/// Default values for container and correlation settings
pub mod defaults {
    /// Index variable name used by iterating containers
    pub const INDEX_NAME: &str = "i";
    /// Start value of iterating container indices
    pub const INDEX_START: i64 = 1;
    /// Step of the Iterate container index
    pub const INDEX_STEP: i64 = 1;

    /// Delay between RepeatOnErrorUntilTrue cycles
    pub const AUTO_SLEEP_MS: u64 = 1000;
    /// Upper bound for a growing RepeatOnErrorUntilTrue delay
    pub const MAX_AUTO_SLEEP_MS: u64 = 10_000;
    /// Constant delay unless configured otherwise
    pub const BACKOFF_MULTIPLIER: f64 = 1.0;

    /// Correlation store polling interval
    pub const CORRELATION_POLLING_INTERVAL_MS: u64 = 500;
    /// Correlation store lookup timeout
    pub const CORRELATION_TIMEOUT_MS: u64 = 5000;
    /// Message attached to correlation lookups that run out of time
    pub const CORRELATION_RETRY_MESSAGE: &str = "Reply message did not arrive yet";
    /// Prefix of the context variable holding a consumer's correlation key
    pub const CORRELATION_KEY_PREFIX: &str = "testflow_message_correlator_";
    /// Header carrying the message id used by the default correlator
    pub const MESSAGE_ID_HEADER: &str = "testflow_message_id";
}

/// Environment variables consulted at startup
pub mod env {
    /// Selects the configuration overlay and default log level
    pub const ENVIRONMENT: &str = "TESTFLOW_ENV";
    /// Directory holding `testflow.yaml`
    pub const CONFIG_DIR: &str = "TESTFLOW_CONFIG_DIR";
    /// Prefix for `TESTFLOW__SECTION__KEY` overrides
    pub const OVERRIDE_PREFIX: &str = "TESTFLOW";
}
