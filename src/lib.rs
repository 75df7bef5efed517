#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Testflow Core
//!
//! Execution core for integration-test flows: nested action containers, a
//! shared variable context and a correlation store for request/reply
//! messaging tests.
//!
//! ## Overview
//!
//! A test is a tree of actions. Leaf actions do work (send, receive, sleep,
//! echo, fail); containers own children and decide how they run: in order,
//! in a loop, retried on failure, concurrently, conditionally, with failures
//! suppressed or asserted. All actions of a test share one [`TestContext`].
//!
//! ## Module Organization
//!
//! - [`action`] - The `TestAction` capability and the container seam
//! - [`container`] - Sequence, loops, retry, parallel, catch, assert, finally
//! - [`actions`] - Built-in leaf actions
//! - [`context`] - Variables, `${...}` resolution, functions, conditions
//! - [`correlation`] - Correlation store for request/reply matching
//! - [`runner`] - Execution stack, test case lifecycle, test runner
//! - [`template`] - Reusable action templates
//! - [`config`] - Configuration management
//! - [`error`] - Failure taxonomy and crate errors
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use testflow::{AssertException, EchoAction, FailAction, TestRunner};
//!
//! # tokio_test::block_on(async {
//! let mut runner = TestRunner::new("quick-start");
//! runner.variable("user", "alice").unwrap();
//! runner.start().await.unwrap();
//!
//! runner.run(EchoAction::new("Hello ${user}")).await.unwrap();
//! runner
//!     .assert_exception(AssertException::new().message("Failing ITest"), |scope| {
//!         scope.run(FailAction::new("Failing ITest"));
//!     })
//!     .await
//!     .unwrap();
//!
//! let result = runner.finish().await.unwrap();
//! assert!(result.is_success());
//! # });
//! ```

pub mod action;
pub mod actions;
pub mod config;
pub mod constants;
pub mod container;
pub mod context;
pub mod correlation;
pub mod error;
pub mod logging;
pub mod runner;
pub mod template;

pub use action::{execute_actions, run_action, ActionContainer, IntoTestAction, TestAction};
pub use actions::{
    CreateVariablesAction, EchoAction, FailAction, FnAction, SleepAction, StopTimeAction,
    TraceVariablesAction,
};
pub use config::{
    ConfigManager, CorrelationConfig, ExecutionConfig, LoggingConfig, TestflowConfig,
};
pub use container::{
    AssertException, Catch, Condition, Conditional, FinallySequence, Iterate, MessageMatcher,
    Parallel, RepeatOnErrorUntilTrue, RepeatUntilTrue, Sequence, TemplateApply,
};
pub use context::{ExpressionFunction, FunctionLibrary, TestContext};
pub use correlation::{
    CorrelationManager, DefaultCorrelationManager, DefaultMessageCorrelator,
    HeaderMessageCorrelator, MessageCorrelator, ObjectStore, PollingCorrelationManager,
};
pub use error::{ActionFailure, ActionResult, FailureKind, Result, TestflowError};
pub use runner::{
    ContainerScope, ExecutionStack, LoggingTestListener, TestCase, TestCaseState, TestHooks,
    TestListener, TestOutcome, TestResult, TestRunner,
};
pub use template::{Template, TemplateRegistry};
