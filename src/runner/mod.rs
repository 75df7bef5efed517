//! # Test Runner
//!
//! Test case lifecycle and the builder that assembles nested containers.
//!
//! ## Lifecycle
//!
//! ```text
//! Created ──start──▶ Running ──▶ Succeeded ──┐
//!                       │                    ├──▶ Finalizing ──▶ Done
//!                       └──failure──▶ Failed ┘
//! ```
//!
//! [`TestRunner`] executes each top-level action as soon as it is submitted.
//! [`TestCase::run`] is the batch alternative for pre-assembled action lists.

pub mod execution_stack;
pub mod hooks;
pub mod scope;
pub mod state;
pub mod test_case;
pub mod test_runner;

pub use execution_stack::{Attachment, ClosedContainer, ContainerId, ExecutionStack};
pub use hooks::{LoggingTestListener, TestHooks, TestListener};
pub use scope::ContainerScope;
pub use state::TestCaseState;
pub use test_case::{TestCase, TestOutcome, TestResult};
pub use test_runner::TestRunner;
