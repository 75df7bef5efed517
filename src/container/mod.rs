//! # Action Containers
//!
//! Actions that own children and decide how, whether and how often they run.
//!
//! | Container | Behaviour |
//! |-----------|-----------|
//! | [`Sequence`] | children in order, first failure aborts |
//! | [`Iterate`] | loop while the condition holds |
//! | [`RepeatUntilTrue`] | loop until the condition holds, at least once |
//! | [`RepeatOnErrorUntilTrue`] | retry failing children with a delay |
//! | [`Parallel`] | one task per child, aggregate failures |
//! | [`Conditional`] | run once if the condition holds |
//! | [`Catch`] | suppress matching failures |
//! | [`AssertException`] | require the children to fail |
//! | [`FinallySequence`] | defer children to the end of the test |
//! | [`TemplateApply`] | run a registered template |

pub mod assert_exception;
pub mod catch;
pub mod condition;
pub mod conditional;
pub mod finally;
pub mod iterate;
pub mod message_matcher;
pub mod parallel;
pub mod repeat;
pub mod repeat_on_error;
pub mod sequence;
pub mod template_apply;

pub use assert_exception::AssertException;
pub use catch::Catch;
pub use condition::{Condition, ConditionFn};
pub use conditional::Conditional;
pub use finally::FinallySequence;
pub use iterate::Iterate;
pub use message_matcher::MessageMatcher;
pub use parallel::Parallel;
pub use repeat::RepeatUntilTrue;
pub use repeat_on_error::RepeatOnErrorUntilTrue;
pub use sequence::Sequence;
pub use template_apply::TemplateApply;
