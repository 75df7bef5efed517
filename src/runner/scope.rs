//! Synchronous builder for nested container contents.

use super::execution_stack::{Attachment, ClosedContainer, ExecutionStack};
use crate::action::{ActionContainer, IntoTestAction, TestAction};
use crate::config::ExecutionConfig;
use crate::container::{
    AssertException, Catch, Condition, Conditional, FinallySequence, Iterate, Parallel,
    RepeatOnErrorUntilTrue, RepeatUntilTrue, Sequence, TemplateApply,
};
use crate::error::ActionFailure;
use crate::template::TemplateRegistry;
use serde_json::Value;
use std::sync::Arc;

/// Fills the innermost open container
///
/// A scope only reaches the execution stack, never the test context, so
/// nothing built through it runs before the outermost container closes.
pub struct ContainerScope<'a> {
    stack: &'a mut ExecutionStack,
    templates: TemplateRegistry,
    execution: ExecutionConfig,
    finally_actions: Vec<Arc<dyn TestAction>>,
    error: Option<ActionFailure>,
}

impl<'a> ContainerScope<'a> {
    pub(crate) fn new(
        stack: &'a mut ExecutionStack,
        templates: TemplateRegistry,
        execution: ExecutionConfig,
    ) -> Self {
        Self {
            stack,
            templates,
            execution,
            finally_actions: Vec::new(),
            error: None,
        }
    }

    /// Finally actions collected from nested finally blocks, plus the first
    /// stack error if any
    pub(crate) fn finish(self) -> (Vec<Arc<dyn TestAction>>, Option<ActionFailure>) {
        (self.finally_actions, self.error)
    }

    fn record_error(&mut self, failure: ActionFailure) {
        if self.error.is_none() {
            self.error = Some(failure);
        }
    }

    /// Add an action to the innermost open container
    pub fn run(&mut self, action: impl IntoTestAction) -> &mut Self {
        let action = action.into_test_action();
        if let Attachment::TopLevel(action) = self.stack.attach(action) {
            self.record_error(ActionFailure::usage(format!(
                "Invalid use of action containers - '{}' added outside of a container scope",
                action.name()
            )));
        }
        self
    }

    /// Open `container`, fill it with `build`, then close it into the parent
    pub fn container<C, F>(&mut self, container: C, build: F) -> &mut Self
    where
        C: ActionContainer + 'static,
        F: FnOnce(&mut ContainerScope<'a>),
    {
        let id = self.stack.open_container(Box::new(container));
        build(&mut *self);
        match self.stack.close_container(id) {
            Ok(ClosedContainer::Finally(actions)) => self.finally_actions.extend(actions),
            Ok(ClosedContainer::Action(action)) => {
                self.run(action);
            }
            Err(failure) => self.record_error(failure),
        }
        self
    }

    pub fn sequential<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut ContainerScope<'a>),
    {
        self.container(Sequence::new(), build)
    }

    pub fn iterate<F>(&mut self, condition: impl Into<Condition>, build: F) -> &mut Self
    where
        F: FnOnce(&mut ContainerScope<'a>),
    {
        self.container(Iterate::new(condition), build)
    }

    pub fn repeat<F>(&mut self, condition: impl Into<Condition>, build: F) -> &mut Self
    where
        F: FnOnce(&mut ContainerScope<'a>),
    {
        self.container(RepeatUntilTrue::new(condition), build)
    }

    pub fn repeat_on_error<F>(&mut self, condition: impl Into<Condition>, build: F) -> &mut Self
    where
        F: FnOnce(&mut ContainerScope<'a>),
    {
        let container = RepeatOnErrorUntilTrue::from_config(condition, &self.execution);
        self.container(container, build)
    }

    pub fn parallel<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut ContainerScope<'a>),
    {
        self.container(Parallel::new(), build)
    }

    pub fn conditional<F>(&mut self, condition: impl Into<Condition>, build: F) -> &mut Self
    where
        F: FnOnce(&mut ContainerScope<'a>),
    {
        self.container(Conditional::new(condition), build)
    }

    pub fn catch_exception<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut ContainerScope<'a>),
    {
        self.container(Catch::new(), build)
    }

    pub fn assert_exception<F>(&mut self, expected: AssertException, build: F) -> &mut Self
    where
        F: FnOnce(&mut ContainerScope<'a>),
    {
        self.container(expected, build)
    }

    pub fn do_finally<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut ContainerScope<'a>),
    {
        self.container(FinallySequence::new(), build)
    }

    pub fn apply_template<I, K>(&mut self, name: &str, parameters: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let action = parameters.into_iter().fold(
            TemplateApply::new(name, self.templates.clone()),
            |action, (key, value)| action.parameter(key, value),
        );
        self.run(action)
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }
}
