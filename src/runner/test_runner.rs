//! Imperative test builder that executes top-level actions as they arrive.

use super::execution_stack::{Attachment, ClosedContainer, ContainerId, ExecutionStack};
use super::hooks::{LoggingTestListener, TestHooks, TestListener};
use super::scope::ContainerScope;
use super::{TestCase, TestResult};
use crate::action::{ActionContainer, IntoTestAction, TestAction};
use crate::config::{ExecutionConfig, TestflowConfig};
use crate::container::{
    AssertException, Catch, Condition, Conditional, FinallySequence, Iterate, Parallel,
    RepeatOnErrorUntilTrue, RepeatUntilTrue, Sequence, TemplateApply,
};
use crate::context::TestContext;
use crate::error::{ActionFailure, ActionResult};
use crate::template::TemplateRegistry;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds and runs one test case against its own context
///
/// An action passed to [`run`](Self::run) while no container is open runs
/// immediately. While containers are open, actions are added to the
/// innermost one, and the outermost container runs when it is closed.
/// Finally blocks are deferred to [`finish`](Self::finish).
///
/// ```rust
/// use testflow::{EchoAction, TestRunner};
///
/// # tokio_test::block_on(async {
/// let mut runner = TestRunner::new("iterate-demo");
/// runner.start().await.unwrap();
/// runner
///     .iterate("i lt 3", |scope| {
///         scope.run(EchoAction::new("cycle ${i}"));
///     })
///     .await
///     .unwrap();
/// let result = runner.finish().await.unwrap();
/// assert!(result.is_success());
/// # });
/// ```
pub struct TestRunner {
    case: TestCase,
    context: TestContext,
    owns_context: bool,
    stack: ExecutionStack,
    templates: TemplateRegistry,
    execution: ExecutionConfig,
}

impl TestRunner {
    /// Runner with its own context, which is reset when the test starts
    pub fn new(name: impl Into<String>) -> Self {
        let mut runner = Self::with_context(name, TestContext::new());
        runner.owns_context = true;
        runner
    }

    /// Runner over a caller-provided context; existing variables are kept
    pub fn with_context(name: impl Into<String>, context: TestContext) -> Self {
        let mut case = TestCase::new(name);
        case.add_listener(Arc::new(LoggingTestListener));
        Self {
            case,
            context,
            owns_context: false,
            stack: ExecutionStack::new(),
            templates: TemplateRegistry::new(),
            execution: ExecutionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: &TestflowConfig) -> Self {
        self.execution = config.execution.clone();
        self
    }

    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_hooks(mut self, hooks: TestHooks) -> Self {
        self.case.set_hooks(hooks);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn TestListener>) -> Self {
        self.case.add_listener(listener);
        self
    }

    pub fn context(&self) -> &TestContext {
        &self.context
    }

    pub fn test_case(&self) -> &TestCase {
        &self.case
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Number of currently open containers
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub async fn start(&mut self) -> ActionResult<()> {
        info!(test_name = %self.case.name(), "🧪 Starting test");
        if self.owns_context {
            self.context.clear();
        }
        self.case.start(&self.context).await
    }

    /// Define a test variable; applied at start, or right away once running
    pub fn variable(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ActionResult<()> {
        let name = name.into();
        let value = value.into();
        if self.case.started_at().is_none() {
            self.case.add_variable(name, value);
            Ok(())
        } else {
            self.context.create_variables([(name, value)])
        }
    }

    /// Attach an action; at top level it is recorded on the test case and run
    ///
    /// Failures of the action itself are recorded on the test case and
    /// surface in the [`TestResult`]. `Err` signals builder misuse only.
    pub async fn run(&mut self, action: impl IntoTestAction) -> ActionResult<()> {
        self.dispatch(action.into_test_action()).await
    }

    async fn dispatch(&mut self, action: Arc<dyn TestAction>) -> ActionResult<()> {
        match self.stack.attach(action) {
            Attachment::Nested => Ok(()),
            Attachment::TopLevel(action) => {
                self.case.add_action(Arc::clone(&action));
                self.case.execute_action(action, &self.context).await
            }
        }
    }

    /// Open a container explicitly; pair with [`close`](Self::close)
    pub fn open(&mut self, container: impl ActionContainer + 'static) -> ContainerId {
        self.stack.open_container(Box::new(container))
    }

    /// Close the innermost container, running it if it was the outermost
    pub async fn close(&mut self, id: ContainerId) -> ActionResult<()> {
        match self.stack.close_container(id)? {
            ClosedContainer::Finally(actions) => {
                self.case.add_finally_actions(actions);
                Ok(())
            }
            ClosedContainer::Action(action) => self.dispatch(action).await,
        }
    }

    /// Open `container`, fill it through a [`ContainerScope`], then close it
    pub async fn container<C, F>(&mut self, container: C, build: F) -> ActionResult<()>
    where
        C: ActionContainer + 'static,
        F: FnOnce(&mut ContainerScope<'_>),
    {
        let id = self.stack.open_container(Box::new(container));
        let mut scope = ContainerScope::new(
            &mut self.stack,
            self.templates.clone(),
            self.execution.clone(),
        );
        build(&mut scope);
        let (finally_actions, error) = scope.finish();
        self.case.add_finally_actions(finally_actions);
        if let Some(failure) = error {
            return Err(failure);
        }
        self.close(id).await
    }

    pub async fn sequential<F>(&mut self, build: F) -> ActionResult<()>
    where
        F: FnOnce(&mut ContainerScope<'_>),
    {
        self.container(Sequence::new(), build).await
    }

    pub async fn iterate<F>(&mut self, condition: impl Into<Condition>, build: F) -> ActionResult<()>
    where
        F: FnOnce(&mut ContainerScope<'_>),
    {
        self.container(Iterate::new(condition), build).await
    }

    pub async fn repeat<F>(&mut self, condition: impl Into<Condition>, build: F) -> ActionResult<()>
    where
        F: FnOnce(&mut ContainerScope<'_>),
    {
        self.container(RepeatUntilTrue::new(condition), build).await
    }

    pub async fn repeat_on_error<F>(
        &mut self,
        condition: impl Into<Condition>,
        build: F,
    ) -> ActionResult<()>
    where
        F: FnOnce(&mut ContainerScope<'_>),
    {
        let container = RepeatOnErrorUntilTrue::from_config(condition, &self.execution);
        self.container(container, build).await
    }

    pub async fn parallel<F>(&mut self, build: F) -> ActionResult<()>
    where
        F: FnOnce(&mut ContainerScope<'_>),
    {
        self.container(Parallel::new(), build).await
    }

    pub async fn conditional<F>(
        &mut self,
        condition: impl Into<Condition>,
        build: F,
    ) -> ActionResult<()>
    where
        F: FnOnce(&mut ContainerScope<'_>),
    {
        self.container(Conditional::new(condition), build).await
    }

    pub async fn catch_exception<F>(&mut self, build: F) -> ActionResult<()>
    where
        F: FnOnce(&mut ContainerScope<'_>),
    {
        self.container(Catch::new(), build).await
    }

    pub async fn assert_exception<F>(&mut self, expected: AssertException, build: F) -> ActionResult<()>
    where
        F: FnOnce(&mut ContainerScope<'_>),
    {
        self.container(expected, build).await
    }

    pub async fn do_finally<F>(&mut self, build: F) -> ActionResult<()>
    where
        F: FnOnce(&mut ContainerScope<'_>),
    {
        self.container(FinallySequence::new(), build).await
    }

    pub async fn apply_template<I, K>(&mut self, name: &str, parameters: I) -> ActionResult<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let action = parameters.into_iter().fold(
            TemplateApply::new(name, self.templates.clone()),
            |action, (key, value)| action.parameter(key, value),
        );
        self.run(action).await
    }

    /// Run finally actions and after-test hooks, then report the result
    ///
    /// Containers still open at this point are discarded and fail the test.
    pub async fn finish(&mut self) -> ActionResult<TestResult> {
        let open = self.stack.clear();
        if open > 0 {
            warn!(test_name = %self.case.name(), open = open, "Finishing test with open containers");
            self.case.record_failure(ActionFailure::usage(format!(
                "Invalid use of action containers - {open} container(s) never closed"
            )));
        }
        self.case.finish(&self.context).await
    }
}
