use crate::action::TestAction;
use crate::context::TestContext;
use crate::error::ActionResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

type ActionFn = Arc<dyn Fn(&TestContext) -> ActionResult<()> + Send + Sync>;

/// Anonymous action backed by a closure
#[derive(Clone)]
pub struct FnAction {
    name: String,
    function: ActionFn,
}

impl FnAction {
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&TestContext) -> ActionResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            function: Arc::new(function),
        }
    }
}

impl fmt::Debug for FnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction").field("name", &self.name).finish()
    }
}

#[async_trait]
impl TestAction for FnAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, context: &TestContext) -> ActionResult<()> {
        (self.function)(context)
    }
}
