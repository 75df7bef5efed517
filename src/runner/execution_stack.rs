//! Stack of containers that are open while a test is being built.

use crate::action::{ActionContainer, TestAction};
use crate::error::{ActionFailure, ActionResult};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Handle returned when a container is opened, required to close it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

/// Where an attached action ended up
pub enum Attachment {
    /// Added to the innermost open container
    Nested,
    /// No container is open; the caller must run the action
    TopLevel(Arc<dyn TestAction>),
}

/// A container removed from the stack
pub enum ClosedContainer {
    /// Ordinary container, ready to attach or run
    Action(Arc<dyn TestAction>),
    /// Children of a finally block, destined for the test case's finally list
    Finally(Vec<Arc<dyn TestAction>>),
}

struct Frame {
    id: ContainerId,
    container: Box<dyn ActionContainer>,
}

/// Tracks open containers; the innermost one receives attached actions
///
/// Containers must be closed in reverse order of opening. Closing anything
/// other than the innermost container is a usage fault.
#[derive(Default)]
pub struct ExecutionStack {
    frames: Vec<Frame>,
    next_id: u64,
}

impl ExecutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_container(&mut self, container: Box<dyn ActionContainer>) -> ContainerId {
        let id = ContainerId(self.next_id);
        self.next_id += 1;
        debug!(container = %container.name(), depth = self.frames.len() + 1, "📂 Container opened");
        self.frames.push(Frame { id, container });
        id
    }

    pub fn close_container(&mut self, id: ContainerId) -> ActionResult<ClosedContainer> {
        let innermost = self.frames.last().ok_or_else(|| {
            ActionFailure::usage("Invalid use of action containers - no container is open")
        })?;
        if innermost.id != id {
            return Err(ActionFailure::usage(format!(
                "Invalid use of action containers - '{}' must be closed first",
                innermost.container.name()
            )));
        }

        let Some(Frame { mut container, .. }) = self.frames.pop() else {
            return Err(ActionFailure::usage(
                "Invalid use of action containers - no container is open",
            ));
        };
        debug!(
            container = %container.name(),
            children = container.action_count(),
            depth = self.frames.len(),
            "📁 Container closed"
        );

        if container.is_finally_block() {
            Ok(ClosedContainer::Finally(container.take_actions()))
        } else {
            Ok(ClosedContainer::Action(container.into_action()))
        }
    }

    pub fn attach(&mut self, action: Arc<dyn TestAction>) -> Attachment {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.container.add_action(action);
                Attachment::Nested
            }
            None => Attachment::TopLevel(action),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every open container, returning how many were discarded
    pub fn clear(&mut self) -> usize {
        let open = self.frames.len();
        self.frames.clear();
        open
    }
}

impl fmt::Debug for ExecutionStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.frames.iter().map(|frame| frame.container.name()).collect();
        f.debug_struct("ExecutionStack").field("open", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::EchoAction;
    use crate::container::{FinallySequence, Sequence};
    use crate::error::FailureKind;

    #[test]
    fn test_nested_attach_and_close() {
        let mut stack = ExecutionStack::new();
        let outer = stack.open_container(Box::new(Sequence::named("outer")));
        let inner = stack.open_container(Box::new(Sequence::named("inner")));

        assert!(matches!(
            stack.attach(Arc::new(EchoAction::new("x"))),
            Attachment::Nested
        ));

        let ClosedContainer::Action(closed) = stack.close_container(inner).unwrap() else {
            panic!("expected an action");
        };
        assert_eq!(closed.name(), "inner");
        assert!(matches!(stack.attach(closed), Attachment::Nested));

        assert!(matches!(
            stack.close_container(outer).unwrap(),
            ClosedContainer::Action(_)
        ));
        assert!(stack.is_empty());
        assert!(matches!(
            stack.attach(Arc::new(EchoAction::new("y"))),
            Attachment::TopLevel(_)
        ));
    }

    #[test]
    fn test_out_of_order_close_is_usage_fault() {
        let mut stack = ExecutionStack::new();
        let outer = stack.open_container(Box::new(Sequence::new()));
        let _inner = stack.open_container(Box::new(Sequence::new()));

        let failure = stack.close_container(outer).err().unwrap();
        assert_eq!(failure.kind, FailureKind::UsageFault);
        assert!(failure.message.starts_with("Invalid use of action containers"));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_close_on_empty_stack_is_usage_fault() {
        let mut stack = ExecutionStack::new();
        let id = stack.open_container(Box::new(Sequence::new()));
        stack.close_container(id).ok();
        assert!(stack.close_container(id).err().unwrap().is_usage_fault());
    }

    #[test]
    fn test_finally_block_yields_children() {
        let mut stack = ExecutionStack::new();
        let id = stack.open_container(Box::new(FinallySequence::new()));
        stack.attach(Arc::new(EchoAction::new("cleanup")));

        match stack.close_container(id).ok().unwrap() {
            ClosedContainer::Finally(actions) => assert_eq!(actions.len(), 1),
            ClosedContainer::Action(_) => panic!("finally block must not become an action"),
        }
    }
}
