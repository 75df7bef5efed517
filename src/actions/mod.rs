//! # Leaf Actions
//!
//! Built-in actions without children.

pub mod create_variables;
pub mod echo;
pub mod fail;
pub mod fn_action;
pub mod sleep;
pub mod stop_time;
pub mod trace_variables;

pub use create_variables::CreateVariablesAction;
pub use echo::EchoAction;
pub use fail::FailAction;
pub use fn_action::FnAction;
pub use sleep::SleepAction;
pub use stop_time::{StopTimeAction, DEFAULT_TIMELINE_ID};
pub use trace_variables::TraceVariablesAction;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::TestAction;
    use crate::context::TestContext;
    use crate::error::FailureKind;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fail_action_resolves_message() {
        let context = TestContext::new();
        context.set_variable("reason", "Failing ITest");
        let failure = FailAction::new("${reason}")
            .execute(&context)
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::ExecutionFailure);
        assert_eq!(failure.message, "Failing ITest");
    }

    #[tokio::test]
    async fn test_create_variables_in_order() {
        let context = TestContext::new();
        CreateVariablesAction::new()
            .variable("first", "alpha")
            .variable("second", "${first}-beta")
            .execute(&context)
            .await
            .unwrap();
        assert_eq!(context.get_variable("second").unwrap(), "alpha-beta");
    }

    #[tokio::test]
    async fn test_trace_unknown_variable_fails() {
        let context = TestContext::new();
        let failure = TraceVariablesAction::new()
            .variable("missing")
            .execute(&context)
            .await
            .unwrap_err();
        assert!(failure.message.contains("missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_from_variable() {
        let context = TestContext::new();
        context.set_variable("delay", 250);
        let started = tokio::time::Instant::now();
        SleepAction::from_expression("${delay}")
            .execute(&context)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(250));

        let failure = SleepAction::from_expression("soon")
            .execute(&context)
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::UsageFault);
    }

    #[tokio::test]
    async fn test_stop_time_records_elapsed() {
        let context = TestContext::new();
        let watch = StopTimeAction::with_id("load");
        watch.execute(&context).await.unwrap();
        assert!(context.has_variable("load"));
        assert!(!context.has_variable("load_elapsed_ms"));

        watch.execute(&context).await.unwrap();
        let elapsed: i64 = context.get_variable_as("load_elapsed_ms").unwrap();
        assert!(elapsed >= 0);
    }

    #[tokio::test]
    async fn test_fn_action_sees_context() {
        let context = TestContext::new();
        let action = FnAction::new("mark", |ctx: &TestContext| {
            ctx.set_variable("marked", true);
            Ok(())
        });
        action.execute(&context).await.unwrap();
        assert_eq!(action.name(), "mark");
        assert!(context.get_variable_as::<bool>("marked").unwrap());
    }
}
