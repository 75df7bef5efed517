mod common;

use common::EventLog;
use proptest::prelude::*;
use testflow::context::boolean_expression;
use testflow::{FailAction, Iterate, MessageMatcher, Sequence, TestAction, TestContext};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio_test::block_on(future)
}

proptest! {
    /// Property: Iterate runs exactly once per index value satisfying the condition
    #[test]
    fn iterate_runs_once_per_index(start in -5i64..5, count in 0i64..15, step in 1i64..4) {
        let end = start + count;
        let log = EventLog::new();
        let iterate = Iterate::new(format!("i lt {end}"))
            .start(start)
            .step(step)
            .with_action(log.record("${i}"));

        block_on(iterate.execute(&TestContext::new())).unwrap();

        let expected: Vec<String> = (start..end)
            .step_by(step as usize)
            .map(|i| i.to_string())
            .collect();
        prop_assert_eq!(log.entries(), expected);
    }

    /// Property: children after the failing one never execute
    #[test]
    fn sequence_stops_at_failure(total in 1usize..10, failing in 0usize..10) {
        let failing = failing % total;
        let log = EventLog::new();
        let mut sequence = Sequence::new();
        for index in 0..total {
            sequence = if index == failing {
                sequence.with_action(FailAction::new("stop"))
            } else {
                sequence.with_action(log.record(&format!("child-{index}")))
            };
        }

        prop_assert!(block_on(sequence.execute(&TestContext::new())).is_err());
        let expected: Vec<String> = (0..failing).map(|i| format!("child-{i}")).collect();
        prop_assert_eq!(log.entries(), expected);
    }

    /// Property: numeric comparisons agree with integer ordering
    #[test]
    fn numeric_comparisons_match_integers(a in -1000i64..1000, b in -1000i64..1000) {
        prop_assert_eq!(boolean_expression::evaluate(&format!("{a} lt {b}")).unwrap(), a < b);
        prop_assert_eq!(boolean_expression::evaluate(&format!("{a} >= {b}")).unwrap(), a >= b);
        prop_assert_eq!(boolean_expression::evaluate(&format!("{a} = {b}")).unwrap(), a == b);
    }

    /// Property: text without placeholders resolves to itself
    #[test]
    fn plain_text_resolves_unchanged(text in "[a-zA-Z0-9 ,.]{0,40}") {
        let context = TestContext::new();
        prop_assert_eq!(context.resolve_dynamic_value(&text).unwrap(), text);
    }

    /// Property: a startsWith matcher accepts any extension of its prefix
    #[test]
    fn starts_with_matcher_accepts_extensions(prefix in "[a-zA-Z ]{1,20}", rest in "[a-zA-Z ]{0,20}") {
        let matcher = MessageMatcher::parse(&format!("@startsWith('{prefix}')@")).unwrap();
        let actual = format!("{prefix}{rest}");
        prop_assert!(matcher.matches(&actual));
    }
}
