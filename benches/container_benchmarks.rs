use criterion::{black_box, criterion_group, criterion_main, Criterion};
use testflow::context::boolean_expression;
use testflow::{EchoAction, Iterate, Parallel, Sequence, TestAction, TestContext};

fn benchmark_variable_resolution(c: &mut Criterion) {
    let context = TestContext::new();
    context.set_variable("user", "alice");
    context.set_variable("order", 42);

    c.bench_function("resolve_dynamic_value", |b| {
        b.iter(|| {
            context
                .resolve_dynamic_value(black_box("order ${order} for core:upperCase(${user})"))
                .ok()
        })
    });
}

fn benchmark_condition_evaluation(c: &mut Criterion) {
    c.bench_function("boolean_expression", |b| {
        b.iter(|| boolean_expression::evaluate(black_box("(3 lt 5 and 'a' = 'a') or 1 gt 2")).ok())
    });
}

fn benchmark_containers(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    let sequence = (0..50).fold(Sequence::new(), |sequence, i| {
        sequence.with_action(EchoAction::new(format!("step {i}")))
    });
    c.bench_function("sequence_50_echo", |b| {
        b.iter(|| runtime.block_on(sequence.execute(&TestContext::new())).ok())
    });

    let iterate = Iterate::new("i lt 50").with_action(EchoAction::new("cycle ${i}"));
    c.bench_function("iterate_50_cycles", |b| {
        b.iter(|| runtime.block_on(iterate.execute(&TestContext::new())).ok())
    });

    let parallel = (0..8).fold(Parallel::new(), |parallel, i| {
        parallel.with_action(EchoAction::new(format!("branch {i}")))
    });
    c.bench_function("parallel_8_branches", |b| {
        b.iter(|| runtime.block_on(parallel.execute(&TestContext::new())).ok())
    });
}

criterion_group!(
    benches,
    benchmark_variable_resolution,
    benchmark_condition_evaluation,
    benchmark_containers
);
criterion_main!(benches);
