//! Criterion benchmarks for graph compilation and cycle dispatch
//!
//! Run with: cargo bench -p rivulet-core

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rivulet_core::{
    BlockDescriptor, BlockGroup, Catalog, EdgeDescriptor, Engine, EngineConfig, NodeDescriptor,
    ProcessContext, ProcessError, Signal, SignalType, Signals, compile,
};

fn ramp(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let offset = ctx.state.offset_mut();
    let start = *offset;
    *offset += ctx.buffer_size;
    Ok(Signal::Real(
        (start..start + ctx.buffer_size).map(|i| i as f32).collect(),
    ))
}

fn gain(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let input = ctx.first_real_or_silence()?;
    Ok(Signal::Real(input.iter().map(|x| x * 0.5).collect()))
}

fn catalog() -> Arc<Catalog> {
    let mut c = Catalog::new();
    for (id, signals, process) in [
        (
            "ramp",
            Signals::generator(SignalType::Real),
            ramp as rivulet_core::ProcessFn,
        ),
        (
            "gain",
            Signals::transform(SignalType::Real, SignalType::Real),
            gain as rivulet_core::ProcessFn,
        ),
    ] {
        c.register(BlockDescriptor {
            id,
            name: id,
            icon: id,
            group: BlockGroup::Transforms,
            description: "",
            signals,
            param_fields: &[],
            validate: None,
            process,
        })
        .unwrap();
    }
    c.freeze();
    Arc::new(c)
}

/// A generator followed by `len` gain stages, listed in reverse so the
/// sort has real work to do.
fn chain(len: usize) -> (Vec<NodeDescriptor>, Vec<EdgeDescriptor>) {
    let mut nodes = vec![NodeDescriptor::new("n0", "ramp")];
    nodes.extend((1..=len).map(|i| NodeDescriptor::new(format!("n{i}"), "gain")));
    nodes.reverse();
    let edges = (1..=len)
        .map(|i| EdgeDescriptor::new(format!("e{i}"), format!("n{}", i - 1), format!("n{i}")))
        .collect();
    (nodes, edges)
}

fn bench_compile(c: &mut Criterion) {
    let catalog = catalog();
    let mut group = c.benchmark_group("Compile");

    for &len in &[8usize, 64, 512] {
        let (nodes, edges) = chain(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| black_box(compile(&catalog, black_box(&nodes), black_box(&edges))))
        });
    }

    group.finish();
}

fn bench_cycle(c: &mut Criterion) {
    let catalog = catalog();
    let mut group = c.benchmark_group("Cycle");

    for &len in &[8usize, 64] {
        let (nodes, edges) = chain(len);
        let graph = compile(&catalog, &nodes, &edges).unwrap().graph;
        let mut engine = Engine::new(Arc::clone(&catalog));
        engine.initialize(graph, EngineConfig::default()).unwrap();
        engine.start();

        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| black_box(engine.execute_one_cycle().unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_cycle);
criterion_main!(benches);
