//! Benchmarks du compteur de cycles et du surcoût d'une sonde
//!
//! Le surcoût de lecture TSC fixe la taille de boucle minimale utile.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use latency_engine::{probe_fn, BenchmarkRunner, InstructionRegistry, RunConfig};

#[cfg(target_arch = "x86_64")]
pub fn tsc_read_benchmark(c: &mut Criterion) {
    use latency_engine::{CycleTimer, Tsc};

    let mut group = c.benchmark_group("tsc");

    group.bench_function("rdtsc", |b| b.iter(|| black_box(Tsc::read())));

    group.bench_function("lfence_rdtsc", |b| b.iter(|| black_box(CycleTimer::read(&Tsc))));

    group.finish();
}

#[cfg(not(target_arch = "x86_64"))]
pub fn tsc_read_benchmark(_c: &mut Criterion) {}

#[cfg(target_arch = "x86_64")]
pub fn nop_probe_benchmark(c: &mut Criterion) {
    use latency_engine::{builtin_registry, ReferenceTable, Selection};

    let registry = builtin_registry(&Selection::of(["NOP"]), &ReferenceTable::new()).unwrap();
    let probe = registry.all()[0].probe();

    c.bench_function("nop_probe_1k", |b| b.iter(|| black_box(probe.measure(1_000).unwrap())));
}

#[cfg(not(target_arch = "x86_64"))]
pub fn nop_probe_benchmark(_c: &mut Criterion) {}

/// Surcoût du runner seul (sonde stub)
pub fn runner_dispatch_benchmark(c: &mut Criterion) {
    let mut registry = InstructionRegistry::new();
    for name in ["A", "B", "C", "D"] {
        registry.register(name, "Stub", 1.0, probe_fn(|_| 1.0)).unwrap();
    }
    let runner = BenchmarkRunner::new(RunConfig::new(1, 3, 50.0)).unwrap();

    c.bench_function("runner_dispatch_4x3", |b| {
        b.iter(|| black_box(runner.evaluate(&registry).unwrap().len()))
    });
}

criterion_group!(benches, tsc_read_benchmark, nop_probe_benchmark, runner_dispatch_benchmark);
criterion_main!(benches);
