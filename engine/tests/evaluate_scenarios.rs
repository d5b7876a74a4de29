//! End-to-end evaluation scenarios against stub probes and a simulated
//! cycle counter.

use std::cell::Cell;

use latency_engine::{
    deviation_pct, evaluate, probe_fn, CycleTimer, InstructionRegistry, LatencyError, LoopProbe,
};
use proptest::prelude::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

thread_local! {
    static CYCLES: Cell<u64> = Cell::new(0);
}

/// Cycle counter that only moves when a simulated loop runs
struct SimulatedTsc;

impl CycleTimer for SimulatedTsc {
    fn read(&self) -> u64 {
        CYCLES.with(Cell::get)
    }
}

fn one_cycle_loop(n: u64) {
    CYCLES.with(|c| c.set(c.get() + n));
}

fn four_cycle_loop(n: u64) {
    CYCLES.with(|c| c.set(c.get() + 4 * n));
}

fn fourteen_cycle_loop(n: u64) {
    CYCLES.with(|c| c.set(c.get() + 14 * n));
}

#[test]
fn add_within_tolerance_passes() {
    let mut registry = InstructionRegistry::new();
    registry.register("ADD", "ALU", 1.0, probe_fn(|_| 1.05)).unwrap();

    let results = evaluate(&registry, 1_000_000, 3, 50.0).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name(), "ADD");
    assert!(approx(results[0].measured_latency, 1.05));
    assert!(approx(results[0].deviation_pct, 5.0));
    assert!(results[0].passed);
}

#[test]
fn add_twice_as_slow_fails() {
    let mut registry = InstructionRegistry::new();
    registry.register("ADD", "ALU", 1.0, probe_fn(|_| 2.0)).unwrap();

    let results = evaluate(&registry, 1_000_000, 3, 50.0).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].measured_latency, 2.0);
    assert_eq!(results[0].deviation_pct, 100.0);
    assert!(!results[0].passed);
}

#[test]
fn invalid_counts_produce_no_results() {
    let mut registry = InstructionRegistry::new();
    registry.register("ADD", "ALU", 1.0, probe_fn(|_| 1.0)).unwrap();

    assert!(matches!(
        evaluate(&registry, 0, 3, 50.0),
        Err(LatencyError::InvalidIterations { value: 0 })
    ));
    assert!(matches!(
        evaluate(&registry, 1_000, 0, 50.0),
        Err(LatencyError::InvalidRuns { value: 0 })
    ));
}

#[test]
fn simulated_counter_yields_exact_cycles() {
    let mut registry = InstructionRegistry::new();
    registry
        .register("ADD", "ALU", 1.0, LoopProbe::with_timer(None, one_cycle_loop, SimulatedTsc))
        .unwrap();
    registry
        .register("MULSD", "SSE", 4.0, LoopProbe::with_timer(None, four_cycle_loop, SimulatedTsc))
        .unwrap();
    registry
        .register("DIVSD", "SSE", 14.0, LoopProbe::with_timer(None, fourteen_cycle_loop, SimulatedTsc))
        .unwrap();

    for runs in 1..=5 {
        let results = evaluate(&registry, 10_000, runs, 50.0).unwrap();
        let measured: Vec<f64> = results.iter().map(|r| r.measured_latency).collect();
        assert_eq!(measured, vec![1.0, 4.0, 14.0]);
        assert!(results.iter().all(|r| r.passed && r.deviation_pct == 0.0));
    }
}

#[test]
fn empty_registry_evaluates_to_nothing() {
    let registry = InstructionRegistry::new();
    assert!(evaluate(&registry, 10, 1, 50.0).unwrap().is_empty());
}

proptest! {
    #[test]
    fn results_follow_registration_order(names in proptest::sample::subsequence(
        vec!["NOP", "ADD", "SUB", "IMUL", "SHL", "DIVSS", "SQRTSD", "MOVSS"], 0..=8
    ).prop_shuffle()) {
        let mut registry = InstructionRegistry::new();
        for name in &names {
            registry.register(*name, "Test", 1.0, probe_fn(|_| 1.0)).unwrap();
        }

        let results = evaluate(&registry, 100, 2, 50.0).unwrap();
        let got: Vec<&str> = results.iter().map(|r| r.name()).collect();
        prop_assert_eq!(got, names);
    }

    #[test]
    fn measured_latency_is_never_negative(value in -100.0f64..100.0, runs in 1i32..6) {
        let mut registry = InstructionRegistry::new();
        registry.register("X", "Test", 1.0, probe_fn(move |_| value)).unwrap();

        let results = evaluate(&registry, 10, runs, 50.0).unwrap();
        prop_assert!(results[0].measured_latency >= 0.0);
    }

    #[test]
    fn deviation_ignores_sign_of_error(expected in 0.1f64..50.0, frac in 0.0f64..0.99) {
        let above = deviation_pct(expected * (1.0 + frac), expected);
        let below = deviation_pct(expected * (1.0 - frac), expected);
        prop_assert!((above - below).abs() < 1e-6);
        prop_assert!((above - frac * 100.0).abs() < 1e-6);
    }

    #[test]
    fn constant_probe_is_run_invariant(k in 1u32..64, runs in 1i32..10) {
        let k = f64::from(k);
        let mut registry = InstructionRegistry::new();
        registry.register("K", "Test", k, probe_fn(move |_| k)).unwrap();

        let results = evaluate(&registry, 1_000, runs, 50.0).unwrap();
        prop_assert_eq!(results[0].measured_latency, k);
        prop_assert!(results[0].passed);
    }
}
