//! Latency Engine
//!
//! Measures the steady-state latency of individual x86-64 instructions:
//! each instruction runs in a dependency-chained asm loop bracketed by two
//! TSC reads, runs are aggregated, and the result is checked against a
//! reference latency within a tolerance.
//!
//! ```no_run
//! use latency_engine::{builtin_registry, check_capabilities, BenchmarkRunner, ReferenceTable, RunConfig, Selection};
//!
//! check_capabilities()?;
//! let registry = builtin_registry(&Selection::all(), &ReferenceTable::new())?;
//! let runner = BenchmarkRunner::new(RunConfig::default())?;
//! for r in runner.evaluate(&registry)? {
//!     println!("{} {:.2} {}", r.name(), r.measured_latency, if r.passed { "PASS" } else { "FAIL" });
//! }
//! # Ok::<(), latency_engine::LatencyError>(())
//! ```

pub mod arch;
pub mod config;
pub mod error;
pub mod perf;
pub mod time;

pub use arch::{check_capabilities, CpuFeatures};
pub use config::{
    Aggregation, ReferenceOverride, ReferenceTable, RunConfig, Selection, DEFAULT_ITERATIONS, DEFAULT_RUNS,
    DEFAULT_TOLERANCE_PCT,
};
pub use error::{LatencyError, LatencyResult};
pub use perf::{
    builtin_registry, deviation_pct, evaluate, probe_fn, BenchmarkRunner, CatalogEntry, FnProbe, InstructionDescriptor,
    InstructionRegistry, LoopProbe, MeasurementResult, Probe, Summary,
};
pub use time::{CycleTimer, Tsc};
