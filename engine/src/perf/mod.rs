//! # Module de mesure de latence
//!
//! Sondes, registre d'instructions, catalogue intégré et runner.

pub mod catalog;
pub mod probe;
pub mod registry;
pub mod runner;

// Re-exports
pub use catalog::{builtin_registry, CatalogEntry};
pub use probe::{probe_fn, FnProbe, LoopProbe, Probe};
pub use registry::{InstructionDescriptor, InstructionRegistry};
pub use runner::{deviation_pct, evaluate, BenchmarkRunner, MeasurementResult, Summary};
