//! # Runner de benchmark
//!
//! Parcourt le registre, exécute chaque sonde `runs` fois, agrège les
//! passes et compare le résultat à la latence attendue.

use crate::config::{Aggregation, RunConfig};
use crate::error::LatencyResult;
use crate::perf::registry::{InstructionDescriptor, InstructionRegistry};

/// Écart relatif en pourcentage : `|measured - expected| / expected * 100`
pub fn deviation_pct(measured: f64, expected: f64) -> f64 {
    (measured - expected).abs() / expected * 100.0
}

/// Résultat d'une instruction pour une évaluation
#[derive(Debug, Clone)]
pub struct MeasurementResult<'a> {
    pub descriptor: &'a InstructionDescriptor,
    /// Latence agrégée (cycles / itération), jamais négative
    pub measured_latency: f64,
    pub deviation_pct: f64,
    pub passed: bool,
    /// Mesures brutes, une par passe, dans l'ordre d'exécution
    pub samples: Vec<f64>,
}

impl MeasurementResult<'_> {
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn category(&self) -> &str {
        self.descriptor.category()
    }

    pub fn expected_latency(&self) -> f64 {
        self.descriptor.expected_latency()
    }

    pub fn min_sample(&self) -> f64 {
        self.samples.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_sample(&self) -> f64 {
        self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Bilan global d'une évaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub passed: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_results(results: &[MeasurementResult<'_>]) -> Self {
        Self {
            passed: results.iter().filter(|r| r.passed).count(),
            total: results.len(),
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    /// Pourcentage de réussite (0 si aucune instruction)
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.passed as f64 / self.total as f64 * 100.0
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Runner lié à une configuration validée
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkRunner {
    config: RunConfig,
}

impl BenchmarkRunner {
    /// Valide la configuration ; rien n'est mesuré si elle est invalide
    pub fn new(config: RunConfig) -> LatencyResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Évalue tout le registre, dans l'ordre d'enregistrement
    pub fn evaluate<'a>(&self, registry: &'a InstructionRegistry) -> LatencyResult<Vec<MeasurementResult<'a>>> {
        log::info!(
            "evaluating {} instructions: iterations={} runs={} tolerance={}% aggregation={}",
            registry.len(),
            self.config.iterations,
            self.config.runs,
            self.config.tolerance_pct,
            self.config.aggregation.as_str()
        );

        let mut results = Vec::with_capacity(registry.len());
        for descriptor in registry {
            results.push(self.evaluate_one(descriptor)?);
        }
        Ok(results)
    }

    /// Mesure une instruction : `runs` passes puis verdict
    pub fn evaluate_one<'a>(&self, descriptor: &'a InstructionDescriptor) -> LatencyResult<MeasurementResult<'a>> {
        let runs = self.config.runs as usize;
        let mut samples = Vec::with_capacity(runs);

        for run in 0..runs {
            let cycles = descriptor.probe().measure(self.config.iterations)?;
            log::debug!("{} run {}/{}: {:.3} cycles/iter", descriptor.name(), run + 1, runs, cycles);
            samples.push(cycles);
        }

        let measured_latency = self.config.aggregation.apply(&samples).max(0.0);
        let expected = descriptor.expected_latency();
        let deviation = deviation_pct(measured_latency, expected);
        let passed = deviation <= self.config.tolerance_pct;

        Ok(MeasurementResult {
            descriptor,
            measured_latency,
            deviation_pct: deviation,
            passed,
            samples,
        })
    }
}

/// Évaluation avec moyenne simple des passes
///
/// Rejette `iterations < 1`, `runs < 1` ou une tolérance invalide avant de
/// toucher la moindre sonde.
pub fn evaluate<'a>(
    registry: &'a InstructionRegistry,
    iterations: i64,
    runs: i32,
    tolerance_pct: f64,
) -> LatencyResult<Vec<MeasurementResult<'a>>> {
    let config = RunConfig::new(iterations, runs, tolerance_pct).with_aggregation(Aggregation::Mean);
    BenchmarkRunner::new(config)?.evaluate(registry)
}
