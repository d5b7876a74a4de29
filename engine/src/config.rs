//! Run configuration and reference data
//!
//! Everything the caller chooses before a measurement starts: loop sizes,
//! tolerance, how runs are aggregated, which catalog rows to register and
//! which reference latencies to override.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{LatencyError, LatencyResult};

/// Iterations per probe run (matches the historical CLI default)
pub const DEFAULT_ITERATIONS: i64 = 1_000_000;

/// Probe runs averaged per instruction
pub const DEFAULT_RUNS: i32 = 3;

/// Allowed deviation in percent (factor-of-1.5 band)
pub const DEFAULT_TOLERANCE_PCT: f64 = 50.0;

/// How per-run measurements are folded into one latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// Arithmetic mean of all runs
    #[default]
    Mean,
    /// Best (lowest) run; discards runs disturbed by preemption
    Min,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Mean => "mean",
            Aggregation::Min => "min",
        }
    }

    /// Fold non-empty `samples` into one value
    pub fn apply(&self, samples: &[f64]) -> f64 {
        debug_assert!(!samples.is_empty(), "aggregating zero runs");
        match self {
            Aggregation::Mean => samples.iter().sum::<f64>() / samples.len() as f64,
            Aggregation::Min => samples.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

/// Parameters of one evaluation pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    pub iterations: i64,
    pub runs: i32,
    pub tolerance_pct: f64,
    pub aggregation: Aggregation,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            runs: DEFAULT_RUNS,
            tolerance_pct: DEFAULT_TOLERANCE_PCT,
            aggregation: Aggregation::Mean,
        }
    }
}

impl RunConfig {
    pub fn new(iterations: i64, runs: i32, tolerance_pct: f64) -> Self {
        Self {
            iterations,
            runs,
            tolerance_pct,
            aggregation: Aggregation::Mean,
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Reject invalid loop sizes and tolerances before anything is measured
    pub fn validate(&self) -> LatencyResult<()> {
        if self.runs < 1 {
            return Err(LatencyError::InvalidRuns { value: self.runs });
        }
        if self.iterations < 1 {
            return Err(LatencyError::InvalidIterations { value: self.iterations });
        }
        if !self.tolerance_pct.is_finite() || self.tolerance_pct <= 0.0 {
            return Err(LatencyError::InvalidTolerance { value: self.tolerance_pct });
        }
        Ok(())
    }
}

/// Checks a reference latency; shared by registration and overrides
pub fn validate_expected(name: &str, value: f64) -> LatencyResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LatencyError::InvalidExpectedLatency {
            name: String::from(name),
            value,
        })
    }
}

/// One `NAME=CYCLES` override
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceOverride {
    pub name: String,
    pub cycles: f64,
}

impl FromStr for ReferenceOverride {
    type Err = LatencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| LatencyError::InvalidReference {
            input: String::from(s),
            reason,
        };

        let (name, cycles) = s.split_once('=').ok_or_else(|| invalid("missing '='"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("empty instruction name"));
        }
        let cycles: f64 = cycles
            .trim()
            .parse()
            .map_err(|_| invalid("cycles is not a number"))?;

        let name = name.to_ascii_uppercase();
        validate_expected(&name, cycles)?;
        Ok(Self { name, cycles })
    }
}

/// Expected-latency overrides keyed by upper-case instruction name
///
/// The built-in constants describe one microarchitecture generation; this
/// table lets a run swap in values for the host under test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    overrides: BTreeMap<String, f64>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries for the same name replace earlier ones
    pub fn from_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = ReferenceOverride>,
    {
        let mut table = Self::new();
        for o in overrides {
            table.overrides.insert(o.name, o.cycles);
        }
        table
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.overrides.get(&name.to_ascii_uppercase()).copied()
    }

    /// Expected latency for `name`, falling back to `default`
    pub fn resolve(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.overrides.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Subset of the catalog to register, by instruction name or category
///
/// An empty selection keeps every row. Matching ignores ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    patterns: Vec<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, name: &str, category: &str) -> bool {
        self.is_all()
            || self
                .patterns
                .iter()
                .any(|p| p.eq_ignore_ascii_case(name) || p.eq_ignore_ascii_case(category))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
