//! Latency Engine Error Handling
//!
//! Typed errors for configuration and platform checks. Measurement itself
//! never fails once these preconditions hold.

use core::fmt;

/// Engine error types with detailed context
#[derive(Debug, Clone, PartialEq)]
pub enum LatencyError {
    // ═══════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════

    /// Iteration count must be at least 1
    InvalidIterations { value: i64 },

    /// Run count must be at least 1
    InvalidRuns { value: i32 },

    /// Tolerance must be a finite, strictly positive percentage
    InvalidTolerance { value: f64 },

    /// Expected latency must be finite and strictly positive
    InvalidExpectedLatency { name: String, value: f64 },

    /// Reference override not of the form `NAME=CYCLES`
    InvalidReference { input: String, reason: &'static str },

    /// Reference override or selection names an instruction that is not in the catalog
    UnknownInstruction { name: String },

    // ═══════════════════════════════════════════════════════════════
    // Platform Capability Errors
    // ═══════════════════════════════════════════════════════════════

    /// CPUID reports no time-stamp counter
    CycleCounterUnavailable,

    /// A CPU feature required by the instruction kernels is missing
    MissingCpuFeature { feature: &'static str },

    /// The host is not x86-64
    UnsupportedArch { arch: &'static str },
}

impl fmt::Display for LatencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIterations { value } => {
                write!(f, "Invalid iteration count {} (must be >= 1)", value)
            }
            Self::InvalidRuns { value } => {
                write!(f, "Invalid run count {} (must be >= 1)", value)
            }
            Self::InvalidTolerance { value } => {
                write!(f, "Invalid tolerance {}% (must be > 0)", value)
            }
            Self::InvalidExpectedLatency { name, value } => {
                write!(f, "Instruction {}: expected latency {} must be > 0", name, value)
            }
            Self::InvalidReference { input, reason } => {
                write!(f, "Invalid reference override '{}': {}", input, reason)
            }
            Self::UnknownInstruction { name } => {
                write!(f, "Unknown instruction or category '{}'", name)
            }
            Self::CycleCounterUnavailable => {
                write!(f, "Time-stamp counter not available on this CPU")
            }
            Self::MissingCpuFeature { feature } => {
                write!(f, "Required CPU feature {} not available", feature)
            }
            Self::UnsupportedArch { arch } => {
                write!(f, "Unsupported architecture {} (x86_64 required)", arch)
            }
        }
    }
}

impl std::error::Error for LatencyError {}

impl LatencyError {
    /// Configuration errors are caused by caller input, not by the host
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::CycleCounterUnavailable
                | Self::MissingCpuFeature { .. }
                | Self::UnsupportedArch { .. }
        )
    }

    /// Get recovery hint for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::InvalidIterations { .. } => "Pass a positive iteration count",
            Self::InvalidRuns { .. } => "Pass a positive run count",
            Self::InvalidTolerance { .. } => "Pass a tolerance such as 50 (percent)",
            Self::InvalidExpectedLatency { .. } => "Reference latencies are cycles and must be positive",
            Self::InvalidReference { .. } => "Use NAME=CYCLES, e.g. IMUL=3",
            Self::UnknownInstruction { .. } => "Run with --list to see the catalog",
            Self::CycleCounterUnavailable
            | Self::MissingCpuFeature { .. }
            | Self::UnsupportedArch { .. } => "Run on an x86-64 host with TSC and SSE2",
        }
    }
}

/// Result type for engine operations
pub type LatencyResult<T> = Result<T, LatencyError>;
