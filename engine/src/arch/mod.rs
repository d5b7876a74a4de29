//! Architecture layer
//!
//! Platform capability checks run once at startup; a host that cannot
//! supply a cycle counter never reaches the measurement loop.

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

use crate::error::{LatencyError, LatencyResult};

/// CPU identity and the capability bits the engine depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuFeatures {
    pub vendor: String,
    pub brand: Option<String>,
    pub has_tsc: bool,
    pub has_sse: bool,
    pub has_sse2: bool,
    /// TSC ticks at a constant rate across P-states
    pub invariant_tsc: bool,
}

impl CpuFeatures {
    /// Fail on anything the probes cannot run without
    pub fn require_measurement_support(&self) -> LatencyResult<()> {
        if !self.has_tsc {
            return Err(LatencyError::CycleCounterUnavailable);
        }
        if !self.has_sse {
            return Err(LatencyError::MissingCpuFeature { feature: "SSE" });
        }
        if !self.has_sse2 {
            return Err(LatencyError::MissingCpuFeature { feature: "SSE2" });
        }
        Ok(())
    }
}

/// Detect CPU features and verify the host can be measured
#[cfg(target_arch = "x86_64")]
pub fn check_capabilities() -> LatencyResult<CpuFeatures> {
    let features = x86_64::cpu::features::detect();
    log::info!(
        "CPU: {} ({})",
        features.brand.as_deref().unwrap_or("unknown model"),
        features.vendor
    );

    features.require_measurement_support()?;

    if !features.invariant_tsc {
        log::warn!("TSC is not invariant; readings may drift with frequency changes");
    }
    Ok(features)
}

#[cfg(not(target_arch = "x86_64"))]
pub fn check_capabilities() -> LatencyResult<CpuFeatures> {
    Err(LatencyError::UnsupportedArch {
        arch: std::env::consts::ARCH,
    })
}
