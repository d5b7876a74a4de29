//! CPU feature detection (CPUID)
//!
//! Only what the measurement path depends on: a readable TSC, SSE/SSE2 for
//! the scalar floating-point kernels, and whether the TSC ticks at a
//! constant rate.

use raw_cpuid::CpuId;

use crate::arch::CpuFeatures;

/// Query CPUID once and collect the bits the engine cares about
pub fn detect() -> CpuFeatures {
    let cpuid = CpuId::new();

    let vendor = cpuid
        .get_vendor_info()
        .map(|v| String::from(v.as_str()))
        .unwrap_or_else(|| String::from("unknown"));
    let brand = cpuid
        .get_processor_brand_string()
        .map(|b| String::from(b.as_str().trim()));

    let (has_tsc, has_sse, has_sse2) = cpuid
        .get_feature_info()
        .map_or((false, false, false), |f| (f.has_tsc(), f.has_sse(), f.has_sse2()));

    let invariant_tsc = cpuid
        .get_advanced_power_mgmt_info()
        .map_or(false, |apm| apm.has_invariant_tsc());

    CpuFeatures {
        vendor,
        brand,
        has_tsc,
        has_sse,
        has_sse2,
        invariant_tsc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_on_x86_64_host() {
        let features = detect();
        // Tout CPU x86_64 expose TSC + SSE2 (baseline de l'ISA)
        assert!(features.has_tsc);
        assert!(features.has_sse2);
        assert!(!features.vendor.is_empty());
    }
}
