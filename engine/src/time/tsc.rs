//! TSC (Time Stamp Counter) support
//!
//! Provides the cycle counter that brackets every probe run

#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{_mm_lfence, _rdtsc};

/// Source of cycle counts
///
/// `read` has no error path: availability is checked once at startup
/// (see [`crate::arch::check_capabilities`]).
pub trait CycleTimer {
    fn read(&self) -> u64;
}

/// Hardware time-stamp counter
#[derive(Debug, Clone, Copy, Default)]
pub struct Tsc;

#[cfg(target_arch = "x86_64")]
impl Tsc {
    /// Read current TSC value
    #[inline(always)]
    pub fn read() -> u64 {
        unsafe { _rdtsc() }
    }

    /// Read TSC after all earlier instructions have completed locally
    ///
    /// `lfence` keeps the tail of the measured loop from retiring after the
    /// counter is sampled, and keeps the loop from starting before it.
    #[inline(always)]
    pub fn read_serialized() -> u64 {
        unsafe {
            _mm_lfence();
            let tsc = _rdtsc();
            _mm_lfence();
            tsc
        }
    }

    /// Benchmark a closure and return elapsed cycles
    pub fn benchmark<F, R>(f: F) -> (R, u64)
    where
        F: FnOnce() -> R,
    {
        let start = Self::read_serialized();
        let result = f();
        let end = Self::read_serialized();
        (result, end.saturating_sub(start))
    }
}

#[cfg(target_arch = "x86_64")]
impl CycleTimer for Tsc {
    #[inline(always)]
    fn read(&self) -> u64 {
        Tsc::read_serialized()
    }
}

/// Read TSC (shorthand)
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn read_tsc() -> u64 {
    Tsc::read()
}
