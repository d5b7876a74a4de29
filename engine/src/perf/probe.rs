//! # Sondes d'instruction
//!
//! Une sonde mesure une instruction sur une seule passe :
//! préparation → lecture TSC → boucle × N → lecture TSC → cycles / N.

use crate::error::{LatencyError, LatencyResult};
use crate::time::CycleTimer;
#[cfg(target_arch = "x86_64")]
use crate::time::Tsc;

/// Contrat commun à toutes les sondes
pub trait Probe {
    /// Cycles moyens par itération sur une passe de `iterations` itérations
    fn measure(&self, iterations: i64) -> LatencyResult<f64>;
}

/// Rejette `iterations <= 0` avant toute mesure
pub fn check_iterations(iterations: i64) -> LatencyResult<u64> {
    if iterations < 1 {
        return Err(LatencyError::InvalidIterations { value: iterations });
    }
    Ok(iterations as u64)
}

/// Sonde bâtie sur une boucle asm et un compteur de cycles
///
/// La boucle doit exécuter l'instruction exactement `n` fois et chaîner
/// chaque itération sur la précédente ; la sonde ne fait que l'encadrer.
pub struct LoopProbe<T> {
    setup: Option<fn()>,
    body: fn(u64),
    timer: T,
}

impl<T: CycleTimer> LoopProbe<T> {
    pub fn with_timer(setup: Option<fn()>, body: fn(u64), timer: T) -> Self {
        Self { setup, body, timer }
    }
}

#[cfg(target_arch = "x86_64")]
impl LoopProbe<Tsc> {
    pub fn new(setup: Option<fn()>, body: fn(u64)) -> Self {
        Self::with_timer(setup, body, Tsc)
    }

    pub fn from_kernel(kernel: crate::arch::x86_64::Kernel) -> Self {
        Self::new(kernel.setup, kernel.body)
    }
}

impl<T: CycleTimer> Probe for LoopProbe<T> {
    fn measure(&self, iterations: i64) -> LatencyResult<f64> {
        let n = check_iterations(iterations)?;

        if let Some(setup) = self.setup {
            setup();
        }

        let start = self.timer.read();
        (self.body)(n);
        let end = self.timer.read();

        Ok(end.saturating_sub(start) as f64 / n as f64)
    }
}

/// Sonde définie par une closure (stubs, instructions hors catalogue)
///
/// La garde sur `iterations` reste appliquée avant l'appel.
pub struct FnProbe<F>(F);

impl<F> Probe for FnProbe<F>
where
    F: Fn(i64) -> f64,
{
    fn measure(&self, iterations: i64) -> LatencyResult<f64> {
        check_iterations(iterations)?;
        Ok((self.0)(iterations))
    }
}

/// Enveloppe une closure dans une sonde
pub fn probe_fn<F>(f: F) -> FnProbe<F>
where
    F: Fn(i64) -> f64,
{
    FnProbe(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    thread_local! {
        static TICKS: Cell<u64> = Cell::new(0);
        static SETUP_CALLS: Cell<u64> = Cell::new(0);
    }

    /// Horloge simulée : avance uniquement quand la boucle « s'exécute »
    struct FakeTimer;

    impl CycleTimer for FakeTimer {
        fn read(&self) -> u64 {
            TICKS.with(Cell::get)
        }
    }

    fn three_cycles_per_iter(n: u64) {
        TICKS.with(|t| t.set(t.get() + 3 * n));
    }

    fn count_setup() {
        SETUP_CALLS.with(|c| c.set(c.get() + 1));
    }

    #[test]
    fn test_loop_probe_divides_by_iterations() {
        let probe = LoopProbe::with_timer(None, three_cycles_per_iter, FakeTimer);
        assert_eq!(probe.measure(1).unwrap(), 3.0);
        assert_eq!(probe.measure(1_000_000).unwrap(), 3.0);
    }

    #[test]
    fn test_setup_runs_outside_bracket() {
        fn costly_setup() {
            count_setup();
            TICKS.with(|t| t.set(t.get() + 1_000));
        }
        let probe = LoopProbe::with_timer(Some(costly_setup), three_cycles_per_iter, FakeTimer);
        assert_eq!(probe.measure(10).unwrap(), 3.0);
        assert_eq!(SETUP_CALLS.with(Cell::get), 1);
    }

    #[test]
    fn test_rejects_non_positive_iterations() {
        fn must_not_run(_: u64) {
            panic!("loop executed with invalid iteration count");
        }
        let probe = LoopProbe::with_timer(None, must_not_run, FakeTimer);
        assert_eq!(probe.measure(0), Err(LatencyError::InvalidIterations { value: 0 }));
        assert_eq!(probe.measure(-5), Err(LatencyError::InvalidIterations { value: -5 }));
    }

    #[test]
    fn test_fn_probe_guard() {
        let probe = probe_fn(|_| 1.05);
        assert_eq!(probe.measure(100).unwrap(), 1.05);
        assert!(probe.measure(0).is_err());
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_real_nop_probe_is_non_negative() {
        let kernel = crate::arch::x86_64::kernels::find("NOP").unwrap().kernel;
        let probe = LoopProbe::from_kernel(kernel);
        let cycles = probe.measure(10_000).unwrap();
        assert!(cycles >= 0.0);
        assert!(cycles.is_finite());
    }
}
