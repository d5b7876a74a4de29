//! x86-64 support: CPUID checks and instruction kernels

pub mod cpu;
pub mod kernels;

pub use kernels::{Kernel, KernelSpec, BUILTIN_KERNELS};
