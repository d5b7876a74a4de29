//! # Noyaux d'instructions x86-64
//!
//! Chaque noyau est une boucle écrite intégralement en `asm!` :
//!
//! ```text
//! 2:  <instruction>
//!     dec  n
//!     jnz  2b
//! ```
//!
//! Le compilateur ne voit qu'un bloc asm à effets de bord : la boucle ne
//! peut être ni supprimée, ni déroulée, ni vectorisée, ni sortie d'une
//! boucle englobante. Les formes registre-sur-lui-même (`add eax, eax`,
//! `divsd xmm0, xmm0`) chaînent chaque itération sur la précédente, ce qui
//! mesure la latence et non le débit.
//!
//! `rbx` est réservé par LLVM : MOV copie donc `eax` vers `ecx`.

use core::arch::asm;

/// Boucle mesurée, appelée avec `n >= 1`
pub type LoopBody = fn(u64);

/// Préparation d'état exécutée avant la première lecture TSC
pub type Setup = fn();

/// Valeur MXCSR au reset : exceptions masquées, arrondi au plus proche, pas de FTZ/DAZ
pub const MXCSR_DEFAULT: u32 = 0x1F80;

/// Boucle sur registres généraux (`eax` amorcé à 1, `ecx` libre)
macro_rules! gpr_loop {
    ($insn:literal) => {
        |n: u64| unsafe {
            asm!(
                "2:",
                $insn,
                "dec {n}",
                "jnz 2b",
                n = inout(reg) n => _,
                inout("eax") 1u32 => _,
                out("ecx") _,
                options(nostack, nomem),
            )
        }
    };
}

/// Boucle SSE scalaire (`xmm0` amorcé avec `$seed`, `xmm1` et `eax` libres)
macro_rules! sse_loop {
    ($insn:literal, $seed:expr) => {
        |n: u64| unsafe {
            asm!(
                "2:",
                $insn,
                "dec {n}",
                "jnz 2b",
                n = inout(reg) n => _,
                inout("xmm0") $seed => _,
                out("xmm1") _,
                inout("eax") 1u32 => _,
                options(nostack, nomem),
            )
        }
    };
}

/// Remet MXCSR dans son état de reset
///
/// Un bit FTZ/DAZ ou une exception démasquée laissés par le processus
/// fausseraient les latences SSE.
pub fn reset_mxcsr() {
    let mxcsr: u32 = MXCSR_DEFAULT;
    unsafe {
        asm!(
            "ldmxcsr [{}]",
            in(reg) &mxcsr as *const u32,
            options(nostack, readonly, preserves_flags),
        );
    }
}

/// Lit MXCSR
pub fn read_mxcsr() -> u32 {
    let mut mxcsr: u32 = 0;
    unsafe {
        asm!(
            "stmxcsr [{}]",
            in(reg) &mut mxcsr as *mut u32,
            options(nostack, preserves_flags),
        );
    }
    mxcsr
}

/// Boucle d'une instruction + préparation éventuelle
#[derive(Clone, Copy)]
pub struct Kernel {
    pub setup: Option<Setup>,
    pub body: LoopBody,
}

impl Kernel {
    pub const fn gpr(body: LoopBody) -> Self {
        Self { setup: None, body }
    }

    pub const fn sse(body: LoopBody) -> Self {
        Self { setup: Some(reset_mxcsr as Setup), body }
    }
}

impl core::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Kernel")
            .field("setup", &self.setup.is_some())
            .finish_non_exhaustive()
    }
}

/// Ligne du catalogue intégré
#[derive(Debug, Clone, Copy)]
pub struct KernelSpec {
    pub name: &'static str,
    pub category: &'static str,
    pub expected: f64,
    pub kernel: Kernel,
}

const fn row(name: &'static str, category: &'static str, expected: f64, kernel: Kernel) -> KernelSpec {
    KernelSpec { name, category, expected, kernel }
}

/// Catalogue intégré, dans l'ordre d'affichage
///
/// Les latences attendues viennent d'une génération de cœurs donnée ;
/// elles se surchargent par `ReferenceTable`.
pub static BUILTIN_KERNELS: &[KernelSpec] = &[
    // Entier
    row("NOP",  "Basic", 1.0, Kernel::gpr(gpr_loop!("nop"))),
    row("ADD",  "ALU",   1.0, Kernel::gpr(gpr_loop!("add eax, eax"))),
    row("SUB",  "ALU",   1.0, Kernel::gpr(gpr_loop!("sub eax, eax"))),
    row("XOR",  "Logic", 1.0, Kernel::gpr(gpr_loop!("xor eax, eax"))),
    row("AND",  "Logic", 1.0, Kernel::gpr(gpr_loop!("and eax, eax"))),
    row("OR",   "Logic", 1.0, Kernel::gpr(gpr_loop!("or eax, eax"))),
    row("NOT",  "Logic", 1.0, Kernel::gpr(gpr_loop!("not eax"))),
    row("IMUL", "Mul",   3.0, Kernel::gpr(gpr_loop!("imul eax, eax"))),
    row("SHL",  "Shift", 1.0, Kernel::gpr(gpr_loop!("shl eax, 1"))),
    row("SHR",  "Shift", 1.0, Kernel::gpr(gpr_loop!("shr eax, 1"))),
    row("MOV",  "Move",  1.0, Kernel::gpr(gpr_loop!("mov ecx, eax"))),
    row("CMP",  "Cmp",   1.0, Kernel::gpr(gpr_loop!("cmp eax, eax"))),
    row("TEST", "Cmp",   1.0, Kernel::gpr(gpr_loop!("test eax, eax"))),
    // SSE scalaire 32 bits
    row("ADDSS",  "SSE", 3.0,  Kernel::sse(sse_loop!("addss xmm0, xmm0", 1.0f32))),
    row("MULSS",  "SSE", 4.0,  Kernel::sse(sse_loop!("mulss xmm0, xmm0", 1.0f32))),
    row("DIVSS",  "SSE", 14.0, Kernel::sse(sse_loop!("divss xmm0, xmm0", 1.0f32))),
    row("SQRTSS", "SSE", 14.0, Kernel::sse(sse_loop!("sqrtss xmm0, xmm0", 1.0f32))),
    // SSE scalaire 64 bits
    row("ADDSD",  "SSE", 3.0,  Kernel::sse(sse_loop!("addsd xmm0, xmm0", 1.0f64))),
    row("MULSD",  "SSE", 4.0,  Kernel::sse(sse_loop!("mulsd xmm0, xmm0", 1.0f64))),
    row("DIVSD",  "SSE", 14.0, Kernel::sse(sse_loop!("divsd xmm0, xmm0", 1.0f64))),
    row("SQRTSD", "SSE", 14.0, Kernel::sse(sse_loop!("sqrtsd xmm0, xmm0", 1.0f64))),
    // Conversion
    row("CVTSI2SS", "Conv", 4.0, Kernel::sse(sse_loop!("cvtsi2ss xmm0, eax", 1.0f32))),
    row("CVTSS2SI", "Conv", 4.0, Kernel::sse(sse_loop!("cvtss2si eax, xmm0", 1.0f32))),
    // Move
    row("MOVSS", "SSE", 1.0, Kernel::sse(sse_loop!("movss xmm1, xmm0", 1.0f32))),
    row("MOVSD", "SSE", 1.0, Kernel::sse(sse_loop!("movsd xmm1, xmm0", 1.0f64))),
];

/// Cherche une ligne par nom (insensible à la casse)
pub fn find(name: &str) -> Option<&'static KernelSpec> {
    BUILTIN_KERNELS.iter().find(|k| k.name.eq_ignore_ascii_case(name))
}
