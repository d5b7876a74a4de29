//! Built-in instruction catalog
//!
//! Turns the static kernel table into a registry, applying the caller's
//! selection and reference overrides.

use crate::config::{ReferenceTable, Selection};
use crate::error::{LatencyError, LatencyResult};
use crate::perf::registry::InstructionRegistry;

/// Catalog row as shown by `--list`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub category: &'static str,
    pub expected: f64,
}

/// Every built-in instruction with its default reference latency
#[cfg(target_arch = "x86_64")]
pub fn entries() -> Vec<CatalogEntry> {
    crate::arch::x86_64::BUILTIN_KERNELS
        .iter()
        .map(|k| CatalogEntry {
            name: k.name,
            category: k.category,
            expected: k.expected,
        })
        .collect()
}

#[cfg(not(target_arch = "x86_64"))]
pub fn entries() -> Vec<CatalogEntry> {
    Vec::new()
}

/// Ensure every selection pattern and override names something in `entries`
pub fn check_names(entries: &[CatalogEntry], selection: &Selection, references: &ReferenceTable) -> LatencyResult<()> {
    for pattern in selection.patterns() {
        let known = entries
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(pattern) || e.category.eq_ignore_ascii_case(pattern));
        if !known {
            return Err(LatencyError::UnknownInstruction { name: pattern.clone() });
        }
    }
    for name in references.names() {
        if !entries.iter().any(|e| e.name.eq_ignore_ascii_case(name)) {
            return Err(LatencyError::UnknownInstruction { name: String::from(name) });
        }
    }
    Ok(())
}

/// Overrides naming a row that `selection` leaves out of the registry
pub fn unselected_overrides<'r>(
    entries: &[CatalogEntry],
    selection: &Selection,
    references: &'r ReferenceTable,
) -> Vec<&'r str> {
    references
        .names()
        .filter(|name| {
            !entries
                .iter()
                .any(|e| e.name.eq_ignore_ascii_case(name) && selection.matches(e.name, e.category))
        })
        .collect()
}

/// Registry of the built-in catalog, timed with the TSC
#[cfg(target_arch = "x86_64")]
pub fn builtin_registry(selection: &Selection, references: &ReferenceTable) -> LatencyResult<InstructionRegistry> {
    use crate::arch::x86_64::BUILTIN_KERNELS;
    use crate::perf::probe::LoopProbe;

    let catalog = entries();
    check_names(&catalog, selection, references)?;
    for name in unselected_overrides(&catalog, selection, references) {
        log::warn!("{}: expected latency override ignored, instruction not selected", name);
    }

    let mut registry = InstructionRegistry::new();
    for entry in BUILTIN_KERNELS {
        if !selection.matches(entry.name, entry.category) {
            continue;
        }
        let expected = references.resolve(entry.name, entry.expected);
        if expected != entry.expected {
            log::info!("{}: expected latency {} (default {})", entry.name, expected, entry.expected);
        }
        registry.register(entry.name, entry.category, expected, LoopProbe::from_kernel(entry.kernel))?;
    }
    Ok(registry)
}

#[cfg(not(target_arch = "x86_64"))]
pub fn builtin_registry(_selection: &Selection, _references: &ReferenceTable) -> LatencyResult<InstructionRegistry> {
    Err(LatencyError::UnsupportedArch {
        arch: std::env::consts::ARCH,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry { name: "ADD", category: "ALU", expected: 1.0 },
            CatalogEntry { name: "DIVSD", category: "SSE", expected: 14.0 },
        ]
    }

    #[test]
    fn test_check_names_accepts_names_and_categories() {
        let sel = Selection::of(["add", "sse"]);
        let refs = ReferenceTable::from_overrides(vec!["DIVSD=13".parse().unwrap()]);
        assert!(check_names(&sample(), &sel, &refs).is_ok());
    }

    #[test]
    fn test_check_names_rejects_unknown() {
        let sel = Selection::of(["FMUL"]);
        assert_eq!(
            check_names(&sample(), &sel, &ReferenceTable::new()),
            Err(LatencyError::UnknownInstruction { name: String::from("FMUL") })
        );

        // Une catégorie n'est pas un nom d'instruction valide pour une surcharge
        let refs = ReferenceTable::from_overrides(vec!["SSE=3".parse().unwrap()]);
        assert!(check_names(&sample(), &Selection::all(), &refs).is_err());
    }

    #[test]
    fn test_unselected_overrides() {
        let refs = ReferenceTable::from_overrides(vec!["DIVSD=13".parse().unwrap(), "add=2".parse().unwrap()]);

        let only_alu = Selection::of(["ALU"]);
        assert_eq!(unselected_overrides(&sample(), &only_alu, &refs), vec!["DIVSD"]);
        assert!(unselected_overrides(&sample(), &Selection::all(), &refs).is_empty());
        assert!(unselected_overrides(&sample(), &Selection::of(["divsd", "add"]), &refs).is_empty());
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_builtin_registry_full() {
        let registry = builtin_registry(&Selection::all(), &ReferenceTable::new()).unwrap();
        assert_eq!(registry.len(), 25);
        assert_eq!(registry.all()[7].name(), "IMUL");
        assert_eq!(registry.all()[7].expected_latency(), 3.0);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_builtin_registry_selection_and_override() {
        let sel = Selection::of(["Shift", "imul"]);
        let refs = ReferenceTable::from_overrides(vec!["IMUL=4".parse().unwrap()]);
        let registry = builtin_registry(&sel, &refs).unwrap();

        let rows: Vec<(&str, f64)> = registry.iter().map(|d| (d.name(), d.expected_latency())).collect();
        assert_eq!(rows, vec![("IMUL", 4.0), ("SHL", 1.0), ("SHR", 1.0)]);
    }
}
