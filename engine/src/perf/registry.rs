//! Instruction registry
//!
//! Ordered, append-only list of instructions under test. Built once at
//! startup and handed to the runner by reference.

use core::fmt;

use crate::config::validate_expected;
use crate::error::LatencyResult;
use crate::perf::probe::Probe;

/// One instruction under test
pub struct InstructionDescriptor {
    name: String,
    category: String,
    expected_latency: f64,
    probe: Box<dyn Probe>,
}

impl InstructionDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Reference cycles per iteration (always > 0)
    pub fn expected_latency(&self) -> f64 {
        self.expected_latency
    }

    pub fn probe(&self) -> &dyn Probe {
        self.probe.as_ref()
    }
}

impl fmt::Debug for InstructionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("expected_latency", &self.expected_latency)
            .finish_non_exhaustive()
    }
}

/// Registry of instructions, in registration order
#[derive(Debug, Default)]
pub struct InstructionRegistry {
    entries: Vec<InstructionDescriptor>,
}

impl InstructionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction
    ///
    /// A non-positive or non-finite expected latency is rejected. A
    /// duplicate name is accepted but logged, since it makes the report
    /// ambiguous.
    pub fn register<P>(
        &mut self,
        name: impl Into<String>,
        category: impl Into<String>,
        expected_latency: f64,
        probe: P,
    ) -> LatencyResult<()>
    where
        P: Probe + 'static,
    {
        let name = name.into();
        validate_expected(&name, expected_latency)?;

        if self.entries.iter().any(|d| d.name == name) {
            log::warn!("instruction {} registered twice; report rows will be ambiguous", name);
        }

        self.entries.push(InstructionDescriptor {
            name,
            category: category.into(),
            expected_latency,
            probe: Box::new(probe),
        });
        Ok(())
    }

    /// All descriptors, in registration order
    pub fn all(&self) -> &[InstructionDescriptor] {
        &self.entries
    }

    pub fn iter(&self) -> core::slice::Iter<'_, InstructionDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a InstructionRegistry {
    type Item = &'a InstructionDescriptor;
    type IntoIter = core::slice::Iter<'a, InstructionDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
