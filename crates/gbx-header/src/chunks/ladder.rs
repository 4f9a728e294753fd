//! Version ladders.
//!
//! Most chunks add fields in later versions. A decoder lists its fields as
//! ordered [`Step`]s, each guarded by a [`Gate`] on the chunk version, and
//! [`run_steps`] walks the list.

use super::ChunkReader;
use crate::Result;

/// Version predicate guarding a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    Always,
    AtLeast(u32),
    Below(u32),
    Exactly(u32),
    /// Inclusive on both ends.
    Within(u32, u32),
}

impl Gate {
    pub(crate) const fn admits(self, version: u32) -> bool {
        match self {
            Gate::Always => true,
            Gate::AtLeast(min) => version >= min,
            Gate::Below(max) => version < max,
            Gate::Exactly(v) => version == v,
            Gate::Within(min, max) => version >= min && version <= max,
        }
    }
}

pub(crate) type StepFn<T> = fn(&mut ChunkReader<'_, '_>, &mut T) -> Result<()>;

/// One gated group of field reads.
pub(crate) struct Step<T> {
    gate: Gate,
    read: StepFn<T>,
}

impl<T> Step<T> {
    pub(crate) const fn new(gate: Gate, read: StepFn<T>) -> Self {
        Self { gate, read }
    }
}

/// Run `steps` in order against `version`.
///
/// Steps whose gate rejects the version are skipped. The ladder ends early,
/// without error, once the chunk has no bytes left.
pub(crate) fn run_steps<T>(
    r: &mut ChunkReader<'_, '_>,
    version: u32,
    out: &mut T,
    steps: &[Step<T>],
) -> Result<()> {
    for step in steps {
        if r.is_exhausted() {
            break;
        }
        if step.gate.admits(version) {
            (step.read)(r, out)?;
        }
    }
    Ok(())
}
