//! Strongly-typed identifiers.

use std::fmt;

/// Stable identity of a sheet.
///
/// Assigned once at generation, never reused. Identifiers within one
/// ensemble are dense: `ParticleId(n)` for `n` in `0..N`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u32);

impl ParticleId {
    /// The identifier as a `usize` index into id-ordered storage.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ParticleId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing reporting interval counter.
///
/// `IntervalId(0)` is the initial configuration; each resynchronization
/// advances the counter by one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId(pub u64);

impl IntervalId {
    /// The following interval.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for IntervalId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
