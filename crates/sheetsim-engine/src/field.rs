//! Rank-indexed acceleration table.
//!
//! In one dimension the force on a sheet depends only on how many sheets
//! lie on either side of it. With unit total mass and `2πG = 1`, the sheet
//! in slot `s` (0-based, sorted by position) feels
//! `(N - 2(s+1) + 1) / N`. The table is fixed for the run; swapping two
//! sheets' slots is what reassigns their accelerations.

/// Per-slot acceleration for an `N`-sheet system.
#[derive(Clone, Debug, PartialEq)]
pub struct AccelerationField {
    table: Vec<f64>,
}

impl AccelerationField {
    /// Build the table for `particle_count` sheets.
    pub fn new(particle_count: usize) -> Self {
        let n = particle_count as f64;
        let table = (0..particle_count)
            .map(|slot| (n - 2.0 * (slot as f64 + 1.0) + 1.0) / n)
            .collect();
        Self { table }
    }

    /// Acceleration of `slot`.
    #[inline]
    pub fn at(&self, slot: usize) -> f64 {
        self.table[slot]
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The whole table in slot order.
    pub fn as_slice(&self) -> &[f64] {
        &self.table
    }
}
