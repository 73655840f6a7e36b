//! Per-pair event bookkeeping.
//!
//! Pair `i` joins slots `i` and `i+1`. Its absolute event time within the
//! current epoch is `base[i] + next[i]`, where `base[i]` is the later of
//! the two sheets' local times when the pair was last solved. Sheets
//! carry independent local times between resynchronizations; only the
//! two sheets of a collision are advanced.

use smallvec::SmallVec;

/// Pair event times and per-slot local times for one epoch.
#[derive(Clone, Debug, PartialEq)]
pub struct EventSchedule {
    next: Vec<f64>,
    base: Vec<f64>,
    particle_time: Vec<f64>,
}

impl EventSchedule {
    /// Empty schedule for `particle_count` sheets; every pair starts at
    /// `+∞` until solved.
    pub fn new(particle_count: usize) -> Self {
        let pairs = particle_count.saturating_sub(1);
        Self {
            next: vec![f64::INFINITY; pairs],
            base: vec![0.0; pairs],
            particle_time: vec![0.0; particle_count],
        }
    }

    /// Number of adjacent pairs.
    #[inline]
    pub fn pair_count(&self) -> usize {
        self.next.len()
    }

    /// Absolute event time of `pair` within the epoch.
    #[inline]
    pub fn event_time(&self, pair: usize) -> f64 {
        self.base[pair] + self.next[pair]
    }

    /// Earliest pair event as `(pair, time)`, or `None` if no pair will
    /// ever cross.
    ///
    /// Ties go to the lowest pair index.
    pub fn next_event(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for pair in 0..self.pair_count() {
            let t = self.event_time(pair);
            if !t.is_finite() {
                continue;
            }
            match best {
                Some((_, bt)) if t >= bt => {}
                _ => best = Some((pair, t)),
            }
        }
        best
    }

    /// Local time of the sheet in `slot`.
    #[inline]
    pub fn particle_time(&self, slot: usize) -> f64 {
        self.particle_time[slot]
    }

    /// Record that the sheet in `slot` has been advanced to `time`.
    #[inline]
    pub fn set_particle_time(&mut self, slot: usize, time: f64) {
        self.particle_time[slot] = time;
    }

    /// Common base for re-solving `pair` and each side's offset from it.
    pub fn pair_frame(&self, pair: usize) -> (f64, f64, f64) {
        let tl = self.particle_time[pair];
        let tr = self.particle_time[pair + 1];
        let base = tl.max(tr);
        (base, (base - tl).abs(), (base - tr).abs())
    }

    /// Store a freshly solved event for `pair`.
    #[inline]
    pub fn set_pair(&mut self, pair: usize, base: f64, next: f64) {
        self.base[pair] = base;
        self.next[pair] = next;
    }

    /// Start a new epoch `interval` after the current one.
    ///
    /// Pending events keep their absolute time, shifted into the new
    /// epoch's frame; every local time returns to zero.
    pub fn rebase(&mut self, interval: f64) {
        for (next, base) in self.next.iter_mut().zip(self.base.iter_mut()) {
            *next = *next + *base - interval;
            *base = 0.0;
        }
        self.particle_time.fill(0.0);
    }
}

/// Pairs whose cached events are stale after `pair` swaps its sheets:
/// the pair itself and its immediate neighbors.
pub fn invalidated_pairs(pair: usize, pair_count: usize) -> SmallVec<[usize; 3]> {
    let mut pairs = SmallVec::new();
    if pair > 0 {
        pairs.push(pair - 1);
    }
    pairs.push(pair);
    if pair + 1 < pair_count {
        pairs.push(pair + 1);
    }
    pairs
}
