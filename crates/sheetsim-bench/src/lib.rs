//! Benchmark profiles for the sheetsim event loop.
//!
//! - [`reference_profile`]: 1 000 sheets, one characteristic time
//! - [`stress_profile`]: 10 000 sheets, a tenth of a characteristic time
//! - [`quiet_sink`]: diagnostics sink that drops everything

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::fmt;
use std::sync::Arc;

use sheetsim_core::{DiagnosticsSink, Level};
use sheetsim_engine::SimConfig;
use sheetsim_gen::Distribution;

/// 1 000-sheet virialized waterbag over one characteristic time.
pub fn reference_profile(seed: u64) -> SimConfig {
    let mut config = SimConfig::new(1_000, 1.0, 1.0, Distribution::waterbag());
    config.seed = seed;
    config
}

/// 10 000-sheet cold waterbag over a tenth of a characteristic time.
pub fn stress_profile(seed: u64) -> SimConfig {
    let mut config = SimConfig::new(10_000, 0.1, 0.5, Distribution::waterbag());
    config.seed = seed;
    config
}

struct Quiet;

impl DiagnosticsSink for Quiet {
    fn record(&self, _level: Level, _message: fmt::Arguments<'_>) {}
}

/// A sink that discards every message, keeping formatting out of timings.
pub fn quiet_sink() -> Arc<dyn DiagnosticsSink> {
    Arc::new(Quiet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        assert!(reference_profile(42).validate().is_ok());
        assert!(stress_profile(42).validate().is_ok());
    }
}
