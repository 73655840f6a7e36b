//! Initial ensemble generation for sheetsim.
//!
//! A [`Generator`] samples sheets from a [`Distribution`], sorts them by
//! the configured [`ParticleOrder`](sheetsim_core::ParticleOrder), and
//! canonicalizes the result:
//!
//! 1. Shift to zero center of mass and zero center of momentum.
//! 2. Rybicki-scale positions and velocities so the total energy is
//!    exactly [`CANONICAL_ENERGY`](sheetsim_core::CANONICAL_ENERGY).
//!
//! Sampling is driven by a seeded ChaCha8 RNG, so identical generator
//! settings produce bit-identical ensembles.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod canonical;
pub mod distribution;
pub mod generator;

pub use canonical::{canonicalize, center, rybicki_normalize};
pub use distribution::Distribution;
pub use generator::{Ensemble, Generator, GeneratorBuilder};
