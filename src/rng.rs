// src/rng.rs
//! Random Number Generation for Brownian Sampling
//!
//! # Design
//!
//! Brownian increments are drawn path by path, possibly on several threads.
//! To keep a seeded run reproducible regardless of the thread count, every
//! batch draws one batch seed from the run's master generator and every path
//! gets its own `StdRng` derived from `(batch_seed, path_id)`.
//!
//! ```text
//! master ──► batch_seed ──► StdRng(batch_seed + path_id) ──► Z ~ N(0,1)
//! ```
//!
//! Without an explicit seed the master generator is taken from OS entropy
//! and runs are not reproducible.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Per-path RNG factory for one sampled batch
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Draw a fresh batch seed from a master generator
    pub fn from_master<R: RngCore + ?Sized>(master: &mut R) -> Self {
        Self::new(master.next_u64())
    }

    /// Create a standard RNG for a specific path
    pub fn create_std_rng(&self, path_id: u64) -> StdRng {
        // splitmix-style scramble so neighbouring batch seeds do not share paths
        let mut z = self.base_seed.wrapping_add(path_id.wrapping_mul(0x9e3779b97f4a7c15));
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        StdRng::seed_from_u64(z ^ (z >> 31))
    }
}

/// Master generator for a run: seeded when `seed` is set, entropy otherwise
pub fn master_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => seed_rng_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Uniform draw on `[low, high)`, or `low` when the interval is degenerate
pub fn get_uniform_draw<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}
