//! Benchmark workloads for the scree tuple store.
//!
//! Provides deterministic index and payload generators shared by the
//! criterion benches, seeded so runs are reproducible.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::prelude::*;
use rand::rngs::ChaCha8Rng;

/// The indices `0..n` in a deterministically shuffled order.
pub fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    indices
}

/// `n` deterministic pseudo-tuple payloads.
pub fn tuple_values(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.random()).collect()
}
