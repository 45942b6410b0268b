//! Deterministic corpora shared by the integration tests and benchmarks.

use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub const TEST_SEED: u64 = 0x00C0_FFEE;

lazy_static! {
    /// Uniformly random bytes, the incompressible worst case.
    pub static ref RANDOM_BYTES: Vec<u8> = {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(TEST_SEED);
        (0..4096).map(|_| rng.gen()).collect()
    };

    /// Heavily skewed bytes: long runs of zeros with occasional small
    /// values, the shape run-length and equality coding thrive on.
    pub static ref SKEWED_BYTES: Vec<u8> = {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(TEST_SEED);
        (0..4096)
            .map(|_| {
                if rng.gen_ratio(9, 10) {
                    0
                } else {
                    rng.gen_range(1..8)
                }
            })
            .collect()
    };

    /// A short motif repeated with sporadic corruption, the shape match
    /// coding thrives on.
    pub static ref REPETITIVE_BYTES: Vec<u8> = {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(TEST_SEED);
        let motif = b"GATTACAGATTACAT";
        (0..4096)
            .map(|i| {
                if rng.gen_ratio(1, 50) {
                    rng.gen()
                } else {
                    motif[i % motif.len()]
                }
            })
            .collect()
    };

    /// Sorted 32-bit positions as little-endian words; non-decreasing, so
    /// diff coding applies.
    pub static ref MONOTONIC_U32_BYTES: Vec<u8> = {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(TEST_SEED);
        let mut position = 0_u32;
        (0..1024)
            .flat_map(|_| {
                position += rng.gen_range(0..300);
                position.to_le_bytes()
            })
            .collect()
    };
}
