//! Run-scoped random source.
//!
//! Every run owns one [`RunRng`]; nothing in the engine touches a global
//! generator. Run seeds are derived from the batch seed with HMAC-SHA256 so
//! runs stay distinct while the whole batch replays from one number.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::constants::RUN_SEED_DOMAIN;

/// Derive the seed for run `run_index` of a batch seeded with `base_seed`.
#[must_use]
pub fn derive_run_seed(base_seed: u64, run_index: u32) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&base_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(RUN_SEED_DOMAIN);
    mac.update(&run_index.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Batch seed: the caller's deterministic seed when non-zero, otherwise fresh
/// entropy.
#[must_use]
pub fn resolve_base_seed(deterministic_seed: u64) -> u64 {
    if deterministic_seed == 0 {
        rand::random::<u64>()
    } else {
        deterministic_seed
    }
}

/// Counting wrapper around the run's ChaCha stream.
#[derive(Debug, Clone)]
pub struct RunRng {
    rng: ChaCha20Rng,
    draws: u64,
}

impl RunRng {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Generator for run `run_index` of the batch seeded with `base_seed`.
    #[must_use]
    pub fn for_run(base_seed: u64, run_index: u32) -> Self {
        Self::from_seed(derive_run_seed(base_seed, run_index))
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl rand::RngCore for RunRng {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}
