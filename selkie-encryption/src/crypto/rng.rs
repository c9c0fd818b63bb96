// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Mutex;

use rand_chacha::rand_core::{SeedableRng, TryRngCore};
use thiserror::Error;

/// Cryptographically-secure random number generator that uses the ChaCha
/// algorithm, seeded from the operating system.
///
/// The generator is internally locked so one instance can be shared across
/// the concurrently-built message wrappers.
#[derive(Debug)]
pub struct Rng {
    rng: Mutex<rand_chacha::ChaCha20Rng>,
}

impl Default for Rng {
    fn default() -> Self {
        Self {
            rng: Mutex::new(rand_chacha::ChaCha20Rng::from_os_rng()),
        }
    }
}

#[cfg(any(test, feature = "test_utils"))]
impl Rng {
    /// Deterministic generator for reproducible test vectors.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: Mutex::new(rand_chacha::ChaCha20Rng::from_seed(seed)),
        }
    }
}

impl Rng {
    /// Fill a fixed-size array with random bytes.
    pub fn random_array<const N: usize>(&self) -> Result<[u8; N], RngError> {
        let mut rng = self.rng.lock().map_err(|_| RngError::LockPoisoned)?;
        let mut out = [0u8; N];
        rng.try_fill_bytes(&mut out)
            .map_err(|_| RngError::NotEnoughRandomness)?;
        Ok(out)
    }

    /// Draw a uniformly random `u64`.
    pub fn random_u64(&self) -> Result<u64, RngError> {
        let out: [u8; 8] = self.random_array()?;
        Ok(u64::from_be_bytes(out))
    }
}

#[derive(Debug, Error)]
pub enum RngError {
    #[error("rng lock is poisoned")]
    LockPoisoned,

    #[error("unable to collect enough randomness")]
    NotEnoughRandomness,
}

#[cfg(test)]
mod tests {
    use super::Rng;

    #[test]
    fn deterministic_randomness() {
        let sample_1 = {
            let rng = Rng::from_seed([1; 32]);
            rng.random_array::<64>().unwrap()
        };

        let sample_2 = {
            let rng = Rng::from_seed([1; 32]);
            rng.random_array::<64>().unwrap()
        };

        assert_eq!(sample_1, sample_2);
    }

    #[test]
    fn consecutive_draws_differ() {
        let rng = Rng::default();
        let a: [u8; 32] = rng.random_array().unwrap();
        let b: [u8; 32] = rng.random_array().unwrap();
        assert_ne!(a, b);
    }
}
