//! Random number generation utilities.

use std::num::NonZeroU32;

use rand_core::le::read_u32_into;
pub use rand_core::{CryptoRng, RngCore};
use ring::rand::SecureRandom;

const RAND_ERROR_CODE: NonZeroU32 =
    NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap();

/// A succinct trait alias for a cryptographically secure PRNG.
///
/// Callers drawing fresh 32-byte spend/revoke secrets (see
/// [`crate::secret::Secret32::from_rng`]) take an `impl Crng` rather than a
/// concrete RNG type.
pub trait Crng: RngCore + CryptoRng {}

impl<R: RngCore + CryptoRng> Crng for R {}

/// A compatibility wrapper so we can use `ring`'s PRG with `rand` traits.
#[derive(Clone, Debug, Default)]
pub struct SysRng(ring::rand::SystemRandom);

impl SysRng {
    pub fn new() -> Self {
        Self(ring::rand::SystemRandom::new())
    }
}

/// [`ring::rand::SystemRandom`] is a cryptographically secure PRG.
impl CryptoRng for SysRng {}

impl RngCore for SysRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        let mut out = [0u32; 1];
        read_u32_into(&buf, &mut out);
        out[0]
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.try_fill_bytes(dest).expect("ring SystemRandom failed")
    }

    fn try_fill_bytes(
        &mut self,
        dest: &mut [u8],
    ) -> Result<(), rand_core::Error> {
        self.0
            .fill(dest)
            .map_err(|_| rand_core::Error::from(RAND_ERROR_CODE))
    }
}

/// Draw a fresh 32-byte secret from the given [`Crng`].
///
/// Used for both the payee's `spend_secret` (one per channel) and each
/// commit's `revoke_secret` (one per commit).
pub fn random_secret_32(rng: &mut impl Crng) -> [u8; 32] {
    let mut secret = [0u8; 32];
    rng.fill_bytes(&mut secret);
    secret
}
