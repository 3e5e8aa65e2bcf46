//! A 32-byte secret preimage newtype, used for both the payee's
//! `spend_secret` and each commit's `revoke_secret`.
//!
//! The bytes are kept behind [`secrecy::Secret`] so they don't get casually
//! `Debug`-printed or logged, and are only exposed via
//! [`Secret32::expose_bytes`] at the points that actually need the preimage
//! (signing a redemption branch, revealing a revoke secret to the
//! counterparty).

use std::fmt;

use secrecy::{ExposeSecret, Secret};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::hex::{self, FromHex};
use crate::rng::Crng;

/// A 32-byte secret preimage (`spend_secret` or a single `revoke_secret`).
#[derive(Clone)]
pub struct Secret32(Secret<[u8; 32]>);

impl Secret32 {
    pub const LENGTH: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(Secret::new(bytes))
    }

    /// Draw a fresh secret from a cryptographic RNG.
    pub fn from_rng(rng: &mut impl Crng) -> Self {
        Self::new(crate::rng::random_secret_32(rng))
    }

    pub fn expose_bytes(&self) -> &[u8; 32] {
        self.0.expose_secret()
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::DecodeError> {
        <[u8; 32]>::from_hex(s).map(Self::new)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.expose_bytes())
    }
}

impl PartialEq for Secret32 {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}
impl Eq for Secret32 {}

impl fmt::Debug for Secret32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret32(..)")
    }
}

impl Serialize for Secret32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Secret32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}
