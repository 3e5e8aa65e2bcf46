//! Utilities for encoding, decoding, and displaying hex-formatted data.
//!
//! Every byte string in a [`crate::ChannelState`]-like record (scripts, raw
//! transactions, secrets) is kept as owned bytes at rest; hex is only used at
//! the serde boundary, via [`encode`]/[`FromHex`].

use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors which can be produced while decoding a hex string.
#[derive(Copy, Clone, Debug, Error, Serialize, Deserialize)]
pub enum DecodeError {
    #[error("hex decode error: output buffer length != half input length")]
    BadOutputLength,

    #[error("hex decode error: input contains non-hex character")]
    InvalidCharacter,

    #[error("hex decode error: input string length must be even")]
    OddInputLength,
}

/// Convert a byte slice to an owned hex string.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = vec![0u8; bytes.len() * 2];

    for (src, dst) in bytes.iter().zip(out.chunks_exact_mut(2)) {
        dst[0] = encode_nibble(src >> 4);
        dst[1] = encode_nibble(src & 0x0f);
    }

    // SAFETY: hex characters ([0-9a-f]*) are always valid UTF-8.
    unsafe { String::from_utf8_unchecked(out) }
}

/// Try to decode a hex string to owned bytes (`Vec<u8>`).
pub fn decode(hex: &str) -> Result<Vec<u8>, DecodeError> {
    let bytes = hex.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddInputLength);
    }
    let mut out = vec![0u8; bytes.len() / 2];
    decode_to_slice_inner(bytes, &mut out)?;
    Ok(out)
}

/// Decodes a hex string into an output buffer.
pub fn decode_to_slice(hex: &str, out: &mut [u8]) -> Result<(), DecodeError> {
    let bytes = hex.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddInputLength);
    }
    decode_to_slice_inner(bytes, out)
}

/// Get a [`HexDisplay`] which provides `Debug`/`Display` for a byte slice
/// without allocating.
#[inline]
pub fn display(bytes: &[u8]) -> HexDisplay<'_> {
    HexDisplay(bytes)
}

/// A trait to deserialize something from a hex-encoded string slice.
pub trait FromHex: Sized {
    fn from_hex(s: &str) -> Result<Self, DecodeError>;
}

impl FromHex for Vec<u8> {
    fn from_hex(s: &str) -> Result<Self, DecodeError> {
        decode(s)
    }
}

impl FromHex for Cow<'_, [u8]> {
    fn from_hex(s: &str) -> Result<Self, DecodeError> {
        decode(s).map(Cow::Owned)
    }
}

impl<const N: usize> FromHex for [u8; N] {
    fn from_hex(s: &str) -> Result<Self, DecodeError> {
        let mut out = [0u8; N];
        decode_to_slice(s, out.as_mut_slice())?;
        Ok(out)
    }
}

/// Provides `Debug`/`Display` impls for a byte slice without allocating.
pub struct HexDisplay<'a>(&'a [u8]);

impl fmt::Display for HexDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            use fmt::Write;
            f.write_char(encode_nibble(byte >> 4) as char)?;
            f.write_char(encode_nibble(byte & 0x0f) as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HexDisplay<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

fn decode_to_slice_inner(
    hex_bytes: &[u8],
    out: &mut [u8],
) -> Result<(), DecodeError> {
    if hex_bytes.len() / 2 != out.len() {
        return Err(DecodeError::BadOutputLength);
    }

    for (chunk, out_i) in hex_bytes.chunks_exact(2).zip(out) {
        let b_hi = decode_nibble(chunk[0])?;
        let b_lo = decode_nibble(chunk[1])?;
        *out_i = (b_hi << 4) | b_lo;
    }

    Ok(())
}

#[inline(always)]
const fn encode_nibble(nib: u8) -> u8 {
    let mut hex = nib as i16 + (b'0' as i16);
    hex += (((b'9' as i16) - hex) >> 8) & ((b'a' as i16) - 0x3a);
    hex as u8
}

#[inline]
const fn decode_nibble(x: u8) -> Result<u8, DecodeError> {
    match x {
        b'0'..=b'9' => Ok(x - b'0'),
        b'a'..=b'f' => Ok(x - b'a' + 10),
        b'A'..=b'F' => Ok(x - b'A' + 10),
        _ => Err(DecodeError::InvalidCharacter),
    }
}
