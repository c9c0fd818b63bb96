// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic length bucketing applied before encryption.
//!
//! Ciphertext length is the one thing encryption cannot hide, so plaintexts
//! are padded up to a small set of bucket sizes: everything up to 32 bytes
//! shares one bucket, and above that bucket granularity is an eighth of the
//! next power of two. An observer learns only the bucket, not the length.
//!
//! All functions are pure.

use thiserror::Error;

/// Smallest accepted plaintext length in bytes.
pub const MIN_PLAINTEXT_LEN: usize = 1;

/// Largest accepted plaintext length in bytes, bounded by the two-byte
/// length prefix.
pub const MAX_PLAINTEXT_LEN: usize = 65535;

/// Size of the big-endian length prefix.
pub(crate) const PREFIX_LEN: usize = 2;

/// The padded size bucket for a plaintext of `len` bytes, excluding the
/// length prefix.
pub fn padded_len(len: usize) -> Result<usize, PaddingError> {
    if !(MIN_PLAINTEXT_LEN..=MAX_PLAINTEXT_LEN).contains(&len) {
        return Err(PaddingError::InvalidLength(len));
    }
    if len <= 32 {
        return Ok(32);
    }

    // Smallest power of two strictly greater than len - 1.
    let next_pow = 1usize << (usize::BITS - (len - 1).leading_zeros());
    let chunk = if next_pow <= 256 { 32 } else { next_pow / 8 };
    Ok(chunk * ((len - 1) / chunk + 1))
}

/// Prefix the UTF-8 bytes of `plaintext` with their big-endian length and
/// zero-fill up to the padded bucket size.
pub fn pad(plaintext: &str) -> Result<Vec<u8>, PaddingError> {
    let bytes = plaintext.as_bytes();
    let padded = padded_len(bytes.len())?;

    let mut out = vec![0u8; PREFIX_LEN + padded];
    out[..PREFIX_LEN].copy_from_slice(&(bytes.len() as u16).to_be_bytes());
    out[PREFIX_LEN..PREFIX_LEN + bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

/// Recover the plaintext from a padded buffer.
///
/// The buffer length has to match the bucket the length prefix implies and
/// the sliced bytes have to be valid UTF-8; anything else is treated as a
/// forged or corrupted padding block.
pub fn unpad(padded: &[u8]) -> Result<String, PaddingError> {
    if padded.len() < PREFIX_LEN {
        return Err(PaddingError::Invalid);
    }

    let unpadded_len = u16::from_be_bytes([padded[0], padded[1]]) as usize;
    let expected_len = PREFIX_LEN + padded_len(unpadded_len).map_err(|_| PaddingError::Invalid)?;
    if padded.len() != expected_len {
        return Err(PaddingError::Invalid);
    }

    let bytes = padded[PREFIX_LEN..PREFIX_LEN + unpadded_len].to_vec();
    String::from_utf8(bytes).map_err(|_| PaddingError::Invalid)
}

/// Error types for the padding scheme.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PaddingError {
    /// Plaintext length is outside the supported range.
    #[error("invalid plaintext length {0} bytes")]
    InvalidLength(usize),

    /// Padded buffer is inconsistent with its length prefix.
    #[error("invalid padding")]
    Invalid,
}
