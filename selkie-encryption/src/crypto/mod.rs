// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level cryptographic building blocks: randomness, secret containers,
//! HKDF and the stream-cipher/MAC pair the envelope construction is
//! assembled from.

mod cipher;
mod hkdf;
mod rng;
mod secret;

pub(crate) use cipher::{apply_keystream, hmac_sha256, hmac_verify};
pub(crate) use hkdf::{hkdf_expand, hkdf_extract};
pub use rng::{Rng, RngError};
pub(crate) use secret::Secret;
