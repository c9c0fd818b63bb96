// SPDX-License-Identifier: MIT OR Apache-2.0

//! `selkie-encryption` implements the cryptographic core of Selkie's private
//! messaging: authenticated two-party encryption and the metadata-hiding
//! gift-wrap construction used to carry messages over public relays.
//!
//! ## Two-party encryption
//!
//! Each pair of identity keys shares one symmetric
//! [`ConversationKey`](keys::ConversationKey), derived from an X25519
//! exchange and reachable from either side. Message payloads are padded into
//! length buckets ([`padding`]), encrypted with per-message subkeys under a
//! ChaCha20 keystream, authenticated with HMAC-SHA256 and shipped as
//! versioned base64 envelopes ([`envelope`]). The envelope construction
//! deliberately assembles the AEAD from separate primitives: the MAC covers
//! the key-derivation nonce together with the ciphertext, and decryption
//! refuses to touch any payload whose MAC does not verify.
//!
//! ## Gift wrapping
//!
//! On top of the envelope sits a three-layer structure ([`wrap`]) that hides
//! everything except the recipient from the relay network: an unsigned chat
//! record, sealed and signed by the real sender, wrapped and signed again by
//! a single-use ephemeral key. Unwrapping ([`unwrap`]) is an ordered
//! verification chain that only trusts a claimed sender after the seal
//! signature has been checked and the inner record has been bound to the
//! same key.
//!
//! All operations are pure functions over their inputs; the crate holds no
//! caches and no long-lived key material. [`wrap::create_message`] is async
//! solely so ephemeral key generation can run off the caller's critical
//! path.

mod crypto;
pub mod envelope;
pub mod keys;
pub mod padding;
#[cfg(test)]
mod tests;
pub mod unwrap;
pub mod wrap;

pub use crypto::{Rng, RngError};
pub use envelope::{decrypt, encrypt, EnvelopeError};
pub use keys::ConversationKey;
pub use unwrap::{unwrap_message, UnwrapError};
pub use wrap::{create_message, generate_ephemeral_key, WrapError};
