// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation keys and per-message subkeys.
//!
//! Two parties share one long-term [`ConversationKey`], derived from an
//! X25519 exchange between one party's private key and the other's public
//! key; the derivation is symmetric, so both ends arrive at the same key.
//! Every encryption then stretches the conversation key and a fresh 32-byte
//! nonce into independent cipher and MAC subkeys, so no subkey is ever used
//! for two messages.

use selkie_core::{IdentityError, PrivateKey, PublicKey};
use zeroize::Zeroize;

use crate::crypto::{hkdf_expand, hkdf_extract, Secret};

/// Domain-separating salt for conversation-key derivation.
const CONVERSATION_KEY_SALT: &[u8] = b"selkie-v2";

/// Size of the per-message nonce in bytes.
pub const NONCE_SIZE: usize = 32;

/// Long-term symmetric key shared by exactly one pair of identity keys.
///
/// Never persisted; recomputed for each encrypt or decrypt call chain and
/// zeroized on drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationKey(Secret<32>);

impl ConversationKey {
    /// Derive the conversation key between `secret_key` and
    /// `their_public_key`.
    ///
    /// Satisfies `derive(a, B) == derive(b, A)` for any two key pairs
    /// `(a, A)` and `(b, B)`.
    pub fn derive(
        secret_key: &PrivateKey,
        their_public_key: &PublicKey,
    ) -> Result<Self, IdentityError> {
        let mut shared_secret = secret_key.shared_secret(their_public_key)?;
        let key = hkdf_extract(CONVERSATION_KEY_SALT, &shared_secret);
        shared_secret.zeroize();
        Ok(Self(Secret::from_bytes(key)))
    }

    /// Conversation key from raw bytes, for test vectors.
    #[cfg(any(test, feature = "test_utils"))]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Secret::from_bytes(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

/// Subkeys for a single message, derived from the conversation key and a
/// per-message nonce.
pub(crate) struct MessageKeys {
    cipher_key: Secret<32>,
    cipher_nonce: [u8; 12],
    mac_key: Secret<32>,
}

impl MessageKeys {
    /// Stretch the conversation key and nonce into the per-message subkeys.
    ///
    /// 76 bytes of HKDF output split as cipher key (32), cipher nonce (12)
    /// and MAC key (32).
    pub(crate) fn derive(conversation_key: &ConversationKey, nonce: &[u8; NONCE_SIZE]) -> Self {
        let mut out: [u8; 76] = hkdf_expand(conversation_key.as_bytes(), nonce);

        let mut cipher_key = [0u8; 32];
        cipher_key.copy_from_slice(&out[0..32]);
        let mut cipher_nonce = [0u8; 12];
        cipher_nonce.copy_from_slice(&out[32..44]);
        let mut mac_key = [0u8; 32];
        mac_key.copy_from_slice(&out[44..76]);
        out.zeroize();

        Self {
            cipher_key: Secret::from_bytes(cipher_key),
            cipher_nonce,
            mac_key: Secret::from_bytes(mac_key),
        }
    }

    pub(crate) fn cipher_key(&self) -> &[u8; 32] {
        self.cipher_key.as_bytes()
    }

    pub(crate) fn cipher_nonce(&self) -> &[u8; 12] {
        &self.cipher_nonce
    }

    pub(crate) fn mac_key(&self) -> &[u8; 32] {
        self.mac_key.as_bytes()
    }
}
