// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned encrypted payloads.
//!
//! An envelope is the base64 encoding of `version ‖ nonce ‖ ciphertext ‖ mac`
//! where the ciphertext is the padded plaintext under a ChaCha20 keystream
//! and the MAC is HMAC-SHA256 over nonce and ciphertext. The nonce is
//! authenticated but not encrypted: it is the derivation input for the
//! per-message subkeys, so covering it by the MAC binds ciphertext and key
//! schedule together.
//!
//! Decryption verifies the MAC before touching the ciphertext. A payload
//! that fails authentication is rejected without a single cipher operation,
//! so the decryption path cannot be used as an oracle over ciphertext
//! contents.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::crypto::{apply_keystream, hmac_sha256, hmac_verify, Rng, RngError};
use crate::keys::{ConversationKey, MessageKeys, NONCE_SIZE};
use crate::padding::{pad, unpad, PaddingError};

/// The one payload version this implementation produces and accepts.
const VERSION: u8 = 2;

/// Size of the HMAC-SHA256 tag in bytes.
const MAC_SIZE: usize = 32;

/// Decoded payload length bounds: version byte, nonce, MAC and a ciphertext
/// between one minimal padded block (2 + 32) and the largest padded block
/// (2 + 65536).
const MIN_PAYLOAD_LEN: usize = 1 + NONCE_SIZE + 2 + 32 + MAC_SIZE;
const MAX_PAYLOAD_LEN: usize = 1 + NONCE_SIZE + 2 + 65536 + MAC_SIZE;

/// Encoded payload length bounds, the base64 expansion of the decoded
/// bounds.
const MIN_ENCODED_LEN: usize = 132;
const MAX_ENCODED_LEN: usize = 87472;

/// Encrypt a plaintext under the conversation key with a freshly drawn
/// 32-byte nonce.
pub fn encrypt(
    plaintext: &str,
    conversation_key: &ConversationKey,
    rng: &Rng,
) -> Result<String, EnvelopeError> {
    let nonce: [u8; NONCE_SIZE] = rng.random_array()?;
    encrypt_with_nonce(plaintext, conversation_key, &nonce)
}

/// Encrypt a plaintext under the conversation key and an explicit nonce.
///
/// Exists for deterministic test vectors; production callers use
/// [`encrypt`] so every message draws a fresh nonce from the CSPRNG.
pub fn encrypt_with_nonce(
    plaintext: &str,
    conversation_key: &ConversationKey,
    nonce: &[u8; NONCE_SIZE],
) -> Result<String, EnvelopeError> {
    let message_keys = MessageKeys::derive(conversation_key, nonce);

    let mut ciphertext = pad(plaintext)?;
    apply_keystream(
        message_keys.cipher_key(),
        message_keys.cipher_nonce(),
        &mut ciphertext,
    );
    let mac = hmac_sha256(message_keys.mac_key(), &[nonce, &ciphertext]);

    let mut payload = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len() + MAC_SIZE);
    payload.push(VERSION);
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(&ciphertext);
    payload.extend_from_slice(&mac);
    Ok(BASE64.encode(payload))
}

/// Decrypt an envelope payload under the conversation key.
///
/// Authentication comes first: the MAC is recomputed over the embedded nonce
/// and ciphertext and compared in constant time, and only a matching payload
/// is decrypted and unpadded.
pub fn decrypt(
    payload: &str,
    conversation_key: &ConversationKey,
) -> Result<String, EnvelopeError> {
    let (nonce, mut ciphertext, mac) = decode_payload(payload)?;
    let message_keys = MessageKeys::derive(conversation_key, &nonce);

    if !hmac_verify(message_keys.mac_key(), &[&nonce, &ciphertext], &mac) {
        return Err(EnvelopeError::MacMismatch);
    }

    apply_keystream(
        message_keys.cipher_key(),
        message_keys.cipher_nonce(),
        &mut ciphertext,
    );
    Ok(unpad(&ciphertext)?)
}

/// Split a base64 payload into nonce, ciphertext and MAC.
fn decode_payload(
    payload: &str,
) -> Result<([u8; NONCE_SIZE], Vec<u8>, [u8; MAC_SIZE]), EnvelopeError> {
    // A leading `#` marks payload formats this version does not understand.
    if payload.starts_with('#') {
        return Err(EnvelopeError::ReservedPrefix);
    }
    if !(MIN_ENCODED_LEN..=MAX_ENCODED_LEN).contains(&payload.len()) {
        return Err(EnvelopeError::InvalidEncodedLength(payload.len()));
    }

    let decoded = BASE64.decode(payload)?;
    if !(MIN_PAYLOAD_LEN..=MAX_PAYLOAD_LEN).contains(&decoded.len()) {
        return Err(EnvelopeError::InvalidPayloadLength(decoded.len()));
    }

    let version = decoded[0];
    if version != VERSION {
        return Err(EnvelopeError::UnknownVersion(version));
    }

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&decoded[1..1 + NONCE_SIZE]);

    let mac_offset = decoded.len() - MAC_SIZE;
    let ciphertext = decoded[1 + NONCE_SIZE..mac_offset].to_vec();

    let mut mac = [0u8; MAC_SIZE];
    mac.copy_from_slice(&decoded[mac_offset..]);

    Ok((nonce, ciphertext, mac))
}

/// Error types for envelope encryption and decoding.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// Payload uses a reserved future format.
    #[error("payload format is reserved for future versions")]
    ReservedPrefix,

    /// Encoded payload length is out of bounds.
    #[error("invalid encoded payload length {0}")]
    InvalidEncodedLength(usize),

    /// Payload is not valid base64.
    #[error("invalid base64 encoding in payload")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Decoded payload length is out of bounds.
    #[error("invalid payload length {0}")]
    InvalidPayloadLength(usize),

    /// Payload version is not supported.
    #[error("unknown payload version {0}")]
    UnknownVersion(u8),

    /// Authentication tag does not match the payload.
    #[error("payload authentication failed")]
    MacMismatch,

    /// Plaintext padding is inconsistent.
    #[error(transparent)]
    Padding(#[from] PaddingError),

    /// Randomness for the message nonce could not be drawn.
    #[error(transparent)]
    Rng(#[from] RngError),
}
