// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unwrapping received gift wraps.
//!
//! [`unwrap_message`] reverses the construction in [`crate::wrap`] as an
//! ordered chain of checks, each of which short-circuits to a failure. The
//! order is load-bearing:
//!
//! 1. The outer layer decrypts against the wrap's ephemeral signer key,
//!    which proves nothing about identity.
//! 2. The seal's signature is the single point where the claimed sender
//!    becomes trustworthy. Without it, anyone could seal arbitrary content
//!    under any claimed key.
//! 3. The rumor was never signed and is attacker-controlled plaintext until
//!    its author field is bound to the verified seal key. A rumor naming a
//!    different author than the seal signer is a forgery attempt.
//!
//! Callers surface every failure identically ("not a message for me") so
//! the distinctions below never become an oracle for an adversary probing
//! crafted wraps; the variants exist for local diagnostics only.

use selkie_core::{decode_json, Kind, PrivateKey, Record};
use thiserror::Error;
use tracing::debug;

use crate::envelope;
use crate::keys::ConversationKey;

/// Unwrap a received gift wrap into the rumor it carries.
///
/// On success the returned record is a chat message whose author field has
/// been cryptographically bound to the key that signed the seal. If the
/// rumor arrived without an id it is recomputed here for display and
/// reference purposes; the id plays no part in any trust decision.
pub fn unwrap_message(wrap: &Record, recipient: &PrivateKey) -> Result<Record, UnwrapError> {
    unwrap_inner(wrap, recipient).map_err(|err| {
        // One generic line for all causes; the distinction stays local.
        debug!("discarding wrap that failed verification");
        err
    })
}

fn unwrap_inner(wrap: &Record, recipient: &PrivateKey) -> Result<Record, UnwrapError> {
    if wrap.kind != Kind::GiftWrap {
        return Err(UnwrapError::NotGiftWrap);
    }

    // Outer layer: decrypt against the untrusted ephemeral signer key.
    let wrap_key = ConversationKey::derive(recipient, &wrap.author)
        .map_err(|_| UnwrapError::DecryptionFailed)?;
    let seal_json =
        envelope::decrypt(&wrap.content, &wrap_key).map_err(|_| UnwrapError::DecryptionFailed)?;

    let seal: Record = decode_json(&seal_json).map_err(|_| UnwrapError::InvalidSeal)?;
    if seal.kind != Kind::Seal {
        return Err(UnwrapError::InvalidSeal);
    }

    // The seal signature establishes the sender identity. Everything before
    // this point is unauthenticated.
    if !seal.verify() {
        return Err(UnwrapError::SignatureInvalid);
    }
    let sender = seal.author;

    // Inner layer: decrypt against the now-trusted sender key.
    let seal_key = ConversationKey::derive(recipient, &sender)
        .map_err(|_| UnwrapError::DecryptionFailed)?;
    let rumor_json =
        envelope::decrypt(&seal.content, &seal_key).map_err(|_| UnwrapError::DecryptionFailed)?;

    let mut rumor: Record = decode_json(&rumor_json).map_err(|_| UnwrapError::InvalidMessage)?;

    // Rumors are unsigned and may omit their id; recompute it for display
    // only. The binding check below never looks at it.
    if rumor.id.is_none() {
        rumor.id = Some(rumor.compute_id());
    }

    // Bind the unsigned rumor to the verified seal signer.
    if rumor.author != sender {
        return Err(UnwrapError::SenderMismatch);
    }
    if rumor.kind != Kind::PrivateMessage {
        return Err(UnwrapError::NotPrivateMessage);
    }

    Ok(rumor)
}

/// Error types for unwrapping gift wraps.
///
/// A failed unwrap is a permanent verdict for that input; there is no retry.
#[derive(Error, Debug)]
pub enum UnwrapError {
    /// Record is not a gift wrap.
    #[error("record is not a gift wrap")]
    NotGiftWrap,

    /// One of the two envelope layers did not decrypt for this key.
    #[error("payload did not decrypt")]
    DecryptionFailed,

    /// Decrypted outer layer does not contain a seal.
    #[error("wrap does not contain a valid seal")]
    InvalidSeal,

    /// Seal signature does not match its claimed sender.
    #[error("seal signature verification failed")]
    SignatureInvalid,

    /// Decrypted seal does not contain a message.
    #[error("seal does not contain a valid message")]
    InvalidMessage,

    /// Message claims a different author than the seal signer.
    #[error("message author does not match seal signer")]
    SenderMismatch,

    /// Carried record is not a chat message.
    #[error("carried record is not a chat message")]
    NotPrivateMessage,
}
