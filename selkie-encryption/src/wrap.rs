// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building gift-wrapped private messages.
//!
//! A message leaves the sender as three nested records. The innermost
//! ("rumor") carries the chat content and the sender's real key but no
//! signature. It is encrypted to the target and carried by a seal, signed by
//! the sender, which in turn is encrypted to the target under a single-use
//! ephemeral key and carried by the gift wrap the relay network sees. The
//! wrap's signer is the throwaway ephemeral key and its recipient tag is the
//! only cleartext routing information, so relays learn who should receive a
//! message but not who sent it or when it was really written.
//!
//! [`create_message`] produces two wraps: one encrypted towards the
//! recipient and one towards the sender's own key, so the sender's other
//! devices can recover their outgoing history from the same relays. Both
//! wraps carry the byte-identical rumor, but every outer layer — nonces,
//! seal and wrap timestamps, ephemeral keys — is drawn independently;
//! nothing observable links the two copies.
//!
//! Construction is fail-closed: any error aborts the whole call and no
//! partial wrap is ever returned.

use std::time::{SystemTime, UNIX_EPOCH};

use selkie_core::{
    encode_json, EncodeError, Hash, IdentityError, Kind, PrivateKey, PublicKey, Record, Tag,
};
use thiserror::Error;
use tracing::trace;

use crate::crypto::{Rng, RngError};
use crate::envelope::{self, EnvelopeError};
use crate::keys::ConversationKey;

/// Seal and gift-wrap timestamps are backdated by a uniformly random offset
/// of up to two days, so observed relay timestamps cannot be correlated with
/// actual send times.
const TIMESTAMP_WINDOW_SECS: u64 = 2 * 24 * 60 * 60;

/// Build the two gift wraps for one private message: the recipient's copy
/// and the sender's own recovery copy.
///
/// The rumor inside both wraps carries the sender's real key, the true
/// current timestamp, the recipient tag and the optional reply reference.
/// The two wraps are built concurrently; ephemeral key generation runs on
/// the blocking thread pool so message composition is never stalled by curve
/// arithmetic.
pub async fn create_message(
    content: &str,
    sender: &PrivateKey,
    recipient: &PublicKey,
    reply_to: Option<Hash>,
    rng: &Rng,
) -> Result<(Record, Record), WrapError> {
    let mut tags = vec![Tag::Recipient(*recipient)];
    if let Some(parent) = reply_to {
        tags.push(Tag::Reply(parent));
    }

    let rumor = Record::new(
        sender.public_key(),
        unix_time()?,
        Kind::PrivateMessage,
        tags,
        content.to_string(),
    );

    let sender_public = sender.public_key();
    let (recipient_wrap, sender_wrap) = tokio::try_join!(
        wrap_rumor(&rumor, sender, recipient, rng),
        wrap_rumor(&rumor, sender, &sender_public, rng),
    )?;

    trace!("built gift wraps for private message");
    Ok((recipient_wrap, sender_wrap))
}

/// Seal and gift-wrap a rumor towards one target key.
pub(crate) async fn wrap_rumor(
    rumor: &Record,
    sender: &PrivateKey,
    target: &PublicKey,
    rng: &Rng,
) -> Result<Record, WrapError> {
    // Inner layer: the rumor, readable only by sender and target.
    let conversation_key = ConversationKey::derive(sender, target)?;
    let sealed_content = envelope::encrypt(&encode_json(rumor)?, &conversation_key, rng)?;

    let mut seal = Record {
        id: None,
        author: sender.public_key(),
        timestamp: randomized_timestamp(rng)?,
        kind: Kind::Seal,
        tags: Vec::new(),
        content: sealed_content,
        signature: None,
    };
    seal.sign(sender);

    // Outer layer: the seal, encrypted and signed under a key that exists
    // only for this one wrap.
    let ephemeral = generate_ephemeral_key().await?;
    let wrap_key = ConversationKey::derive(&ephemeral, target)?;
    let wrapped_content = envelope::encrypt(&encode_json(&seal)?, &wrap_key, rng)?;

    let mut wrap = Record {
        id: None,
        author: ephemeral.public_key(),
        timestamp: randomized_timestamp(rng)?,
        kind: Kind::GiftWrap,
        tags: vec![Tag::Recipient(*target)],
        content: wrapped_content,
        signature: None,
    };
    wrap.sign(&ephemeral);

    // The ephemeral key is dropped here and never reused or persisted.
    Ok(wrap)
}

/// Generate a single-use key pair on the blocking thread pool.
///
/// Key generation is the one CPU-expensive step of the pipeline and the only
/// suspension point of [`create_message`].
pub async fn generate_ephemeral_key() -> Result<PrivateKey, WrapError> {
    tokio::task::spawn_blocking(PrivateKey::new)
        .await
        .map_err(|_| WrapError::KeyGenerationFailed)
}

/// Current time, backdated by a random offset within the timestamp window.
fn randomized_timestamp(rng: &Rng) -> Result<u64, WrapError> {
    let offset = rng.random_u64()? % (TIMESTAMP_WINDOW_SECS + 1);
    Ok(unix_time()?.saturating_sub(offset))
}

fn unix_time() -> Result<u64, WrapError> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| WrapError::ClockBehindEpoch)?;
    Ok(elapsed.as_secs())
}

/// Error types for building gift-wrapped messages.
#[derive(Error, Debug)]
pub enum WrapError {
    /// Key agreement with the target failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Envelope encryption failed.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// A record could not be serialized.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Randomness could not be drawn.
    #[error(transparent)]
    Rng(#[from] RngError),

    /// The ephemeral key generation task did not complete.
    #[error("ephemeral key generation failed")]
    KeyGenerationFailed,

    /// The system clock reports a time before the Unix epoch.
    #[error("system clock is behind the Unix epoch")]
    ClockBehindEpoch,
}
