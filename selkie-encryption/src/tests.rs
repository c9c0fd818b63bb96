// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end and adversarial tests for the full wrap/unwrap pipeline.

use std::time::{SystemTime, UNIX_EPOCH};

use selkie_core::{encode_json, Hash, Kind, PrivateKey, Record, Tag};

use crate::crypto::Rng;
use crate::envelope;
use crate::keys::ConversationKey;
use crate::unwrap::{unwrap_message, UnwrapError};
use crate::wrap::{create_message, wrap_rumor};

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[tokio::test]
async fn end_to_end_roundtrip() {
    let sender = PrivateKey::new();
    let recipient = PrivateKey::new();
    let third_party = PrivateKey::new();
    let rng = Rng::from_seed([1; 32]);

    let (recipient_wrap, sender_wrap) =
        create_message("hello", &sender, &recipient.public_key(), None, &rng)
            .await
            .unwrap();

    // The recipient recovers the message and the authenticated sender.
    let rumor = unwrap_message(&recipient_wrap, &recipient).unwrap();
    assert_eq!(rumor.content, "hello");
    assert_eq!(rumor.author, sender.public_key());
    assert_eq!(rumor.kind, Kind::PrivateMessage);
    assert_eq!(rumor.recipient(), Some(&recipient.public_key()));
    assert_eq!(rumor.reply_to(), None);
    assert!(rumor.signature.is_none(), "rumor must never be signed");
    assert_eq!(rumor.id, Some(rumor.compute_id()));

    // The sender's own copy carries the identical message.
    let own_copy = unwrap_message(&sender_wrap, &sender).unwrap();
    assert_eq!(own_copy, rumor);

    // A third party cannot unwrap either copy.
    assert!(matches!(
        unwrap_message(&recipient_wrap, &third_party),
        Err(UnwrapError::DecryptionFailed)
    ));
    assert!(matches!(
        unwrap_message(&sender_wrap, &third_party),
        Err(UnwrapError::DecryptionFailed)
    ));
}

#[tokio::test]
async fn reply_reference_survives_the_pipeline() {
    let sender = PrivateKey::new();
    let recipient = PrivateKey::new();
    let rng = Rng::from_seed([1; 32]);
    let parent = Hash::new(b"an earlier message id");

    let (recipient_wrap, _) = create_message(
        "replying to you",
        &sender,
        &recipient.public_key(),
        Some(parent),
        &rng,
    )
    .await
    .unwrap();

    let rumor = unwrap_message(&recipient_wrap, &recipient).unwrap();
    assert_eq!(rumor.reply_to(), Some(&parent));
}

#[tokio::test]
async fn rumor_keeps_true_time_while_outer_layers_are_backdated() {
    let sender = PrivateKey::new();
    let recipient = PrivateKey::new();
    let rng = Rng::from_seed([1; 32]);

    let before = now();
    let (recipient_wrap, _) =
        create_message("hello", &sender, &recipient.public_key(), None, &rng)
            .await
            .unwrap();
    let after = now();

    let rumor = unwrap_message(&recipient_wrap, &recipient).unwrap();
    assert!(rumor.timestamp >= before && rumor.timestamp <= after);
    assert!(recipient_wrap.timestamp <= after);
}

#[tokio::test]
async fn recipient_cannot_be_confused_for_sender() {
    let sender = PrivateKey::new();
    let recipient = PrivateKey::new();
    let rng = Rng::from_seed([1; 32]);

    let (recipient_wrap, sender_wrap) =
        create_message("hello", &sender, &recipient.public_key(), None, &rng)
            .await
            .unwrap();

    // Each copy only unwraps for its own target key.
    assert!(unwrap_message(&recipient_wrap, &sender).is_err());
    assert!(unwrap_message(&sender_wrap, &recipient).is_err());
}

#[test]
fn non_wrap_records_are_rejected_up_front() {
    let recipient = PrivateKey::new();
    let record = Record::new(
        PrivateKey::new().public_key(),
        now(),
        Kind::PrivateMessage,
        vec![],
        "not encrypted at all".to_string(),
    );

    assert!(matches!(
        unwrap_message(&record, &recipient),
        Err(UnwrapError::NotGiftWrap)
    ));
}

#[test]
fn garbage_payload_is_rejected_as_decryption_failure() {
    let recipient = PrivateKey::new();
    let mut wrap = Record::new(
        PrivateKey::new().public_key(),
        now(),
        Kind::GiftWrap,
        vec![Tag::Recipient(recipient.public_key())],
        "definitely not base64 of an envelope".to_string(),
    );
    let ephemeral = PrivateKey::new();
    wrap.author = ephemeral.public_key();
    wrap.sign(&ephemeral);

    assert!(matches!(
        unwrap_message(&wrap, &recipient),
        Err(UnwrapError::DecryptionFailed)
    ));
}

/// A seal whose claimed sender differs from the key that actually signed it
/// must be rejected at the signature check, before the claimed sender is
/// used for anything.
#[test]
fn spoofed_seal_sender_is_rejected() {
    let attacker = PrivateKey::new();
    let victim = PrivateKey::new();
    let recipient = PrivateKey::new();
    let rng = Rng::from_seed([3; 32]);

    let rumor = Record::new(
        victim.public_key(),
        now(),
        Kind::PrivateMessage,
        vec![Tag::Recipient(recipient.public_key())],
        "I definitely wrote this".to_string(),
    );

    // The attacker encrypts with their own conversation key but claims the
    // victim as the seal's author.
    let inner_key = ConversationKey::derive(&attacker, &recipient.public_key()).unwrap();
    let sealed_content =
        envelope::encrypt(&encode_json(&rumor).unwrap(), &inner_key, &rng).unwrap();

    let mut seal = Record {
        id: None,
        author: victim.public_key(),
        timestamp: now(),
        kind: Kind::Seal,
        tags: Vec::new(),
        content: sealed_content,
        signature: None,
    };
    seal.sign(&attacker);

    let ephemeral = PrivateKey::new();
    let wrap_key = ConversationKey::derive(&ephemeral, &recipient.public_key()).unwrap();
    let wrapped_content =
        envelope::encrypt(&encode_json(&seal).unwrap(), &wrap_key, &rng).unwrap();

    let mut wrap = Record {
        id: None,
        author: ephemeral.public_key(),
        timestamp: now(),
        kind: Kind::GiftWrap,
        tags: vec![Tag::Recipient(recipient.public_key())],
        content: wrapped_content,
        signature: None,
    };
    wrap.sign(&ephemeral);

    assert!(matches!(
        unwrap_message(&wrap, &recipient),
        Err(UnwrapError::SignatureInvalid)
    ));
}

/// A correctly signed seal carrying a rumor that claims a different author
/// must be rejected at the binding check: the rumor is unsigned plaintext
/// and its author field proves nothing by itself.
#[tokio::test]
async fn spoofed_rumor_author_is_rejected() {
    let sender = PrivateKey::new();
    let victim = PrivateKey::new();
    let recipient = PrivateKey::new();
    let rng = Rng::from_seed([4; 32]);

    let forged_rumor = Record::new(
        victim.public_key(),
        now(),
        Kind::PrivateMessage,
        vec![Tag::Recipient(recipient.public_key())],
        "words put in someone else's mouth".to_string(),
    );

    let wrap = wrap_rumor(&forged_rumor, &sender, &recipient.public_key(), &rng)
        .await
        .unwrap();

    assert!(matches!(
        unwrap_message(&wrap, &recipient),
        Err(UnwrapError::SenderMismatch)
    ));
}

/// A wrapped record of the wrong kind fails the final check even when every
/// cryptographic layer is sound.
#[tokio::test]
async fn wrapped_non_chat_record_is_rejected() {
    let sender = PrivateKey::new();
    let recipient = PrivateKey::new();
    let rng = Rng::from_seed([5; 32]);

    let not_a_chat = Record::new(
        sender.public_key(),
        now(),
        Kind::Other("calendar-invite".to_string()),
        vec![],
        "picnic at noon".to_string(),
    );

    let wrap = wrap_rumor(&not_a_chat, &sender, &recipient.public_key(), &rng)
        .await
        .unwrap();

    assert!(matches!(
        unwrap_message(&wrap, &recipient),
        Err(UnwrapError::NotPrivateMessage)
    ));
}

/// A rumor without an id gets one recomputed during unwrapping, for display
/// purposes only.
#[tokio::test]
async fn missing_rumor_id_is_recomputed() {
    let sender = PrivateKey::new();
    let recipient = PrivateKey::new();
    let rng = Rng::from_seed([6; 32]);

    let mut rumor = Record::new(
        sender.public_key(),
        now(),
        Kind::PrivateMessage,
        vec![Tag::Recipient(recipient.public_key())],
        "hello".to_string(),
    );
    let expected_id = rumor.compute_id();
    rumor.id = None;

    let wrap = wrap_rumor(&rumor, &sender, &recipient.public_key(), &rng)
        .await
        .unwrap();

    let unwrapped = unwrap_message(&wrap, &recipient).unwrap();
    assert_eq!(unwrapped.id, Some(expected_id));
}

/// Both wraps of one message carry byte-identical rumor content even though
/// every outer layer differs.
#[tokio::test]
async fn both_copies_decrypt_to_identical_rumors() {
    let sender = PrivateKey::new();
    let recipient = PrivateKey::new();
    let rng = Rng::from_seed([7; 32]);

    let (recipient_wrap, sender_wrap) =
        create_message("hello", &sender, &recipient.public_key(), None, &rng)
            .await
            .unwrap();

    assert_ne!(recipient_wrap.content, sender_wrap.content);
    assert_ne!(recipient_wrap.author, sender_wrap.author);

    let rumor_1 = unwrap_message(&recipient_wrap, &recipient).unwrap();
    let rumor_2 = unwrap_message(&sender_wrap, &sender).unwrap();
    assert_eq!(rumor_1, rumor_2);
}
