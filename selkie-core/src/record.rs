// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed, content-addressed records.
//!
//! A [`Record`] is the one structure the protocol publishes or encrypts: chat
//! messages, seals, gift wraps and relay lists are all records with different
//! [`Kind`]s. A record's id is the BLAKE3 hash of its canonical serialization
//! and its signature (when present) covers that id, so a record cannot be
//! mutated without either the id or the signature check catching it.
//!
//! Records of kind [`Kind::PrivateMessage`] are deliberately never signed:
//! their authenticity is established by the seal that carries them, and an
//! unsigned record leaks no provable authorship if it ever escapes its
//! envelope. The parse path therefore treats both `id` and `signature` as
//! optional fields.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hash::Hash;
use crate::identity::{PrivateKey, PublicKey, Signature};

/// Tag label pointing at the record's recipient.
const TAG_RECIPIENT: &str = "to";

/// Tag label referencing the record a message replies to.
const TAG_REPLY: &str = "reply";

/// Tag label carrying one relay address of a relay-list record.
const TAG_RELAY: &str = "relay";

/// The role a record plays in the protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// Unsigned chat message content ("rumor"), only ever seen in plaintext
    /// by the two conversation parties.
    PrivateMessage,

    /// Sender-signed carrier of an encrypted private message.
    Seal,

    /// Ephemeral-signed outer wrapper, the only record handed to relays.
    GiftWrap,

    /// Signed list of relay addresses a user wants private messages
    /// delivered to.
    RelayList,

    /// Any kind this crate does not interpret. Kept verbatim so foreign
    /// records survive a parse round-trip.
    Other(String),
}

impl Kind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Kind::PrivateMessage => "chat",
            Kind::Seal => "seal",
            Kind::GiftWrap => "gift-wrap",
            Kind::RelayList => "dm-relay-list",
            Kind::Other(value) => value,
        }
    }
}

impl From<&str> for Kind {
    fn from(value: &str) -> Self {
        match value {
            "chat" => Kind::PrivateMessage,
            "seal" => Kind::Seal,
            "gift-wrap" => Kind::GiftWrap,
            "dm-relay-list" => Kind::RelayList,
            other => Kind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Kind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Kind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Kind::from(value.as_str()))
    }
}

/// Relation tag of a record, serialized as an array of strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag {
    /// The record is addressed to this public key.
    Recipient(PublicKey),

    /// The record replies to the record with this id.
    Reply(Hash),

    /// One relay address, used by relay-list records.
    Relay(String),

    /// Any tag this crate does not interpret, kept verbatim.
    Other(Vec<String>),
}

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Tag::Recipient(public_key) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(TAG_RECIPIENT)?;
                seq.serialize_element(&public_key.to_hex())?;
                seq.end()
            }
            Tag::Reply(id) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(TAG_REPLY)?;
                seq.serialize_element(&id.to_hex())?;
                seq.end()
            }
            Tag::Relay(address) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(TAG_RELAY)?;
                seq.serialize_element(address)?;
                seq.end()
            }
            Tag::Other(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items = Vec::<String>::deserialize(deserializer)?;

        // Anything that does not parse as a known tag is carried verbatim.
        match items.as_slice() {
            [label, value] if label == TAG_RECIPIENT => {
                if let Ok(public_key) = value.parse::<PublicKey>() {
                    return Ok(Tag::Recipient(public_key));
                }
            }
            [label, value] if label == TAG_REPLY => {
                if let Ok(id) = value.parse::<Hash>() {
                    return Ok(Tag::Reply(id));
                }
            }
            [label, value] if label == TAG_RELAY => {
                return Ok(Tag::Relay(value.clone()));
            }
            _ => {}
        }
        Ok(Tag::Other(items))
    }
}

/// A protocol record: some content, the key it claims as author, a timestamp,
/// a [`Kind`], relation [`Tag`]s, and optionally a content-derived id and a
/// signature over that id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// BLAKE3 hash of the canonical serialization. Optional on the wire;
    /// receivers recompute it rather than trusting the claimed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Hash>,

    /// Public key this record claims as its author. For signed records the
    /// claim is only meaningful once [`Record::verify`] has passed.
    pub author: PublicKey,

    /// Unix timestamp in seconds.
    pub timestamp: u64,

    /// The role this record plays.
    pub kind: Kind,

    /// Relation tags.
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Content, either plaintext or an encrypted envelope payload depending
    /// on the kind.
    pub content: String,

    /// Signature over the record id, absent on unsigned records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

impl Record {
    /// Build an unsigned record with its id already computed.
    pub fn new(
        author: PublicKey,
        timestamp: u64,
        kind: Kind,
        tags: Vec<Tag>,
        content: String,
    ) -> Self {
        let mut record = Self {
            id: None,
            author,
            timestamp,
            kind,
            tags,
            content,
            signature: None,
        };
        record.id = Some(record.compute_id());
        record
    }

    /// Canonical byte serialization the record id is derived from: the JSON
    /// array `[author, timestamp, kind, tags, content]`.
    ///
    /// Field order is fixed and every element serializes as a string, number
    /// or array, so the output is deterministic.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&(
            &self.author,
            self.timestamp,
            &self.kind,
            &self.tags,
            &self.content,
        ))
        // All tuple elements serialize infallibly and _if_ serde_json still
        // fails then because of something really bad ..
        .expect("JSON encoder failed due to a critical error")
    }

    /// Compute the content-derived id of this record.
    pub fn compute_id(&self) -> Hash {
        Hash::new(self.canonical_bytes())
    }

    /// Set the record id and sign it with the given key.
    ///
    /// The author field is not touched; signing with a key that does not
    /// match `author` produces a record [`Record::verify`] rejects.
    pub fn sign(&mut self, private_key: &PrivateKey) {
        let id = self.compute_id();
        self.signature = Some(private_key.sign(id.as_bytes()));
        self.id = Some(id);
    }

    /// Verify this record's signature against its claimed author.
    ///
    /// The id is recomputed from the record fields; a claimed id that does
    /// not match the recomputation fails verification even if the signature
    /// over the claimed id would be valid.
    pub fn verify(&self) -> bool {
        match &self.signature {
            Some(signature) => {
                let id = self.compute_id();
                if let Some(claimed) = &self.id {
                    if *claimed != id {
                        return false;
                    }
                }
                self.author.verify(id.as_bytes(), signature)
            }
            None => false,
        }
    }

    /// Check structural consistency of a parsed record.
    pub fn validate(&self) -> Result<(), RecordError> {
        if let Some(claimed) = &self.id {
            if *claimed != self.compute_id() {
                return Err(RecordError::IdMismatch);
            }
        }
        if self.signature.is_some() && !self.verify() {
            return Err(RecordError::SignatureMismatch);
        }
        Ok(())
    }

    /// The recipient named by the first recipient tag, if any.
    pub fn recipient(&self) -> Option<&PublicKey> {
        self.tags.iter().find_map(|tag| match tag {
            Tag::Recipient(public_key) => Some(public_key),
            _ => None,
        })
    }

    /// The record id named by the first reply tag, if any.
    pub fn reply_to(&self) -> Option<&Hash> {
        self.tags.iter().find_map(|tag| match tag {
            Tag::Reply(id) => Some(id),
            _ => None,
        })
    }

    /// All relay addresses named by relay tags, in tag order.
    pub fn relay_addresses(&self) -> Vec<&str> {
        self.tags
            .iter()
            .filter_map(|tag| match tag {
                Tag::Relay(address) => Some(address.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Error types for `Record` validation.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Claimed record id does not match the canonical serialization.
    #[error("record id does not match record content")]
    IdMismatch,

    /// Record needs to be signed.
    #[error("record is missing a signature")]
    MissingSignature,

    /// Signature does not match the claimed author.
    #[error("signature does not match claimed author")]
    SignatureMismatch,
}

#[cfg(test)]
mod tests {
    use crate::hash::Hash;
    use crate::identity::PrivateKey;
    use crate::json::{decode_json, encode_json};

    use super::{Kind, Record, Tag};

    fn test_record(content: &str) -> (PrivateKey, Record) {
        let private_key = PrivateKey::new();
        let record = Record::new(
            private_key.public_key(),
            1_700_000_000,
            Kind::PrivateMessage,
            vec![],
            content.to_string(),
        );
        (private_key, record)
    }

    #[test]
    fn id_is_deterministic() {
        let (_, record) = test_record("hello");
        assert_eq!(record.compute_id(), record.compute_id());
        assert_eq!(record.id, Some(record.compute_id()));
    }

    #[test]
    fn id_binds_all_canonical_fields() {
        let (_, record) = test_record("hello");
        let id = record.compute_id();

        let mut changed = record.clone();
        changed.content = "hello!".to_string();
        assert_ne!(changed.compute_id(), id);

        let mut changed = record.clone();
        changed.timestamp += 1;
        assert_ne!(changed.compute_id(), id);

        let mut changed = record.clone();
        changed.kind = Kind::Seal;
        assert_ne!(changed.compute_id(), id);

        let mut changed = record;
        changed.tags.push(Tag::Reply(Hash::new(b"parent")));
        assert_ne!(changed.compute_id(), id);
    }

    #[test]
    fn sign_and_verify() {
        let (private_key, mut record) = test_record("hello");
        assert!(!record.verify(), "unsigned record must not verify");

        record.sign(&private_key);
        assert!(record.verify());
    }

    #[test]
    fn verify_rejects_changed_author() {
        let (private_key, mut record) = test_record("hello");
        record.sign(&private_key);

        record.author = PrivateKey::new().public_key();
        assert!(!record.verify(), "author swap must invalidate signature");
    }

    #[test]
    fn verify_rejects_changed_content() {
        let (private_key, mut record) = test_record("hello");
        record.sign(&private_key);

        record.content = "goodbye".to_string();
        assert!(!record.verify());
    }

    #[test]
    fn verify_rejects_stale_claimed_id() {
        let (private_key, mut record) = test_record("hello");
        record.sign(&private_key);

        // Re-sign a modified copy but keep the old id claim.
        let old_id = record.id;
        record.content = "changed".to_string();
        record.sign(&private_key);
        record.id = old_id;
        assert!(!record.verify());
    }

    #[test]
    fn unsigned_record_parses_without_signature_field() {
        let (_, record) = test_record("hello");
        let json = encode_json(&record).unwrap();
        assert!(!json.contains("\"signature\""));

        let record_again: Record = decode_json(&json).unwrap();
        assert_eq!(record, record_again);
        assert!(record_again.signature.is_none());
    }

    #[test]
    fn signed_record_json_roundtrip() {
        let (private_key, mut record) = test_record("hello");
        record.sign(&private_key);

        let json = encode_json(&record).unwrap();
        let record_again: Record = decode_json(&json).unwrap();
        assert_eq!(record, record_again);
        assert!(record_again.verify());
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(Kind::PrivateMessage.as_str(), "chat");
        assert_eq!(Kind::Seal.as_str(), "seal");
        assert_eq!(Kind::GiftWrap.as_str(), "gift-wrap");
        assert_eq!(Kind::RelayList.as_str(), "dm-relay-list");
        assert_eq!(Kind::from("group-invite"), Kind::Other("group-invite".to_string()));
    }

    #[test]
    fn tags_roundtrip() {
        let recipient = PrivateKey::new().public_key();
        let tags = vec![
            Tag::Recipient(recipient),
            Tag::Reply(Hash::new(b"parent")),
            Tag::Relay("wss://relay.example.org".to_string()),
            Tag::Other(vec!["topic".to_string(), "boats".to_string()]),
        ];

        let json = encode_json(&tags).unwrap();
        let tags_again: Vec<Tag> = decode_json(&json).unwrap();
        assert_eq!(tags, tags_again);
    }

    #[test]
    fn malformed_known_tag_falls_back_to_other() {
        let json = r#"[["to", "not-hex"], ["reply"]]"#;
        let tags: Vec<Tag> = decode_json(json).unwrap();
        assert!(matches!(&tags[0], Tag::Other(items) if items.len() == 2));
        assert!(matches!(&tags[1], Tag::Other(items) if items.len() == 1));
    }

    #[test]
    fn tag_accessors() {
        let recipient = PrivateKey::new().public_key();
        let parent = Hash::new(b"parent");
        let record = Record::new(
            PrivateKey::new().public_key(),
            0,
            Kind::PrivateMessage,
            vec![Tag::Recipient(recipient), Tag::Reply(parent)],
            "hi".to_string(),
        );

        assert_eq!(record.recipient(), Some(&recipient));
        assert_eq!(record.reply_to(), Some(&parent));
        assert!(record.relay_addresses().is_empty());
    }

    #[test]
    fn validate_catches_wrong_id() {
        let (_, mut record) = test_record("hello");
        record.id = Some(Hash::new(b"unrelated"));
        assert!(record.validate().is_err());
    }
}
