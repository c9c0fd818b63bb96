// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay-list records.
//!
//! A user publishes the relay addresses they want private messages delivered
//! to as a signed record of kind [`Kind::RelayList`], one relay tag per
//! address. Building and parsing are plain list round-trips.

use thiserror::Error;

use crate::identity::PrivateKey;
use crate::record::{Kind, Record, RecordError, Tag};

/// Build a signed relay-list record from the given relay addresses.
pub fn build_relay_list<S: AsRef<str>>(
    relays: &[S],
    private_key: &PrivateKey,
    timestamp: u64,
) -> Record {
    let tags = relays
        .iter()
        .map(|address| Tag::Relay(address.as_ref().to_string()))
        .collect();
    let mut record = Record::new(
        private_key.public_key(),
        timestamp,
        Kind::RelayList,
        tags,
        String::new(),
    );
    record.sign(private_key);
    record
}

/// Extract the relay addresses from a relay-list record.
///
/// The record has to be of the relay-list kind and carry a valid signature;
/// an unsigned list could be planted by anyone observing the relay.
pub fn parse_relay_list(record: &Record) -> Result<Vec<String>, RelayListError> {
    if record.kind != Kind::RelayList {
        return Err(RelayListError::WrongKind(record.kind.clone()));
    }
    if record.signature.is_none() {
        return Err(RelayListError::Record(RecordError::MissingSignature));
    }
    if !record.verify() {
        return Err(RelayListError::Record(RecordError::SignatureMismatch));
    }
    Ok(record
        .relay_addresses()
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Error types for relay-list records.
#[derive(Error, Debug)]
pub enum RelayListError {
    /// Record is not a relay list.
    #[error("expected a relay-list record, found kind \"{0}\"")]
    WrongKind(Kind),

    /// Record failed structural validation.
    #[error(transparent)]
    Record(#[from] RecordError),
}
