// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity key pairs and signed, content-addressed records for the Selkie
//! private-messaging protocol.
//!
//! This crate holds the data types every layer of the protocol shares: the
//! ed25519 [`PrivateKey`]/[`PublicKey`] pair (which also performs X25519 key
//! agreement via the Edwards→Montgomery map), the BLAKE3 [`Hash`] used for
//! content addressing, and the [`Record`] structure with its canonical
//! serialization, signing and verification rules. The encryption scheme
//! itself lives in `selkie-encryption`.

pub mod hash;
pub mod identity;
pub mod json;
pub mod record;
pub mod relay_list;
mod serde;

pub use hash::{Hash, HashError};
pub use identity::{IdentityError, PrivateKey, PublicKey, Signature};
pub use json::{decode_json, encode_json, DecodeError, EncodeError};
pub use record::{Kind, Record, RecordError, Tag};
pub use relay_list::{build_relay_list, parse_relay_list, RelayListError};
