// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ed25519 identity key pairs.
//!
//! One key pair covers both roles the protocol needs: Schnorr-style
//! signatures over record ids, and X25519 Diffie-Hellman for deriving
//! conversation keys. The Diffie-Hellman side uses the birational map from
//! the Edwards curve to its Montgomery form, so no second key pair format
//! ever exists and the public key published in a record is the same key a
//! peer performs key agreement against.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

/// Size of private and public keys in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of signatures in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Ed25519 private key.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Generate a new private key from the operating system's CSPRNG.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let mut csprng = OsRng;
        Self(SigningKey::generate(&mut csprng))
    }

    /// Restore a private key from its 32-byte seed.
    pub fn from_bytes(bytes: &[u8; KEY_SIZE]) -> Self {
        Self(SigningKey::from_bytes(bytes))
    }

    /// Bytes of the private key seed.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.0.as_bytes()
    }

    /// The public counterpart of this key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Sign the given bytes with this key.
    pub fn sign(&self, bytes: &[u8]) -> Signature {
        Signature(self.0.sign(bytes))
    }

    /// Compute the X25519 shared secret between this key and another party's
    /// public key.
    ///
    /// Both keys are mapped onto the Montgomery curve; the result is the
    /// u-coordinate of the shared point. The all-zero output produced by
    /// low-order public keys is rejected, so a successful return is always a
    /// contributory secret.
    pub fn shared_secret(
        &self,
        their_public_key: &PublicKey,
    ) -> Result<[u8; KEY_SIZE], IdentityError> {
        let secret = x25519_dalek::StaticSecret::from(self.0.to_scalar_bytes());
        let public = x25519_dalek::PublicKey::from(their_public_key.0.to_montgomery().to_bytes());
        let shared = secret.diffie_hellman(&public);
        if !shared.was_contributory() {
            return Err(IdentityError::SharedSecretFailed);
        }
        Ok(*shared.as_bytes())
    }
}

impl TryFrom<&[u8]> for PrivateKey {
    type Error = IdentityError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let checked: [u8; KEY_SIZE] = value
            .try_into()
            .map_err(|_| IdentityError::InvalidLength(value.len(), KEY_SIZE))?;
        Ok(Self::from_bytes(&checked))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not reveal the seed when printing debug info.
        f.debug_struct("PrivateKey").field("seed", &"***").finish()
    }
}

/// Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Restore a public key from its 32-byte compressed Edwards encoding.
    ///
    /// Fails when the bytes do not encode a point on the curve.
    pub fn from_bytes(bytes: &[u8; KEY_SIZE]) -> Result<Self, IdentityError> {
        let key =
            VerifyingKey::from_bytes(bytes).map_err(|_| IdentityError::InvalidPublicKey)?;
        Ok(Self(key))
    }

    /// Bytes of the public key.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.0.as_bytes()
    }

    /// Verify a signature over the given bytes against this key.
    pub fn verify(&self, bytes: &[u8], signature: &Signature) -> bool {
        self.0.verify(bytes, &signature.0).is_ok()
    }

    /// Convert the public key to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = IdentityError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let checked: [u8; KEY_SIZE] = value
            .try_into()
            .map_err(|_| IdentityError::InvalidLength(value.len(), KEY_SIZE))?;
        Self::from_bytes(&checked)
    }
}

impl std::str::FromStr for PublicKey {
    type Err = IdentityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(hex::decode(value)?.as_slice())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

/// Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    /// Restore a signature from its 64-byte encoding.
    pub fn from_bytes(bytes: &[u8; SIGNATURE_SIZE]) -> Self {
        Self(ed25519_dalek::Signature::from_bytes(bytes))
    }

    /// Bytes of the signature.
    pub fn to_bytes(self) -> [u8; SIGNATURE_SIZE] {
        self.0.to_bytes()
    }

    /// Convert the signature to a hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = IdentityError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let checked: [u8; SIGNATURE_SIZE] = value
            .try_into()
            .map_err(|_| IdentityError::InvalidLength(value.len(), SIGNATURE_SIZE))?;
        Ok(Self::from_bytes(&checked))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.to_hex()).finish()
    }
}

/// Error types for identity key material.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Key or signature bytes have an invalid length.
    #[error("invalid length {0} bytes, expected {1} bytes")]
    InvalidLength(usize, usize),

    /// Bytes do not encode a valid curve point.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Key agreement produced a non-contributory shared secret.
    #[error("shared secret computation failed")]
    SharedSecretFailed,

    /// Key material contains invalid hexadecimal characters.
    #[error("invalid hex encoding in key material")]
    InvalidHexEncoding(#[from] hex::FromHexError),
}
