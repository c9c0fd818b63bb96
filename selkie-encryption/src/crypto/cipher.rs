// SPDX-License-Identifier: MIT OR Apache-2.0

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// XOR the ChaCha20 keystream for the given key and nonce into `buf`.
///
/// The same call encrypts and decrypts. The stream cipher on its own
/// authenticates nothing; callers pair it with [`hmac_verify`] and never
/// touch a ciphertext whose MAC has not been checked.
pub(crate) fn apply_keystream(key: &[u8; 32], nonce: &[u8; 12], buf: &mut [u8]) {
    let mut cipher = ChaCha20::new(key.into(), nonce.into());
    cipher.apply_keystream(buf);
}

/// Compute HMAC-SHA256 over the concatenation of `parts`.
pub(crate) fn hmac_sha256(key: &[u8; 32], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = new_mac(key);
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

/// Verify an HMAC-SHA256 tag over the concatenation of `parts` in constant
/// time.
pub(crate) fn hmac_verify(key: &[u8; 32], parts: &[&[u8]], expected: &[u8; 32]) -> bool {
    let mut mac = new_mac(key);
    for part in parts {
        mac.update(part);
    }
    mac.verify_slice(expected).is_ok()
}

fn new_mac(key: &[u8; 32]) -> HmacSha256 {
    let Ok(mac) = HmacSha256::new_from_slice(key) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac
}
