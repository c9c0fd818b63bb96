// SPDX-License-Identifier: MIT OR Apache-2.0

use hkdf::Hkdf;
use sha2::Sha256;

/// HKDF-SHA256 extract step: condense input key material into a 32-byte
/// pseudorandom key under a domain-separating salt.
pub(crate) fn hkdf_extract(salt: &[u8], input_key_material: &[u8]) -> [u8; 32] {
    let (pseudorandom_key, _) = Hkdf::<Sha256>::extract(Some(salt), input_key_material);
    pseudorandom_key.into()
}

/// HKDF-SHA256 expand step: stretch a 32-byte pseudorandom key into `N`
/// output bytes bound to the given context info.
///
/// Callers keep `N` well below the HKDF output limit of 8160 bytes.
pub(crate) fn hkdf_expand<const N: usize>(pseudorandom_key: &[u8; 32], info: &[u8]) -> [u8; N] {
    let Ok(hkdf) = Hkdf::<Sha256>::from_prk(pseudorandom_key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 pseudorandom key length");
    };

    let mut out = [0u8; N];
    let Ok(()) = hkdf.expand(info, &mut out) else {
        unreachable!("output length is below the HKDF-SHA256 limit");
    };
    out
}
