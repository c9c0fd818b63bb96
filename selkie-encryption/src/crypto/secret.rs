// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(not(test))]
use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::ZeroizeOnDrop;

/// Generic container for sensitive bytes with best-effort security measures.
///
/// In particular this implementation provides:
/// 1. Zeroise memory on drop.
/// 2. Crate-private accessors, preventing misuse by API consumers.
/// 3. Hide bytes value when printing debug info.
/// 4. Constant-time comparison implementation to prevent timing attacks.
///
/// No secret in this protocol is ever persisted, so the container is
/// deliberately not serializable.
#[derive(Clone, Eq, ZeroizeOnDrop)]
#[cfg_attr(test, derive(Debug))]
pub(crate) struct Secret<const N: usize>([u8; N]);

impl<const N: usize> Secret<N> {
    pub(crate) fn from_bytes(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> PartialEq for Secret<N> {
    fn eq(&self, other: &Self) -> bool {
        // Constant-time comparison.
        bool::from(self.0.ct_eq(&other.0))
    }
}

#[cfg(not(test))]
impl<const N: usize> fmt::Debug for Secret<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not reveal secret values when printing debug info.
        f.debug_struct("Secret").field("value", &"***").finish()
    }
}
