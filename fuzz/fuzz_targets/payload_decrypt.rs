// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use selkie_encryption::{decrypt, ConversationKey};

// Arbitrary payload strings must be rejected cleanly, never panic.
fuzz_target!(|payload: &str| {
    let conversation_key = ConversationKey::from_bytes([7; 32]);
    let _ = decrypt(payload, &conversation_key);
});
