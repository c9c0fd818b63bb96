// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use selkie_encryption::padding::{pad, unpad};

// Unpadding arbitrary bytes must never panic, and padded output of a valid
// plaintext must round-trip.
fuzz_target!(|data: &[u8]| {
    let _ = unpad(data);

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(padded) = pad(text) {
            assert_eq!(unpad(&padded).expect("padded output must unpad"), text);
        }
    }
});
