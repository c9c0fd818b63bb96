// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use selkie_core::{decode_json, encode_json, Record};

// Decoding arbitrary JSON must never panic, and anything that decodes into
// a record must re-encode.
fuzz_target!(|json: &str| {
    if let Ok(record) = decode_json::<Record>(json) {
        let _ = encode_json(&record);
    }
});
