#![no_main]

use doormode::drivers::ht16k33::encode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = encode(text);
    }
});
