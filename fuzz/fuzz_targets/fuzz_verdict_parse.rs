#![no_main]

use doormode::classifier::wire::parse_verdicts;
use doormode::classifier::{evaluate, VerdictRules};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary response bodies must map to Ok or a typed error, never a panic.
    if let Ok(verdicts) = parse_verdicts(data) {
        let _ = evaluate(&verdicts, &VerdictRules::default());
    }
});
