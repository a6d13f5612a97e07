#![no_main]

use despertar::reason_parser::{parse_wakeup_reason, ParsedReason};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Kernel reasons are bytes; only valid UTF-8 reaches the parser
    if let Ok(input) = std::str::from_utf8(data) {
        // Must not panic, and a supported reason always names a device
        if let ParsedReason::Devices(devices) = parse_wakeup_reason(input) {
            assert!(!devices.is_empty());
        }
    }
});
