#![no_main]
use libfuzzer_sys::fuzz_target;
use retention_core::load::parse_collection;
use retention_core::Deployment;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_collection::<Deployment>("fuzz", s);
    }
});
