#![no_main]
use libfuzzer_sys::fuzz_target;
use retention_core::RetentionInputs;
use retention_engine::{KeepMostRecentStrategy, RetentionService};

fuzz_target!(|data: &[u8]| {
    // First byte picks the keep count, the rest is an inputs document.
    let Some((&keep, rest)) = data.split_first() else {
        return;
    };
    if let Ok(inputs) = serde_json::from_slice::<RetentionInputs>(rest) {
        let service = RetentionService::new(KeepMostRecentStrategy::new(usize::from(keep % 8)));
        let report = service.classify(&inputs, None);
        assert!(report.keep.iter().all(|r| inputs.releases.contains(r)));
        assert_eq!(service.evaluate(&inputs, None), report.keep);
    }
});
