//! Fuzz target for record screening.
//!
//! Any JSON value either screens into a record that serializes and reads
//! back unchanged, or is rejected with a reason.
//!
//! Run with: cargo +nightly fuzz run record_fuzz -- -max_total_time=60

#![no_main]

use coinvault_core::EntityRecord;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    match EntityRecord::from_raw(&value) {
        Ok(record) => {
            let stored = serde_json::to_string(&record).expect("records always serialize");
            let loaded: EntityRecord =
                serde_json::from_str(&stored).expect("stored records always load");
            assert_eq!(loaded, record);
        }
        Err(err) => assert!(!err.to_string().is_empty()),
    }
});
