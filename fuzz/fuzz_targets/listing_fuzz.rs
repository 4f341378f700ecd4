//! Fuzz target for upstream listing parsing.
//!
//! Feeds arbitrary bytes to `parse_listing`, which must return Ok or Err
//! without panicking.
//!
//! Run with: cargo +nightly fuzz run listing_fuzz -- -max_total_time=60

#![no_main]

use coinvault_source::parse_listing;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(outcome) = parse_listing(data) {
        // Rejections are reported in upstream order, one per entry.
        assert!(outcome
            .rejected
            .windows(2)
            .all(|pair| pair[0].index < pair[1].index));
        for rejected in &outcome.rejected {
            assert!(!rejected.reason.to_string().is_empty());
        }
    }
});
