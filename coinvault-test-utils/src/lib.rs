//! coinvault Test Utilities
//!
//! Centralized test infrastructure for the coinvault workspace:
//! - Proptest generators for entity records and raw upstream entries
//! - Test fixtures for common scenarios
//! - Custom assertions for record comparison

// Re-export core types for convenience
pub use coinvault_core::{
    CoinId, EntityRecord, FetchOutcome, Platform, RejectedEntry, Timestamp, REQUIRED_FIELDS,
};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating coinvault entity types.

    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// Generate a Timestamp within a plausible listing range (2010-2030).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1262304000i64..1893456000i64).prop_map(|secs| {
            DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    /// Generate a short ticker-like symbol.
    pub fn arb_symbol() -> impl Strategy<Value = String> {
        "[A-Z]{2,6}"
    }

    /// Generate an optional Platform.
    pub fn arb_platform() -> impl Strategy<Value = Option<Platform>> {
        prop_oneof![
            Just(None),
            (1i64..10_000, arb_symbol(), proptest::option::of("0x[0-9a-f]{40}")).prop_map(
                |(id, symbol, token_address)| {
                    Some(Platform {
                        id,
                        name: format!("Chain {}", symbol),
                        slug: symbol.to_lowercase(),
                        symbol,
                        token_address,
                    })
                }
            ),
        ]
    }

    /// Generate an EntityRecord with the given id.
    pub fn arb_record_with_id(id: CoinId) -> impl Strategy<Value = EntityRecord> {
        (
            1i64..500,
            arb_symbol(),
            any::<bool>(),
            arb_timestamp(),
            arb_timestamp(),
            arb_platform(),
        )
            .prop_map(move |(rank, symbol, is_active, first, last, platform)| {
                let (first, last) = if first <= last { (first, last) } else { (last, first) };
                EntityRecord {
                    id,
                    rank,
                    name: format!("Coin {}", symbol),
                    slug: format!("{}-{}", symbol.to_lowercase(), id),
                    symbol,
                    is_active,
                    first_historical_data: first,
                    last_historical_data: last,
                    platform,
                }
            })
    }

    /// Generate an EntityRecord.
    pub fn arb_record() -> impl Strategy<Value = EntityRecord> {
        (1i64..1_000_000).prop_flat_map(arb_record_with_id)
    }

    /// Generate a batch of records with unique ids, in arbitrary id order.
    pub fn arb_record_batch(max_len: usize) -> impl Strategy<Value = Vec<EntityRecord>> {
        proptest::collection::btree_set(1i64..1_000_000, 1..=max_len.max(1))
            .prop_flat_map(|ids: BTreeSet<CoinId>| {
                ids.into_iter()
                    .map(arb_record_with_id)
                    .collect::<Vec<_>>()
            })
            .prop_shuffle()
    }

    /// Generate a raw upstream entry with a random subset of required keys removed.
    ///
    /// Returns the entry and the number of keys removed.
    pub fn arb_raw_entry() -> impl Strategy<Value = (Value, usize)> {
        (
            arb_record(),
            proptest::collection::vec(proptest::bool::weighted(0.9), REQUIRED_FIELDS.len()),
        )
            .prop_map(|(record, keep)| {
                let mut raw = raw_from_record(&record);
                let mut removed = 0;
                if let Some(object) = raw.as_object_mut() {
                    for (field, keep) in REQUIRED_FIELDS.iter().zip(keep) {
                        if !keep {
                            object.remove(*field);
                            removed += 1;
                        }
                    }
                }
                (raw, removed)
            })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    fn ts(secs: i64) -> Timestamp {
        DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
    }

    /// Create a native-chain record with a deterministic shape.
    ///
    /// `first_historical_data` moves one month forward per id so records
    /// spread across year-month buckets.
    pub fn record(id: CoinId, rank: i64) -> EntityRecord {
        EntityRecord {
            id,
            rank,
            name: format!("Coin {}", id),
            symbol: format!("C{}", id),
            slug: format!("coin-{}", id),
            is_active: true,
            first_historical_data: ts(1_577_836_800 + id * 2_678_400),
            last_historical_data: ts(1_704_067_200),
            platform: None,
        }
    }

    /// Create a token record hosted on Ethereum.
    pub fn token_record(id: CoinId, rank: i64) -> EntityRecord {
        EntityRecord {
            platform: Some(Platform {
                id: 1027,
                name: "Ethereum".to_string(),
                symbol: "ETH".to_string(),
                slug: "ethereum".to_string(),
                token_address: Some(format!("0x{:040x}", id)),
            }),
            ..record(id, rank)
        }
    }

    /// Records with the given `(id, rank)` pairs.
    pub fn records(pairs: &[(CoinId, i64)]) -> Vec<EntityRecord> {
        pairs.iter().map(|(id, rank)| record(*id, *rank)).collect()
    }

    /// Raw upstream entry for [`record`], in the provider's wire shape.
    pub fn raw_entry(id: CoinId, rank: i64) -> Value {
        raw_from_record(&record(id, rank))
    }
}

/// Render a record the way the upstream API sends it (`is_active` as 0/1).
pub fn raw_from_record(record: &EntityRecord) -> Value {
    let platform = match &record.platform {
        Some(platform) => json!({
            "id": platform.id,
            "name": platform.name,
            "symbol": platform.symbol,
            "slug": platform.slug,
            "token_address": platform.token_address,
        }),
        None => Value::Null,
    };
    json!({
        "id": record.id,
        "rank": record.rank,
        "name": record.name,
        "symbol": record.symbol,
        "slug": record.slug,
        "is_active": if record.is_active { 1 } else { 0 },
        "first_historical_data": record.first_historical_data.to_rfc3339(),
        "last_historical_data": record.last_historical_data.to_rfc3339(),
        "platform": platform,
    })
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for coinvault-specific validation.

    use super::*;
    use std::collections::BTreeMap;

    /// Assert that two record sets hold the same records regardless of order.
    #[track_caller]
    pub fn assert_same_records(actual: &[EntityRecord], expected: &[EntityRecord]) {
        let index = |records: &[EntityRecord]| -> BTreeMap<CoinId, EntityRecord> {
            records.iter().map(|r| (r.id, r.clone())).collect()
        };
        assert_eq!(actual.len(), expected.len(), "Record counts differ");
        assert_eq!(index(actual), index(expected), "Record contents differ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_raw_entry_screens_back_to_record() {
        let raw = fixtures::raw_entry(7, 3);
        let screened = EntityRecord::from_raw(&raw).expect("fixture should screen");
        assert_eq!(screened, fixtures::record(7, 3));
    }

    #[test]
    fn test_token_fixture_has_platform() {
        let token = fixtures::token_record(42, 9);
        assert!(token.is_token());
        assert_eq!(token.id, 42);
    }

    #[test]
    fn test_assert_same_records_ignores_order() {
        let a = fixtures::records(&[(1, 3), (2, 1), (3, 2)]);
        let mut b = a.clone();
        b.reverse();
        assertions::assert_same_records(&a, &b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_record_batch_ids_are_unique(batch in generators::arb_record_batch(20)) {
            let mut ids: Vec<CoinId> = batch.iter().map(|r| r.id).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), batch.len());
        }

        #[test]
        fn prop_raw_from_record_roundtrips(record in generators::arb_record()) {
            let raw = raw_from_record(&record);
            let screened = EntityRecord::from_raw(&raw);
            prop_assert_eq!(screened, Ok(record));
        }
    }
}
