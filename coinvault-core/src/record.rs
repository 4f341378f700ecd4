//! Entity record schema and upstream screening.
//!
//! Upstream entries arrive as loosely-typed JSON. An entry becomes an
//! [`EntityRecord`] only if every key in [`REQUIRED_FIELDS`] is present and
//! the values deserialize into the typed schema. Everything else is collected
//! as a [`RejectedEntry`] with the reason attached.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Upstream asset identifier, used as the cache key component.
pub type CoinId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Keys every upstream entry must carry to be cache-eligible.
///
/// `platform` is required as a key even though its value may be `null`.
pub const REQUIRED_FIELDS: [&str; 9] = [
    "id",
    "rank",
    "name",
    "symbol",
    "slug",
    "is_active",
    "first_historical_data",
    "last_historical_data",
    "platform",
];

/// Hosting chain of a token that is not native to its own chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: CoinId,
    pub name: String,
    pub symbol: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
}

/// One asset's metadata snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: CoinId,
    pub rank: i64,
    pub name: String,
    pub symbol: String,
    pub slug: String,
    #[serde(deserialize_with = "de_flag")]
    pub is_active: bool,
    pub first_historical_data: Timestamp,
    pub last_historical_data: Timestamp,
    pub platform: Option<Platform>,
}

impl EntityRecord {
    /// Screen a raw upstream entry against the record schema.
    pub fn from_raw(entry: &Value) -> Result<Self, ValidationError> {
        let object = entry.as_object().ok_or(ValidationError::NotAnObject)?;

        let missing = missing_fields(object);
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields {
                fields: missing.into_iter().map(str::to_string).collect(),
            });
        }

        serde_json::from_value(entry.clone()).map_err(|e| ValidationError::Malformed {
            reason: e.to_string(),
        })
    }

    /// Whether the asset lives on another chain.
    pub fn is_token(&self) -> bool {
        self.platform.is_some()
    }
}

/// Required keys absent from an upstream object, in schema order.
pub fn missing_fields(object: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect()
}

/// Upstream sends `is_active` as `1`/`0`; stored documents carry a bool.
fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(de::Error::custom(format!("expected 0 or 1, got: {n}"))),
        },
        other => Err(de::Error::custom(format!(
            "expected bool or 0/1, got: {other}"
        ))),
    }
}

/// An upstream entry that failed screening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// Position in the upstream `data` list.
    pub index: usize,
    /// Upstream id, when the entry carried a readable one.
    pub id: Option<CoinId>,
    pub reason: ValidationError,
}

/// Result of screening an upstream listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Accepted records in upstream order.
    pub accepted: Vec<EntityRecord>,
    pub rejected: Vec<RejectedEntry>,
}

impl FetchOutcome {
    /// Screen every entry of an upstream `data` list.
    pub fn screen(entries: &[Value]) -> Self {
        let mut outcome = Self::default();
        for (index, entry) in entries.iter().enumerate() {
            match EntityRecord::from_raw(entry) {
                Ok(record) => outcome.accepted.push(record),
                Err(reason) => outcome.rejected.push(RejectedEntry {
                    index,
                    id: entry.get("id").and_then(Value::as_i64),
                    reason,
                }),
            }
        }
        outcome
    }

    /// True when no entry survived screening.
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bitcoin() -> Value {
        json!({
            "id": 1,
            "rank": 1,
            "name": "Bitcoin",
            "symbol": "BTC",
            "slug": "bitcoin",
            "is_active": 1,
            "first_historical_data": "2013-04-28T18:47:21.000Z",
            "last_historical_data": "2024-03-01T12:00:00.000Z",
            "platform": null
        })
    }

    fn tether() -> Value {
        json!({
            "id": 825,
            "rank": 3,
            "name": "Tether USDt",
            "symbol": "USDT",
            "slug": "tether",
            "is_active": 1,
            "first_historical_data": "2015-02-25T13:34:26.000Z",
            "last_historical_data": "2024-03-01T12:00:00.000Z",
            "platform": {
                "id": 1027,
                "name": "Ethereum",
                "symbol": "ETH",
                "slug": "ethereum",
                "token_address": "0xdac17f958d2ee523a2206206994597c13d831ec7"
            }
        })
    }

    #[test]
    fn test_from_raw_accepts_native_asset() {
        let record = EntityRecord::from_raw(&bitcoin()).expect("bitcoin should screen");
        assert_eq!(record.id, 1);
        assert!(record.is_active);
        assert!(!record.is_token());
    }

    #[test]
    fn test_from_raw_accepts_token_with_platform() {
        let record = EntityRecord::from_raw(&tether()).expect("tether should screen");
        let platform = record.platform.expect("platform should be present");
        assert_eq!(platform.slug, "ethereum");
        assert_eq!(
            platform.token_address.as_deref(),
            Some("0xdac17f958d2ee523a2206206994597c13d831ec7")
        );
    }

    #[test]
    fn test_from_raw_rejects_missing_platform_key() {
        let mut entry = bitcoin();
        entry.as_object_mut().unwrap().remove("platform");
        let err = EntityRecord::from_raw(&entry).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["platform".to_string()]
            }
        );
    }

    #[test]
    fn test_from_raw_rejects_non_object() {
        let err = EntityRecord::from_raw(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject);
    }

    #[test]
    fn test_from_raw_rejects_bad_flag() {
        let mut entry = bitcoin();
        entry["is_active"] = json!(7);
        let err = EntityRecord::from_raw(&entry).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }));
    }

    #[test]
    fn test_stored_document_roundtrip_keeps_every_field() {
        let record = EntityRecord::from_raw(&tether()).unwrap();
        let document = serde_json::to_string(&record).unwrap();
        let restored: EntityRecord = serde_json::from_str(&document).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_screen_keeps_order_and_reports_rejections() {
        let mut broken = tether();
        broken.as_object_mut().unwrap().remove("slug");
        let entries = vec![tether(), broken, bitcoin()];

        let outcome = FetchOutcome::screen(&entries);
        let ids: Vec<CoinId> = outcome.accepted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![825, 1]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].index, 1);
        assert_eq!(outcome.rejected[0].id, Some(825));
    }

    #[test]
    fn test_screen_empty_listing() {
        let outcome = FetchOutcome::screen(&[]);
        assert!(outcome.is_empty());
        assert!(outcome.rejected.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn prop_missing_fields_reported_in_schema_order(
            removed in proptest::collection::vec(proptest::bool::ANY, REQUIRED_FIELDS.len())
        ) {
            let mut entry = bitcoin();
            let object = entry.as_object_mut().unwrap();
            let mut expected = Vec::new();
            for (field, remove) in REQUIRED_FIELDS.iter().zip(&removed) {
                if *remove {
                    object.remove(*field);
                    expected.push(field.to_string());
                }
            }

            let result = EntityRecord::from_raw(&entry);
            if expected.is_empty() {
                proptest::prop_assert!(result.is_ok());
            } else {
                proptest::prop_assert_eq!(
                    result,
                    Err(ValidationError::MissingFields { fields: expected })
                );
            }
        }
    }
}
