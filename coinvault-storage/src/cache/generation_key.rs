//! Generation-scoped cache keys.
//!
//! Every refresh writes into a fresh generation. A record key can only be
//! built from a generation number, so writers cannot touch the published
//! key-space by accident.

use coinvault_core::CoinId;

/// Namespace shared by every key the cache store owns.
pub const NAMESPACE: &str = "coin";

/// Names the published generation.
pub const POINTER_KEY: &str = "coin:current";

/// Monotonic counter used to allocate generation numbers.
pub const COUNTER_KEY: &str = "coin:generation";

/// A cache key scoped to one generation.
///
/// # Format
///
/// `coin:<generation>:<id>`, e.g. `coin:12:1027`. All keys of a generation
/// share the prefix returned by [`GenerationKey::generation_prefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationKey {
    generation: u64,
    id: CoinId,
}

impl GenerationKey {
    pub fn new(generation: u64, id: CoinId) -> Self {
        Self { generation, id }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn id(&self) -> CoinId {
        self.id
    }

    pub fn encode(&self) -> String {
        format!("{}{}", Self::generation_prefix(self.generation), self.id)
    }

    /// Decode a key; returns `None` for the pointer, the counter and foreign keys.
    pub fn decode(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(NAMESPACE)?.strip_prefix(':')?;
        let (generation, id) = rest.split_once(':')?;
        Some(Self {
            generation: generation.parse().ok()?,
            id: id.parse().ok()?,
        })
    }

    /// Prefix matching every record key of `generation`.
    pub fn generation_prefix(generation: u64) -> String {
        format!("{}:{}:", NAMESPACE, generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let key = GenerationKey::new(12, 1027);
        assert_eq!(key.encode(), "coin:12:1027");
        assert_eq!(GenerationKey::decode("coin:12:1027"), Some(key));
    }

    #[test]
    fn test_decode_rejects_bookkeeping_keys() {
        assert_eq!(GenerationKey::decode(POINTER_KEY), None);
        assert_eq!(GenerationKey::decode(COUNTER_KEY), None);
    }

    #[test]
    fn test_decode_rejects_foreign_keys() {
        assert_eq!(GenerationKey::decode("0"), None);
        assert_eq!(GenerationKey::decode("other:1:2"), None);
        assert_eq!(GenerationKey::decode("coin:1:abc"), None);
    }

    #[test]
    fn test_prefix_does_not_overlap_longer_generations() {
        let prefix = GenerationKey::generation_prefix(1);
        assert!(GenerationKey::new(1, 5).encode().starts_with(&prefix));
        assert!(!GenerationKey::new(12, 5).encode().starts_with(&prefix));
    }
}
