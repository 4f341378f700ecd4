//! Tabular snapshot of the cached entities.

use std::collections::BTreeSet;

use crate::record::{CoinId, EntityRecord};

/// Row-per-entity materialization of one published cache generation.
///
/// Row order is the enumeration order of the backing store and carries no
/// meaning. Snapshots are rebuilt on demand and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    generation: Option<u64>,
    rows: Vec<EntityRecord>,
}

impl Snapshot {
    pub fn new(generation: Option<u64>, rows: Vec<EntityRecord>) -> Self {
        Self { generation, rows }
    }

    /// Cache generation the rows were read from, `None` for an empty cache.
    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    pub fn rows(&self) -> &[EntityRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> BTreeSet<CoinId> {
        self.rows.iter().map(|row| row.id).collect()
    }
}
