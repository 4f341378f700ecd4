//! Report views over a snapshot.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;
use coinvault_core::{EntityRecord, Snapshot, Timestamp};

/// Calendar month used to bucket introduction dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(timestamp: &Timestamp) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Name and symbol of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameSymbol<'a> {
    pub name: &'a str,
    pub symbol: &'a str,
}

/// Number of entities first observed in each month, ascending by month.
pub fn introduction_counts(rows: &[EntityRecord]) -> BTreeMap<YearMonth, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts
            .entry(YearMonth::of(&row.first_historical_data))
            .or_insert(0) += 1;
    }
    counts
}

/// The `n` best-ranked rows.
///
/// Returns exactly `min(n, rows.len())` rows. Equal ranks keep their input
/// order.
pub fn top_n(rows: &[EntityRecord], n: usize) -> Vec<&EntityRecord> {
    let mut ranked: Vec<&EntityRecord> = rows.iter().collect();
    // sort_by_key is stable
    ranked.sort_by_key(|row| row.rank);
    ranked.truncate(n);
    ranked
}

pub fn name_symbol_projection<'a>(rows: &[&'a EntityRecord]) -> Vec<NameSymbol<'a>> {
    rows.iter()
        .map(|row| NameSymbol {
            name: &row.name,
            symbol: &row.symbol,
        })
        .collect()
}

/// All views derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report<'a> {
    pub generation: Option<u64>,
    pub total: usize,
    pub introductions: BTreeMap<YearMonth, usize>,
    /// Requested size of the ranked views; `top` may be shorter.
    pub top_n: usize,
    pub top: Vec<&'a EntityRecord>,
    pub names: Vec<NameSymbol<'a>>,
}

impl Report<'_> {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Build every view of `snapshot`, with `top_n` rows in the ranked views.
pub fn generate_report(snapshot: &Snapshot, top: usize) -> Report<'_> {
    let rows = snapshot.rows();
    let ranked = top_n(rows, top);
    let names = name_symbol_projection(&ranked);
    Report {
        generation: snapshot.generation(),
        total: rows.len(),
        introductions: introduction_counts(rows),
        top_n: top,
        top: ranked,
        names,
    }
}
