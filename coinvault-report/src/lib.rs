//! coinvault Report - Views and Charts
//!
//! Derives the report views from a [`Snapshot`](coinvault_core::Snapshot)
//! and renders them as SVG charts. Views borrow the snapshot; nothing here
//! writes back to the cache.

pub mod charts;
pub mod views;

pub use charts::{top_table_chart, ChartRenderer, SvgChartRenderer, INTRODUCTION_CHART, RANK_CHART};
pub use views::{
    generate_report, introduction_counts, name_symbol_projection, top_n, NameSymbol, Report,
    YearMonth,
};
