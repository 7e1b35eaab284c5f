//! Analytics module for bankpulse
//!
//! Provides the KPI calculation core:
//! - An immutable definition registry (the single source of truth)
//! - A per-tenant calculation engine with graceful synthetic fallback
//! - A yearly time-series synthesizer for dashboards and testing
//! - The data-source seam the real aggregation path plugs into
//!
//! The registry is injected into both engines; nothing here holds
//! shared mutable state, so concurrent calls need no locking beyond
//! the observation store's own connection guard.

pub mod engine;
pub mod registry;
pub mod series;
pub mod source;

pub use engine::{trend_is_positive, BatchOutcome, CalculationEngine, DEFAULT_WINDOW_HOURS};
pub use registry::{builtin_catalog, KpiRegistry};
pub use series::{classify_trend, SeriesGenerator, DAYS_IN_YEAR};
pub use source::{DataUnavailable, DateRange, KpiDataSource, NullDataSource, SqliteDataSource};

/// Round to two decimal places for presentation-friendly values.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal place (trend percentages).
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
