//! Data source abstraction for the calculation engine.
//!
//! The engine never talks to storage directly; it asks a
//! [`KpiDataSource`] for an aggregate scoped to `(tenant, window)` and
//! treats any failure as "no data". That keeps the dashboard
//! available when the store is down, at the cost of serving a
//! synthetic value.

use crate::db::Database;
use crate::types::KpiDefinition;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Inclusive-start, exclusive-end aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Window covering the trailing `hours` ending now.
    pub fn trailing_hours(hours: u32) -> Self {
        let end = Utc::now();
        Self {
            start: end - chrono::Duration::hours(hours as i64),
            end,
        }
    }
}

/// Typed "no usable data" signal.
///
/// Distinguishes an empty-but-healthy query from a failed one so that
/// a genuine zero-row window is never mistaken for a storage outage.
/// Neither case is surfaced to callers; both switch the engine to the
/// synthetic fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataUnavailable {
    /// The window held no qualifying rows
    NoRows,
    /// The storage collaborator failed
    Storage(String),
}

/// Supplies real aggregates to the calculation engine.
///
/// Implementations issue an aggregation query scoped to
/// `(tenant, window)` and return a scalar. I/O failures are reported
/// as [`DataUnavailable::Storage`], never propagated as hard errors.
pub trait KpiDataSource: Send + Sync {
    fn aggregate(
        &self,
        tenant_id: i64,
        kpi: &KpiDefinition,
        window: &DateRange,
    ) -> std::result::Result<f64, DataUnavailable>;
}

/// SQLite-backed data source over the observation store.
pub struct SqliteDataSource {
    db: Arc<Database>,
}

impl SqliteDataSource {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl KpiDataSource for SqliteDataSource {
    fn aggregate(
        &self,
        tenant_id: i64,
        kpi: &KpiDefinition,
        window: &DateRange,
    ) -> std::result::Result<f64, DataUnavailable> {
        match self
            .db
            .aggregate_observations(tenant_id, &kpi.id, window.start, window.end)
        {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(DataUnavailable::NoRows),
            Err(e) => {
                tracing::warn!(
                    kpi_id = %kpi.id,
                    tenant_id,
                    error = %e,
                    "Observation store query failed, degrading to synthetic value"
                );
                Err(DataUnavailable::Storage(e.to_string()))
            }
        }
    }
}

/// Data source with no backing store; every query reports no rows.
///
/// Used in demo deployments where the dashboard runs entirely on
/// synthetic values.
pub struct NullDataSource;

impl KpiDataSource for NullDataSource {
    fn aggregate(
        &self,
        _tenant_id: i64,
        _kpi: &KpiDefinition,
        _window: &DateRange,
    ) -> std::result::Result<f64, DataUnavailable> {
        Err(DataUnavailable::NoRows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::registry::KpiRegistry;
    use crate::db::Observation;

    #[test]
    fn test_sqlite_source_distinguishes_no_rows_from_value() {
        let db = Arc::new(Database::open_in_memory().expect("db"));
        db.migrate().expect("migrate");
        let registry = KpiRegistry::builtin().unwrap();
        let kpi = registry.get("cc_aht").unwrap();
        let source = SqliteDataSource::new(db.clone());
        let window = DateRange::trailing_hours(24);

        assert_eq!(
            source.aggregate(1, kpi, &window),
            Err(DataUnavailable::NoRows)
        );

        db.insert_observation(&Observation {
            tenant_id: 1,
            kpi_id: "cc_aht".to_string(),
            observed_at: Utc::now() - chrono::Duration::hours(1),
            value: 200.0,
            source: None,
        })
        .unwrap();

        assert_eq!(source.aggregate(1, kpi, &window), Ok(200.0));
    }

    #[test]
    fn test_null_source_always_reports_no_rows() {
        let registry = KpiRegistry::builtin().unwrap();
        let kpi = registry.get("mb_active_users").unwrap();
        let window = DateRange::trailing_hours(24);
        assert_eq!(
            NullDataSource.aggregate(7, kpi, &window),
            Err(DataUnavailable::NoRows)
        );
    }
}
