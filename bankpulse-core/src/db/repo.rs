//! Database repository layer
//!
//! Provides insert and aggregation operations over KPI observations.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Mutex;

/// A raw observation row as stored in `kpi_observations`.
#[derive(Debug, Clone)]
pub struct Observation {
    pub tenant_id: i64,
    pub kpi_id: String,
    pub observed_at: DateTime<Utc>,
    pub value: f64,
    /// Upstream feed that produced the row, if known
    pub source: Option<String>,
}

/// SQLite-backed observation store.
///
/// The connection is wrapped in a mutex; each calculation call issues
/// a single short-lived aggregation query, so contention is not a
/// concern at this layer.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrency with dashboard readers
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Insert a single observation row
    pub fn insert_observation(&self, obs: &Observation) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO kpi_observations (tenant_id, kpi_id, observed_at, value, source)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                obs.tenant_id,
                obs.kpi_id,
                obs.observed_at.to_rfc3339(),
                obs.value,
                obs.source,
            ],
        )?;
        Ok(())
    }

    /// Average observed value for `(tenant, kpi)` within `[start, end)`.
    ///
    /// Returns `None` when the window holds no qualifying rows, so the
    /// caller can distinguish "no data" from a legitimate zero.
    pub fn aggregate_observations(
        &self,
        tenant_id: i64,
        kpi_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            r#"
            SELECT AVG(value)
            FROM kpi_observations
            WHERE tenant_id = ?1 AND kpi_id = ?2
              AND observed_at >= ?3 AND observed_at < ?4
            "#,
            params![tenant_id, kpi_id, start.to_rfc3339(), end.to_rfc3339()],
            |r| r.get::<_, Option<f64>>(0),
        )
        .optional()
        .map(Option::flatten)
        .map_err(Error::from)
    }

    /// Count observation rows for `(tenant, kpi)` within `[start, end)`.
    pub fn observation_count(
        &self,
        tenant_id: i64,
        kpi_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM kpi_observations
            WHERE tenant_id = ?1 AND kpi_id = ?2
              AND observed_at >= ?3 AND observed_at < ?4
            "#,
            params![tenant_id, kpi_id, start.to_rfc3339(), end.to_rfc3339()],
            |r| r.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.migrate().expect("migrate schema");
        db
    }

    fn obs(tenant_id: i64, kpi_id: &str, age_hours: i64, value: f64) -> Observation {
        Observation {
            tenant_id,
            kpi_id: kpi_id.to_string(),
            observed_at: Utc::now() - Duration::hours(age_hours),
            value,
            source: Some("test".to_string()),
        }
    }

    #[test]
    fn test_aggregate_averages_window_rows() {
        let db = seeded_db();
        db.insert_observation(&obs(1, "cc_aht", 1, 170.0)).unwrap();
        db.insert_observation(&obs(1, "cc_aht", 2, 190.0)).unwrap();
        // Outside the window
        db.insert_observation(&obs(1, "cc_aht", 48, 400.0)).unwrap();
        // Different tenant
        db.insert_observation(&obs(2, "cc_aht", 1, 999.0)).unwrap();

        let end = Utc::now();
        let start = end - Duration::hours(24);
        let avg = db.aggregate_observations(1, "cc_aht", start, end).unwrap();
        assert_eq!(avg, Some(180.0));
        assert_eq!(db.observation_count(1, "cc_aht", start, end).unwrap(), 2);
    }

    #[test]
    fn test_aggregate_empty_window_is_none() {
        let db = seeded_db();
        let end = Utc::now();
        let start = end - Duration::hours(24);
        let avg = db.aggregate_observations(1, "cc_csat", start, end).unwrap();
        assert_eq!(avg, None);
    }
}
