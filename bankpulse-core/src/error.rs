//! Error types for bankpulse-core

use thiserror::Error;

/// Main error type for the bankpulse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Requested KPI id absent from the registry
    #[error("KPI not found: {0}")]
    KpiNotFound(String),

    /// Tenant identifier failed input validation
    #[error("invalid tenant id: {0}")]
    InvalidTenant(i64),
}

/// Result type alias for bankpulse-core
pub type Result<T> = std::result::Result<T, Error>;
