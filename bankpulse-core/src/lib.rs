//! # bankpulse-core
//!
//! Core library for bankpulse - a multi-tenant banking KPI analytics engine.
//!
//! This library provides:
//! - An immutable KPI definition registry (contact center + mobile banking)
//! - A per-tenant KPI calculation engine with graceful synthetic fallback
//! - A yearly time-series synthesizer for dashboards and testing
//! - A SQLite observation store backing the real aggregation path
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! The registry is the single source of truth for definitions. The
//! calculation engine resolves a definition, asks its data source for
//! an aggregate scoped to `(tenant, window)`, and degrades to a
//! deterministic synthetic value when no data is available. The series
//! synthesizer reuses the same definitions to produce a trailing year
//! of daily points.
//!
//! ## Example
//!
//! ```rust
//! use bankpulse_core::analytics::{CalculationEngine, KpiRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(KpiRegistry::builtin().expect("valid catalog"));
//! let engine = CalculationEngine::new(registry);
//! let report = engine.calculate("cc_aht", 1, None).expect("known KPI");
//! assert_eq!(report.definition.unit, "seconds");
//! ```

// Re-export commonly used items at the crate root
pub use analytics::KpiRegistry;
pub use config::Config;
pub use db::{Database, Observation};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod types;
