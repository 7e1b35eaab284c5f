//! Database layer for bankpulse
//!
//! This module provides the observation store using SQLite with:
//! - Schema migrations
//! - Repository pattern for inserts and window aggregations

pub mod repo;
pub mod schema;

pub use repo::{Database, Observation};
