//! Core domain types for bankpulse
//!
//! These types form the data model shared by the registry, the
//! calculation engine, and the series synthesizer.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **KPI** | A named, unit-bearing business metric with a target and alert threshold |
//! | **Tenant** | An isolated banking-customer organization; every computed value is scoped to one |
//! | **Domain** | The business area a KPI belongs to (contact center, mobile banking) |
//! | **Trend** | Directional classification of a KPI's recent change, possibly inverted for lower-is-better metrics |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Enumerations
// ============================================

/// Business area that partitions the KPI catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    ContactCenter,
    MobileBanking,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::ContactCenter => "contact_center",
            Domain::MobileBanking => "mobile_banking",
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "contact_center" => Ok(Domain::ContactCenter),
            "mobile_banking" => Ok(Domain::MobileBanking),
            _ => Err(format!("unknown domain: {}", s)),
        }
    }
}

/// Default visibility/ordering tier for a KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    Medium,
    Low,
}

impl Priority {
    /// Fixed tier order used when a priority filter is omitted.
    pub const ALL: [Priority; 3] = [Priority::Critical, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Priority::Critical),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("unknown priority: {}", s)),
        }
    }
}

/// Directional classification of recent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Flat => "flat",
        }
    }

    /// Flip direction for KPIs where a rising value is a bad sign.
    pub fn inverted(&self) -> Trend {
        match self {
            Trend::Up => Trend::Down,
            Trend::Down => Trend::Up,
            Trend::Flat => Trend::Flat,
        }
    }
}

/// Status of a computed value relative to target and threshold.
///
/// Derivation rule: `value >= target` is on-target, otherwise
/// `value >= threshold` is a warning, anything below is an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    OnTarget,
    Warning,
    Alert,
}

impl KpiStatus {
    /// Classify a value against its definition's target and threshold.
    pub fn derive(value: f64, target: f64, threshold: f64) -> KpiStatus {
        if value >= target {
            KpiStatus::OnTarget
        } else if value >= threshold {
            KpiStatus::Warning
        } else {
            KpiStatus::Alert
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KpiStatus::OnTarget => "on_target",
            KpiStatus::Warning => "warning",
            KpiStatus::Alert => "alert",
        }
    }
}

// ============================================
// KPI definition
// ============================================

/// Immutable catalog entry describing one KPI.
///
/// Definitions are created once at startup by the registry and never
/// mutated afterwards; computed values reference them by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    /// Stable identifier, unique within the registry (e.g. "cc_aht")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Business area this KPI belongs to
    pub domain: Domain,
    /// Default visibility tier
    pub priority: Priority,
    /// Unit string governing value formatting ("%", "seconds", "users", ...)
    pub unit: String,
    /// Numeric goal value
    pub target: f64,
    /// Value beyond which the KPI is in alert state
    pub threshold: f64,
    /// Optional reference to the source aggregation, surfaced for
    /// transparency only; the numeric logic never interprets it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
}

impl KpiDefinition {
    /// Whether a rising value is a good sign for this KPI.
    ///
    /// Preserved substring heuristic over the display name; several
    /// dashboard pages depend on its exact output.
    pub fn higher_is_better(&self) -> bool {
        !self.name.contains("Wait")
            && !self.name.contains("Duration")
            && !self.name.contains("Time")
            && !self.name.contains("Error")
    }
}

// ============================================
// Computed observations
// ============================================

/// A computed KPI paired with its definition, the shape a dashboard
/// consumes per widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiReport {
    #[serde(flatten)]
    pub definition: KpiDefinition,
    pub tenant_id: i64,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl KpiReport {
    /// Status of this report's value against its own definition.
    pub fn status(&self) -> KpiStatus {
        KpiStatus::derive(self.value, self.definition.target, self.definition.threshold)
    }
}

// ============================================
// Time series
// ============================================

/// One daily point in a KPI time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A KPI definition extended with a trailing year of daily history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiWithHistory {
    #[serde(flatten)]
    pub definition: KpiDefinition,
    pub current_value: f64,
    pub trend: Trend,
    pub trend_percentage: f64,
    /// Ordered ascending by date, one point per day, no gaps
    pub historical_data: Vec<TimeSeriesPoint>,
}

impl KpiWithHistory {
    /// Slice the history to an inclusive date range.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> Vec<TimeSeriesPoint> {
        self.historical_data
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_derivation_boundaries() {
        // target=100, threshold=70
        assert_eq!(KpiStatus::derive(105.0, 100.0, 70.0), KpiStatus::OnTarget);
        assert_eq!(KpiStatus::derive(85.0, 100.0, 70.0), KpiStatus::Warning);
        assert_eq!(KpiStatus::derive(50.0, 100.0, 70.0), KpiStatus::Alert);
        // Boundaries: equality counts toward the better state
        assert_eq!(KpiStatus::derive(100.0, 100.0, 70.0), KpiStatus::OnTarget);
        assert_eq!(KpiStatus::derive(70.0, 100.0, 70.0), KpiStatus::Warning);
    }

    #[test]
    fn test_higher_is_better_heuristic() {
        let mut def = KpiDefinition {
            id: "cc_aht".to_string(),
            name: "Average Handle Time".to_string(),
            description: String::new(),
            domain: Domain::ContactCenter,
            priority: Priority::Critical,
            unit: "seconds".to_string(),
            target: 180.0,
            threshold: 240.0,
            calculation: None,
        };
        assert!(!def.higher_is_better());

        def.name = "Customer Satisfaction".to_string();
        assert!(def.higher_is_better());

        def.name = "Transaction Error Rate".to_string();
        assert!(!def.higher_is_better());
    }

    #[test]
    fn test_trend_inversion() {
        assert_eq!(Trend::Up.inverted(), Trend::Down);
        assert_eq!(Trend::Down.inverted(), Trend::Up);
        assert_eq!(Trend::Flat.inverted(), Trend::Flat);
    }

    #[test]
    fn test_domain_priority_round_trip() {
        for d in [Domain::ContactCenter, Domain::MobileBanking] {
            assert_eq!(d.as_str().parse::<Domain>().unwrap(), d);
        }
        for p in Priority::ALL {
            assert_eq!(p.as_str().parse::<Priority>().unwrap(), p);
        }
    }

    #[test]
    fn test_history_slice() {
        let def = KpiDefinition {
            id: "mb_active_users".to_string(),
            name: "Daily Active Users".to_string(),
            description: String::new(),
            domain: Domain::MobileBanking,
            priority: Priority::Critical,
            unit: "users".to_string(),
            target: 50_000.0,
            threshold: 30_000.0,
            calculation: None,
        };
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let history = KpiWithHistory {
            definition: def,
            current_value: 3.0,
            trend: Trend::Flat,
            trend_percentage: 0.0,
            historical_data: (0..10)
                .map(|i| TimeSeriesPoint {
                    date: base + chrono::Duration::days(i),
                    value: i as f64,
                })
                .collect(),
        };

        let window = history.slice(
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        );
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].value, 2.0);
        assert_eq!(window[2].value, 4.0);
    }
}
