//! KPI definition registry for lookup and discovery.
//!
//! The registry is constructed once at startup from a static catalog,
//! validated eagerly, and never mutated afterwards. Both the
//! calculation engine and the series synthesizer hold a shared handle
//! to it.

use crate::error::{Error, Result};
use crate::types::{Domain, KpiDefinition, Priority};
use std::collections::HashMap;

/// Immutable catalog of KPI definitions.
pub struct KpiRegistry {
    definitions: Vec<KpiDefinition>,
    by_id: HashMap<String, usize>,
}

impl KpiRegistry {
    /// Build a registry from a catalog, validating every entry.
    ///
    /// A malformed catalog is a fatal configuration error; per-call
    /// lookups never fail for this reason.
    pub fn new(definitions: Vec<KpiDefinition>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(definitions.len());

        for (idx, def) in definitions.iter().enumerate() {
            if def.id.is_empty() {
                return Err(Error::Config(format!(
                    "KPI definition at index {} has an empty id",
                    idx
                )));
            }
            if def.name.is_empty() {
                return Err(Error::Config(format!("KPI {} has an empty name", def.id)));
            }
            if !def.target.is_finite() || !def.threshold.is_finite() {
                return Err(Error::Config(format!(
                    "KPI {} has non-finite target/threshold",
                    def.id
                )));
            }
            if by_id.insert(def.id.clone(), idx).is_some() {
                return Err(Error::Config(format!("duplicate KPI id: {}", def.id)));
            }
        }

        tracing::info!(count = definitions.len(), "KPI registry loaded");

        Ok(Self { definitions, by_id })
    }

    /// Build the registry from the built-in banking catalog.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_catalog())
    }

    /// Look up a definition by exact id.
    pub fn get(&self, id: &str) -> Option<&KpiDefinition> {
        self.by_id.get(id).map(|&idx| &self.definitions[idx])
    }

    /// Definitions for a domain, optionally narrowed to one priority.
    ///
    /// When `priority` is omitted the union across critical, medium,
    /// low is returned in that fixed tier order; insertion order is
    /// preserved within a tier.
    pub fn by_domain_and_priority(
        &self,
        domain: Domain,
        priority: Option<Priority>,
    ) -> Vec<&KpiDefinition> {
        let tiers: &[Priority] = match priority {
            Some(ref p) => std::slice::from_ref(p),
            None => &Priority::ALL,
        };

        tiers
            .iter()
            .flat_map(|tier| {
                self.definitions
                    .iter()
                    .filter(move |d| d.domain == domain && d.priority == *tier)
            })
            .collect()
    }

    /// All definitions in catalog order.
    pub fn all(&self) -> &[KpiDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn def(
    id: &str,
    name: &str,
    description: &str,
    domain: Domain,
    priority: Priority,
    unit: &str,
    target: f64,
    threshold: f64,
    calculation: Option<&str>,
) -> KpiDefinition {
    KpiDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        domain,
        priority,
        unit: unit.to_string(),
        target,
        threshold,
        calculation: calculation.map(str::to_string),
    }
}

/// The built-in banking KPI catalog: 18 contact-center and 18
/// mobile-banking definitions across three priority tiers.
pub fn builtin_catalog() -> Vec<KpiDefinition> {
    use Domain::{ContactCenter as CC, MobileBanking as MB};
    use Priority::{Critical, Low, Medium};

    vec![
        // Contact center, critical
        def(
            "cc_aht",
            "Average Handle Time",
            "Average duration of a call including talk time and after-call work",
            CC,
            Critical,
            "seconds",
            180.0,
            240.0,
            Some("AVG(talk_time + after_call_work) over calls"),
        ),
        def(
            "cc_csat",
            "Customer Satisfaction",
            "Average satisfaction score from post-call surveys",
            CC,
            Critical,
            "%",
            85.0,
            70.0,
            Some("AVG(survey_score) over post_call_surveys"),
        ),
        def(
            "cc_fcr",
            "First Call Resolution",
            "Percentage of calls resolved without need for follow-up",
            CC,
            Critical,
            "%",
            75.0,
            60.0,
            Some("COUNT(resolved_first_contact) / COUNT(*) over calls"),
        ),
        def(
            "cc_sentiment",
            "Average Call Sentiment",
            "Average sentiment score from call transcripts",
            CC,
            Critical,
            "%",
            70.0,
            50.0,
            Some("AVG(sentiment_score) over call_transcripts"),
        ),
        def(
            "cc_agent_occupancy",
            "Agent Occupancy",
            "Percentage of time agents are actively handling calls",
            CC,
            Critical,
            "%",
            85.0,
            70.0,
            Some("SUM(handling_time) / SUM(logged_in_time) over agent_shifts"),
        ),
        def(
            "cc_abandon_rate",
            "Call Abandon Rate",
            "Percentage of calls abandoned before agent connection",
            CC,
            Critical,
            "%",
            3.0,
            7.0,
            Some("COUNT(abandoned) / COUNT(*) over calls"),
        ),
        // Contact center, medium
        def(
            "cc_repeat_call_rate",
            "Repeat Call Rate",
            "Percentage of callers who call back within 7 days",
            CC,
            Medium,
            "%",
            15.0,
            25.0,
            None,
        ),
        def(
            "cc_after_call_work",
            "Average After Call Work Time",
            "Average time spent by agents on post-call processing",
            CC,
            Medium,
            "seconds",
            60.0,
            120.0,
            None,
        ),
        def(
            "cc_language_distribution",
            "Call Language Distribution",
            "Percentage breakdown of calls by language (English/Arabic)",
            CC,
            Medium,
            "%",
            70.0,
            50.0,
            None,
        ),
        def(
            "cc_call_abandonment_time",
            "Average Abandonment Time",
            "Average time before callers abandon their calls",
            CC,
            Medium,
            "seconds",
            30.0,
            60.0,
            None,
        ),
        def(
            "cc_call_type_ratio",
            "Inbound to Outbound Ratio",
            "Ratio of inbound calls to outbound calls",
            CC,
            Medium,
            "ratio",
            4.0,
            6.0,
            None,
        ),
        def(
            "cc_avg_talk_time",
            "Average Talk Time",
            "Average time agents spend talking during calls",
            CC,
            Medium,
            "seconds",
            180.0,
            240.0,
            None,
        ),
        // Contact center, low
        def(
            "cc_agent_csat",
            "Agent-Specific CSAT",
            "Average customer satisfaction score per agent",
            CC,
            Low,
            "%",
            85.0,
            70.0,
            None,
        ),
        def(
            "cc_topic_distribution",
            "Call Topic Distribution",
            "Percentage breakdown of calls by main topic",
            CC,
            Low,
            "%",
            20.0,
            10.0,
            None,
        ),
        def(
            "cc_transfers_by_agent",
            "Transfers by Agent",
            "Number of call transfers initiated by each agent",
            CC,
            Low,
            "transfers",
            5.0,
            10.0,
            None,
        ),
        def(
            "cc_silence_periods",
            "Silence Periods",
            "Average duration of silence periods during calls",
            CC,
            Low,
            "seconds",
            10.0,
            20.0,
            None,
        ),
        def(
            "cc_callback_adherence",
            "Callback Adherence",
            "Percentage of callbacks made within promised timeframe",
            CC,
            Low,
            "%",
            90.0,
            80.0,
            None,
        ),
        def(
            "cc_cross_selling",
            "Cross-Selling Success Rate",
            "Success rate of cross-selling attempts during calls",
            CC,
            Low,
            "%",
            15.0,
            5.0,
            None,
        ),
        // Mobile banking, critical
        def(
            "mb_login_success",
            "App Login Success Rate",
            "Percentage of successful logins to the mobile banking app",
            MB,
            Critical,
            "%",
            98.0,
            95.0,
            Some("COUNT(successful) / COUNT(*) over login_attempts"),
        ),
        def(
            "mb_transaction_success",
            "Transaction Success Rate",
            "Percentage of successfully completed financial transactions",
            MB,
            Critical,
            "%",
            99.0,
            97.0,
            Some("COUNT(completed) / COUNT(*) over transactions"),
        ),
        def(
            "mb_active_users",
            "Daily Active Users",
            "Number of unique users accessing the app per day",
            MB,
            Critical,
            "users",
            50_000.0,
            30_000.0,
            Some("COUNT(DISTINCT user_id) over app_sessions"),
        ),
        def(
            "mb_transaction_volume",
            "Daily Transaction Volume",
            "Number of financial transactions processed per day",
            MB,
            Critical,
            "transactions",
            100_000.0,
            70_000.0,
            Some("COUNT(*) over transactions"),
        ),
        def(
            "mb_transaction_value",
            "Daily Transaction Value",
            "Total monetary value of transactions processed per day",
            MB,
            Critical,
            "currency",
            10_000_000.0,
            5_000_000.0,
            Some("SUM(amount) over transactions"),
        ),
        def(
            "mb_app_crash",
            "App Crash Rate",
            "Percentage of sessions that end with an app crash",
            MB,
            Critical,
            "%",
            0.5,
            2.0,
            Some("COUNT(crashed) / COUNT(*) over app_sessions"),
        ),
        // Mobile banking, medium
        def(
            "mb_login_failure",
            "Login Failure Rate",
            "Percentage of failed login attempts",
            MB,
            Medium,
            "%",
            2.0,
            5.0,
            None,
        ),
        def(
            "mb_session_per_user",
            "Average Sessions Per User",
            "Average number of app sessions per user per day",
            MB,
            Medium,
            "sessions",
            3.0,
            1.5,
            None,
        ),
        def(
            "mb_funnel_conversion",
            "Transaction Funnel Conversion",
            "Completion rate through transaction initiation to submission",
            MB,
            Medium,
            "%",
            85.0,
            70.0,
            None,
        ),
        def(
            "mb_error_rate",
            "Transaction Error Rate",
            "Percentage of transactions resulting in errors",
            MB,
            Medium,
            "%",
            0.5,
            2.0,
            None,
        ),
        def(
            "mb_session_timeout",
            "Session Timeout Rate",
            "Percentage of sessions ending due to timeout",
            MB,
            Medium,
            "%",
            10.0,
            20.0,
            None,
        ),
        def(
            "mb_transaction_by_type",
            "Transaction Type Distribution",
            "Percentage breakdown of transactions by type",
            MB,
            Medium,
            "%",
            25.0,
            15.0,
            None,
        ),
        // Mobile banking, low
        def(
            "mb_tx_by_merchant",
            "Transaction by Merchant Category",
            "Percentage breakdown of transactions by merchant category",
            MB,
            Low,
            "%",
            25.0,
            15.0,
            None,
        ),
        def(
            "mb_user_age_distribution",
            "User Age Distribution",
            "Percentage breakdown of users by age group",
            MB,
            Low,
            "%",
            25.0,
            15.0,
            None,
        ),
        def(
            "mb_feature_usage",
            "Feature Usage Distribution",
            "Breakdown of app feature usage across user base",
            MB,
            Low,
            "%",
            30.0,
            20.0,
            None,
        ),
        def(
            "mb_time_to_first_action",
            "Time to First Action",
            "Average time before user takes first action after login",
            MB,
            Low,
            "seconds",
            10.0,
            20.0,
            None,
        ),
        def(
            "mb_user_retention",
            "User Retention Rate",
            "Percentage of users who return within 30 days",
            MB,
            Low,
            "%",
            85.0,
            70.0,
            None,
        ),
        def(
            "mb_feedback_sentiment",
            "App Feedback Sentiment",
            "Sentiment analysis of user feedback comments",
            MB,
            Low,
            "%",
            75.0,
            60.0,
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let registry = KpiRegistry::builtin().expect("catalog is valid");
        assert_eq!(registry.len(), 36);
    }

    #[test]
    fn test_get_by_id() {
        let registry = KpiRegistry::builtin().unwrap();

        let aht = registry.get("cc_aht").expect("cc_aht exists");
        assert_eq!(aht.unit, "seconds");
        assert_eq!(aht.target, 180.0);
        assert_eq!(aht.threshold, 240.0);

        assert!(registry.get("does-not-exist").is_none());
    }

    #[test]
    fn test_lookups_are_idempotent() {
        let registry = KpiRegistry::builtin().unwrap();
        let first = registry.get("mb_app_crash").unwrap().clone();
        let second = registry.get("mb_app_crash").unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_domain_priority_filter() {
        let registry = KpiRegistry::builtin().unwrap();

        for domain in [Domain::ContactCenter, Domain::MobileBanking] {
            for priority in Priority::ALL {
                let tier = registry.by_domain_and_priority(domain, Some(priority));
                assert!(!tier.is_empty(), "{:?}/{:?} tier empty", domain, priority);
                assert!(tier.iter().all(|d| d.domain == domain));
                assert!(tier.iter().all(|d| d.priority == priority));
            }
        }
    }

    #[test]
    fn test_union_respects_tier_order() {
        let registry = KpiRegistry::builtin().unwrap();
        let all_cc = registry.by_domain_and_priority(Domain::ContactCenter, None);
        assert_eq!(all_cc.len(), 18);

        // Critical tier first, then medium, then low
        let mut last_tier = 0usize;
        for d in &all_cc {
            let tier = Priority::ALL.iter().position(|p| *p == d.priority).unwrap();
            assert!(tier >= last_tier, "tiers out of order");
            last_tier = tier;
        }
        assert_eq!(all_cc[0].id, "cc_aht");
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let mut catalog = builtin_catalog();
        let dup = catalog[0].clone();
        catalog.push(dup);
        assert!(matches!(
            KpiRegistry::new(catalog),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn test_non_finite_target_is_fatal() {
        let mut catalog = builtin_catalog();
        catalog[3].target = f64::NAN;
        assert!(matches!(
            KpiRegistry::new(catalog),
            Err(crate::Error::Config(_))
        ));
    }
}
