//! bankpulse - CLI for the banking KPI analytics core
//!
//! Lists the KPI catalog, computes current values per tenant, and
//! synthesizes yearly history for dashboard-style inspection.

use anyhow::{Context, Result};
use bankpulse_core::analytics::{
    trend_is_positive, BatchOutcome, CalculationEngine, DateRange, SeriesGenerator,
    SqliteDataSource,
};
use bankpulse_core::format::format_value;
use bankpulse_core::{Config, Database, Domain, KpiRegistry, Observation, Priority};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "bankpulse")]
#[command(about = "Banking KPI analytics for contact center and mobile banking")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the KPI catalog
    Kpis {
        /// Restrict to one domain (contact_center or mobile_banking)
        #[arg(short, long)]
        domain: Option<Domain>,

        /// Restrict to one priority tier (critical, medium, low)
        #[arg(short, long)]
        priority: Option<Priority>,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Compute current KPI values for a tenant
    Compute {
        /// Tenant to compute for
        #[arg(short, long)]
        tenant: i64,

        /// KPI ids to compute; defaults to all critical KPIs
        ids: Vec<String>,

        /// Window start date (YYYY-MM-DD); defaults to the trailing day
        #[arg(long)]
        since: Option<String>,

        /// Window end date (YYYY-MM-DD, exclusive); defaults to now
        #[arg(long)]
        until: Option<String>,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Synthesize one year of daily history for a KPI
    Series {
        /// Tenant the series belongs to
        #[arg(short, long)]
        tenant: i64,

        /// KPI id to synthesize
        id: String,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Seed the observation store with synthesized recent data
    Seed {
        /// Tenant to seed observations for
        #[arg(short, long)]
        tenant: i64,

        /// Days of history to insert, counting back from today
        #[arg(long, default_value_t = 30)]
        days: usize,

        /// KPI ids to seed; defaults to all critical KPIs
        ids: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard = bankpulse_core::logging::init(&config.logging)
        .context("failed to initialize logging")?;

    let registry = Arc::new(KpiRegistry::builtin().context("failed to build KPI catalog")?);

    match args.command {
        Command::Kpis {
            domain,
            priority,
            format,
        } => cmd_kpis(&registry, domain, priority, &format),
        Command::Compute {
            tenant,
            ids,
            since,
            until,
            format,
        } => cmd_compute(&config, registry, tenant, ids, since, until, &format),
        Command::Series { tenant, id, format } => cmd_series(&registry, tenant, &id, &format),
        Command::Seed { tenant, days, ids } => cmd_seed(&registry, tenant, days, ids),
    }
}

fn cmd_kpis(
    registry: &KpiRegistry,
    domain: Option<Domain>,
    priority: Option<Priority>,
    format: &str,
) -> Result<()> {
    let definitions: Vec<_> = match domain {
        Some(d) => registry.by_domain_and_priority(d, priority),
        None => registry
            .all()
            .iter()
            .filter(|def| priority.map_or(true, |p| def.priority == p))
            .collect(),
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    for def in &definitions {
        println!(
            "{:<28} [{:<8}] {:<42} target {:>10}  threshold {:>10}",
            def.id,
            def.priority.as_str(),
            def.name,
            format_value(def.target, &def.unit),
            format_value(def.threshold, &def.unit),
        );
    }
    println!("\n{} KPI(s)", definitions.len());

    Ok(())
}

fn cmd_compute(
    config: &Config,
    registry: Arc<KpiRegistry>,
    tenant: i64,
    ids: Vec<String>,
    since: Option<String>,
    until: Option<String>,
    format: &str,
) -> Result<()> {
    let db_path = Config::database_path();
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let ids = if ids.is_empty() {
        critical_ids(&registry)
    } else {
        ids
    };

    let window = parse_window(since.as_deref(), until.as_deref())?;
    tracing::info!(tenant, kpis = ids.len(), explicit_window = window.is_some(), "computing KPIs");

    let mut engine =
        CalculationEngine::with_source(registry, Box::new(SqliteDataSource::new(Arc::new(db))));
    engine.set_default_window_hours(config.engine.default_window_hours);

    let outcomes = engine.calculate_many(tenant, &ids, window)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    let mut failures = 0usize;
    for outcome in &outcomes {
        match outcome {
            BatchOutcome::Value(report) => {
                let marker = if trend_is_positive(report.value, report.definition.target) {
                    "+"
                } else {
                    "-"
                };
                println!(
                    "[{:<9}] {} {:<28} {:>10}  (target {})",
                    report.status().as_str(),
                    marker,
                    report.definition.id,
                    format_value(report.value, &report.definition.unit),
                    format_value(report.definition.target, &report.definition.unit),
                );
            }
            BatchOutcome::Failed { id, error } => {
                failures += 1;
                println!("[failed   ]   {:<28} {}", id, error);
            }
        }
    }
    println!(
        "\nComputed {} KPI(s) for tenant {}, {} failed",
        outcomes.len() - failures,
        tenant,
        failures
    );

    Ok(())
}

fn cmd_series(registry: &KpiRegistry, tenant: i64, id: &str, format: &str) -> Result<()> {
    let kpi = registry
        .get(id)
        .with_context(|| format!("no such KPI: {}", id))?;

    let mut generator = SeriesGenerator::new();
    let history = generator.generate_year(kpi, tenant);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    println!("{} ({}) for tenant {}", kpi.name, kpi.id, tenant);
    println!(
        "  current {}  trend {} ({:+.1}%)",
        format_value(history.current_value, &kpi.unit),
        history.trend.as_str(),
        history.trend_percentage,
    );

    let min = history
        .historical_data
        .iter()
        .map(|p| p.value)
        .fold(f64::INFINITY, f64::min);
    let max = history
        .historical_data
        .iter()
        .map(|p| p.value)
        .fold(f64::NEG_INFINITY, f64::max);
    println!(
        "  {} points, min {}  max {}",
        history.historical_data.len(),
        format_value(min, &kpi.unit),
        format_value(max, &kpi.unit),
    );

    println!("  last 14 days:");
    for point in history.historical_data.iter().rev().take(14).rev() {
        println!(
            "    {}  {}",
            point.date,
            format_value(point.value, &kpi.unit)
        );
    }

    Ok(())
}

fn cmd_seed(registry: &KpiRegistry, tenant: i64, days: usize, ids: Vec<String>) -> Result<()> {
    let db_path = Config::database_path();
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let ids = if ids.is_empty() {
        critical_ids(registry)
    } else {
        ids
    };

    tracing::info!(tenant, days, kpis = ids.len(), "seeding observations");

    let mut generator = SeriesGenerator::new();
    let mut inserted = 0usize;

    for id in &ids {
        let kpi = registry
            .get(id)
            .with_context(|| format!("no such KPI: {}", id))?;
        let history = generator.generate_year(kpi, tenant);

        for point in history.historical_data.iter().rev().take(days) {
            // Midnight keeps even today's row inside a trailing window
            let observed_at = point
                .date
                .and_hms_opt(0, 0, 0)
                .with_context(|| format!("invalid seed timestamp for {}", point.date))?
                .and_utc();
            db.insert_observation(&Observation {
                tenant_id: tenant,
                kpi_id: kpi.id.clone(),
                observed_at,
                value: point.value,
                source: Some("seed".to_string()),
            })?;
            inserted += 1;
        }
    }

    println!(
        "Seeded {} observation(s) across {} KPI(s) for tenant {}",
        inserted,
        ids.len(),
        tenant
    );

    Ok(())
}

fn critical_ids(registry: &KpiRegistry) -> Vec<String> {
    registry
        .all()
        .iter()
        .filter(|def| def.priority == Priority::Critical)
        .map(|def| def.id.clone())
        .collect()
}

/// Build an explicit aggregation window from `--since`/`--until`.
///
/// Dates are whole days: the start is midnight UTC of `since`, the end
/// is midnight UTC of `until` (exclusive). Returns `None` when neither
/// flag was given so the engine applies its default trailing window.
fn parse_window(since: Option<&str>, until: Option<&str>) -> Result<Option<DateRange>> {
    if since.is_none() && until.is_none() {
        return Ok(None);
    }

    let start = match since {
        Some(s) => day_start(s)?,
        None => DateTime::<Utc>::UNIX_EPOCH,
    };
    let end = match until {
        Some(s) => day_start(s)?,
        None => Utc::now(),
    };

    if start >= end {
        anyhow::bail!("window start {} is not before end {}", start, end);
    }

    Ok(Some(DateRange { start, end }))
}

fn day_start(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", s))?;
    date.and_hms_opt(0, 0, 0)
        .with_context(|| format!("invalid date '{}'", s))
        .map(|dt| dt.and_utc())
}
