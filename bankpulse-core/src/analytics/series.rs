//! Yearly time-series synthesis
//!
//! Produces a trailing year of daily synthetic values per KPI for
//! charting and testing. The shape is deliberately "realistic": a
//! gentle linear drift, a weekly or monthly sine cycle, uniform
//! noise, holiday multipliers, and a handful of promotion spikes.
//!
//! The random source is injected so tests can pin the output with a
//! seeded generator; within one call the 365 points share a single
//! continuous noise process.

use super::{round1, round2};
use crate::types::{Domain, KpiDefinition, KpiWithHistory, TimeSeriesPoint, Trend};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Points per generated series.
pub const DAYS_IN_YEAR: usize = 365;

/// Linear drift per day, as a fraction of the running value.
const TREND_STRENGTH: f64 = 0.0003;

/// Sine amplitude as a fraction of target.
const SEASONALITY_AMPLITUDE: f64 = 0.15;

/// Uniform noise half-width as a fraction of target.
const VOLATILITY: f64 = 0.05;

/// Day indices of the fixed holidays (New Year through Christmas).
const HOLIDAY_DAYS: [usize; 7] = [1, 45, 105, 170, 220, 300, 359];

/// Number of random promotion spikes per series.
const PROMO_COUNT: usize = 5;

/// Days between the last point and the comparison point for the
/// trailing trend percentage.
const TREND_WINDOW_DAYS: usize = 30;

/// Synthesizes yearly KPI series from an injected random source.
pub struct SeriesGenerator<R: Rng> {
    rng: R,
}

impl SeriesGenerator<StdRng> {
    /// Generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for SeriesGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SeriesGenerator<R> {
    /// Generator over a caller-supplied random source (seeded in tests).
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate one year of daily data for a KPI.
    ///
    /// Returns exactly [`DAYS_IN_YEAR`] points, oldest first, the last
    /// one falling on today. Values are floored at zero and rounded to
    /// two decimals.
    pub fn generate_year(&mut self, kpi: &KpiDefinition, tenant_id: i64) -> KpiWithHistory {
        let today = Utc::now().date_naive();
        let start = today - Duration::days(DAYS_IN_YEAR as i64 - 1);

        let trend = self.pick_trend(&kpi.name);
        let events = self.special_events(kpi.domain);
        let values = self.smooth_sequence(kpi, trend, &events);

        let historical_data: Vec<TimeSeriesPoint> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| TimeSeriesPoint {
                date: start + Duration::days(i as i64),
                value,
            })
            .collect();

        let current_value = values[DAYS_IN_YEAR - 1];
        let previous_value = values[DAYS_IN_YEAR - TREND_WINDOW_DAYS];
        let trend_percentage = if previous_value == 0.0 {
            0.0
        } else {
            round1((current_value - previous_value) / previous_value * 100.0)
        };

        let raw_trend = classify_trend(trend_percentage);
        let display_trend = if kpi.higher_is_better() {
            raw_trend
        } else {
            raw_trend.inverted()
        };

        tracing::debug!(
            kpi_id = %kpi.id,
            tenant_id,
            ?display_trend,
            trend_percentage,
            "Generated yearly series"
        );

        KpiWithHistory {
            definition: kpi.clone(),
            current_value,
            trend: display_trend,
            trend_percentage,
            historical_data,
        }
    }

    /// Generate yearly data for several KPIs, independently per KPI.
    pub fn generate_year_for_many(
        &mut self,
        tenant_id: i64,
        kpis: &[KpiDefinition],
    ) -> Vec<KpiWithHistory> {
        kpis.iter()
            .map(|kpi| self.generate_year(kpi, tenant_id))
            .collect()
    }

    /// Weighted trend draw. Names carrying "Rate" or "Score" lean
    /// upward (0.6/0.2/0.2); everything else is 0.4/0.4/0.2.
    fn pick_trend(&mut self, name: &str) -> Trend {
        let weights: [f64; 3] = if name.contains("Rate") || name.contains("Score") {
            [0.6, 0.2, 0.2]
        } else {
            [0.4, 0.4, 0.2]
        };

        let draw: f64 = self.rng.gen();
        let mut cumulative = 0.0;
        for (trend, weight) in [Trend::Up, Trend::Down, Trend::Flat].into_iter().zip(weights) {
            cumulative += weight;
            if draw <= cumulative {
                return trend;
            }
        }
        Trend::Flat
    }

    /// Holiday and promotion multipliers as `(day_index, multiplier)`.
    ///
    /// Holidays mean more calls for the contact center (1.5x) and less
    /// app usage for mobile banking (0.7x). Five random days get a
    /// promotion spike in [1.3, 2.0).
    fn special_events(&mut self, domain: Domain) -> Vec<(usize, f64)> {
        let holiday_multiplier = match domain {
            Domain::ContactCenter => 1.5,
            Domain::MobileBanking => 0.7,
        };

        let mut events: Vec<(usize, f64)> = HOLIDAY_DAYS
            .iter()
            .map(|&day| (day, holiday_multiplier))
            .collect();

        for _ in 0..PROMO_COUNT {
            let day = self.rng.gen_range(0..DAYS_IN_YEAR);
            let multiplier = 1.3 + self.rng.gen::<f64>() * 0.7;
            events.push((day, multiplier));
        }

        events
    }

    /// Base sequence: drift + seasonality + noise + events, floored at
    /// zero and rounded to two decimals.
    fn smooth_sequence(
        &mut self,
        kpi: &KpiDefinition,
        trend: Trend,
        events: &[(usize, f64)],
    ) -> Vec<f64> {
        // Weekly cycle for call traffic, monthly for app usage
        let period = match kpi.domain {
            Domain::ContactCenter => 7.0,
            Domain::MobileBanking => 30.0,
        };

        let mut values = Vec::with_capacity(DAYS_IN_YEAR);
        for i in 0..DAYS_IN_YEAR {
            let day = i as f64;
            let mut value = kpi.target;

            match trend {
                Trend::Up => value += value * TREND_STRENGTH * day,
                Trend::Down => value -= value * TREND_STRENGTH * day,
                Trend::Flat => {}
            }

            value +=
                (2.0 * std::f64::consts::PI * day / period).sin() * SEASONALITY_AMPLITUDE * kpi.target;

            value += (self.rng.gen::<f64>() - 0.5) * 2.0 * VOLATILITY * kpi.target;

            // First matching event wins when a promo lands on a holiday
            if let Some(&(_, multiplier)) = events.iter().find(|(d, _)| *d == i) {
                value *= multiplier;
            }

            values.push(round2(value.max(0.0)));
        }

        values
    }
}

/// Classify a trailing-window percentage change. Anything inside
/// ±1% reads as flat.
pub fn classify_trend(trend_percentage: f64) -> Trend {
    if trend_percentage.abs() < 1.0 {
        Trend::Flat
    } else if trend_percentage > 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}
