//! Dynamic query construction for the read path.
//!
//! A validated [`ReadingFilter`] renders into a WHERE clause with bound
//! parameters; an [`AggregateSpec`] additionally renders a per-sensor
//! grouped SELECT. Column names only ever come from the [`Metric`] enum,
//! never from client input, so the generated SQL is injection-free by
//! construction.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::models::{Metric, Statistic};

// ---

/// Column list of `weather_readings`, in wire order.
pub const READING_COLUMNS: &str = "id, sensor_id, date, temperature, humidity, wind_speed, \
     pressure, precipitation, wind_direction, solar_radiation, uv_index, visibility, \
     cloud_cover, created_at";

const TABLE: &str = "weather_readings";

/// A validated read request: base filter plus optional aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    // ---
    pub filter: ReadingFilter,
    pub aggregate: Option<AggregateSpec>,
}

/// Validated filters of a read request.
///
/// Every active predicate is AND-combined; an empty filter matches every
/// stored record. Metric filters are lower bounds ("at least this much"),
/// deliberately not exact matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingFilter {
    // ---
    pub sensor_id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub metric_minimums: Vec<(Metric, f64)>,
}

impl ReadingFilter {
    /// No active predicates: the rendered query matches every record.
    pub fn is_empty(&self) -> bool {
        // ---
        self.sensor_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.metric_minimums.is_empty()
    }

    /// Append `WHERE …` (or nothing) to a query under construction.
    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        // ---
        let mut sep = " WHERE ";
        if let Some(id) = self.sensor_id {
            qb.push(sep).push("sensor_id = ").push_bind(id);
            sep = " AND ";
        }
        if let Some(start) = self.start_date {
            qb.push(sep).push("date >= ").push_bind(start);
            sep = " AND ";
        }
        if let Some(end) = self.end_date {
            qb.push(sep).push("date <= ").push_bind(end);
            sep = " AND ";
        }
        for (metric, min) in &self.metric_minimums {
            qb.push(sep)
                .push(metric.column())
                .push(" >= ")
                .push_bind(*min);
            sep = " AND ";
        }
    }
}

/// Grouped-aggregation request: which metrics to reduce and how.
///
/// `statistic: None` records that the client named a statistic this
/// service does not recognize; the rendered query then groups by sensor
/// without computing any field rather than rejecting the request.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    // ---
    pub metrics: Vec<Metric>,
    pub statistic: Option<Statistic>,
}

// ---

/// `SELECT <columns> FROM weather_readings [WHERE …]`, full matching rows.
pub fn select_readings(filter: &ReadingFilter) -> QueryBuilder<'static, Postgres> {
    // ---
    let mut qb = QueryBuilder::new(format!("SELECT {READING_COLUMNS} FROM {TABLE}"));
    filter.push_where(&mut qb);
    qb
}

/// One row per distinct sensor_id among the filtered records, carrying a
/// `<metric>_<statistic>` computed field per requested metric.
pub fn select_aggregation(
    filter: &ReadingFilter,
    spec: &AggregateSpec,
) -> QueryBuilder<'static, Postgres> {
    // ---
    let mut qb = QueryBuilder::new("SELECT sensor_id");
    if let Some(stat) = spec.statistic {
        for metric in &spec.metrics {
            let col = metric.column();
            qb.push(format!(
                ", {}({col}) AS {col}_{}",
                stat.sql_fn(),
                stat.suffix()
            ));
        }
    }
    qb.push(format!(" FROM {TABLE}"));
    filter.push_where(&mut qb);
    qb.push(" GROUP BY sensor_id");
    qb
}
