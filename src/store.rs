//! PostgreSQL-backed record store.
//!
//! The only component that touches the database. Exposes exactly three
//! operations: `insert` one validated reading, `find` matching readings,
//! and `aggregate` grouped statistics. No ordering is assumed or promised
//! beyond what PostgreSQL returns.

use serde_json::{Map, Number, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row};
use thiserror::Error;

use crate::models::{NewReading, SensorReading};
use crate::query::{self, AggregateSpec, ReadingFilter, READING_COLUMNS};

// ---

/// Storage-layer failures, split so callers can tell a uniqueness race
/// from a backend fault.
#[derive(Debug, Error)]
pub enum StoreError {
    // ---
    /// The unique (sensor_id, date) index rejected the insert.
    #[error("duplicate reading for this sensor and timestamp: {0}")]
    Duplicate(#[source] sqlx::Error),

    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

/// Handle on the readings table. Cheap to clone; shares the pool.
#[derive(Clone)]
pub struct PgRecordStore {
    // ---
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        PgRecordStore { pool }
    }

    /// Insert one validated reading and return the stored row, including
    /// its server-assigned `id` and `created_at`.
    ///
    /// A concurrent write of the same (sensor_id, date) pair loses the race
    /// inside the database and surfaces here as [`StoreError::Duplicate`];
    /// no retry is attempted.
    pub async fn insert(&self, reading: &NewReading) -> Result<SensorReading, StoreError> {
        // ---
        let sql = format!(
            "INSERT INTO weather_readings (sensor_id, date, temperature, humidity, wind_speed, \
             pressure, precipitation, wind_direction, solar_radiation, uv_index, visibility, \
             cloud_cover) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {READING_COLUMNS}"
        );
        sqlx::query_as::<_, SensorReading>(&sql)
            .bind(reading.sensor_id)
            .bind(reading.date)
            .bind(reading.temperature)
            .bind(reading.humidity)
            .bind(reading.wind_speed)
            .bind(reading.pressure)
            .bind(reading.precipitation)
            .bind(reading.wind_direction)
            .bind(reading.solar_radiation)
            .bind(reading.uv_index)
            .bind(reading.visibility)
            .bind(reading.cloud_cover)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    /// All readings matching the filter, in storage order.
    pub async fn find(&self, filter: &ReadingFilter) -> Result<Vec<SensorReading>, StoreError> {
        // ---
        let mut qb = query::select_readings(filter);
        let rows = qb
            .build_query_as::<SensorReading>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// One JSON object per distinct sensor_id among the filtered readings,
    /// carrying the requested `<metric>_<statistic>` fields. The column set
    /// is dynamic, so rows are read off the row descriptor rather than
    /// mapped to a struct.
    pub async fn aggregate(
        &self,
        filter: &ReadingFilter,
        spec: &AggregateSpec,
    ) -> Result<Vec<Map<String, Value>>, StoreError> {
        // ---
        let mut qb = query::select_aggregation(filter, spec);
        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(row_to_json(row)?);
        }
        Ok(out)
    }
}

fn classify(e: sqlx::Error) -> StoreError {
    // ---
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(e),
        _ => StoreError::Backend(e),
    }
}

/// Aggregation row -> JSON object. `sensor_id` is the group key; every
/// other column is a computed f64 statistic (SUM/AVG over an empty group,
/// or over all-NULL optionals, comes back NULL).
fn row_to_json(row: &PgRow) -> Result<Map<String, Value>, sqlx::Error> {
    // ---
    let mut obj = Map::new();
    for col in row.columns() {
        let value = if col.name() == "sensor_id" {
            Value::from(row.try_get::<i64, _>(col.ordinal())?)
        } else {
            match row.try_get::<Option<f64>, _>(col.ordinal())? {
                Some(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
                None => Value::Null,
            }
        };
        obj.insert(col.name().to_string(), value);
    }
    Ok(obj)
}
