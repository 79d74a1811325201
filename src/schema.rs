//! Database schema management for `weathervane-telemetry`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the database schema if it does not exist (idempotent).
///
/// Creates the `weather_readings` table and its indexes, including the
/// unique (sensor_id, date) index that makes duplicate observations a
/// constraint violation instead of silent double-ingestion. Safe to call
/// on every startup.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // One row per accepted reading; rows are never updated or deleted.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weather_readings (
            id              BIGSERIAL PRIMARY KEY,
            sensor_id       BIGINT           NOT NULL,
            date            TIMESTAMPTZ      NOT NULL,
            temperature     DOUBLE PRECISION NOT NULL,
            humidity        DOUBLE PRECISION NOT NULL,
            wind_speed      DOUBLE PRECISION NOT NULL,
            pressure        DOUBLE PRECISION,
            precipitation   DOUBLE PRECISION,
            wind_direction  DOUBLE PRECISION,
            solar_radiation DOUBLE PRECISION,
            uv_index        DOUBLE PRECISION,
            visibility      DOUBLE PRECISION,
            cloud_cover     DOUBLE PRECISION,
            created_at      TIMESTAMPTZ      NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // One observation per sensor per instant.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_weather_readings_sensor_date
            ON weather_readings (sensor_id, date);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Date-range filters hit this one.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_weather_readings_date
            ON weather_readings (date);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
