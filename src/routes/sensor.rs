//! `/sensor` ingestion and retrieval endpoints.
//!
//! Sibling module in the `routes` directory following the Explicit Module
//! Boundary Pattern (EMBP): the handlers here are internal, and `mod.rs`
//! merges the exported subrouter into the top-level API router.
//!
//! Both handlers are thin: extract, validate, call the store, respond.
//! All conditional logic lives in `validate` and `query`.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use tracing::{debug, error, info};

use crate::store::{PgRecordStore, StoreError};
use crate::{validate, ApiError, RawReading, ReadParams};

// ---

pub fn router() -> Router<PgRecordStore> {
    // ---
    Router::new().route("/sensor", get(read_readings).post(ingest_reading))
}

/// Handle `POST /sensor`.
///
/// Validates the untyped body field by field (fixed order, first failure
/// wins), inserts the typed reading, and echoes the stored row back with
/// its server-assigned metadata. Validation failures are 400 with the
/// offending field's message; store rejections (including duplicate
/// (sensor_id, date) pairs) are 400 with the underlying detail.
async fn ingest_reading(
    State(store): State<PgRecordStore>,
    Json(body): Json<RawReading>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    debug!("POST /sensor - validating payload");

    let reading = validate::validate_reading(&body)?;

    let stored = store.insert(&reading).await.map_err(|e| {
        match &e {
            StoreError::Duplicate(_) => {
                info!(sensor_id = reading.sensor_id, "duplicate reading rejected")
            }
            StoreError::Backend(_) => error!("failed to save reading: {}", e),
        }
        ApiError::Constraint {
            message: "Error saving sensor data".into(),
            detail: e.to_string(),
        }
    })?;

    info!(
        sensor_id = stored.sensor_id,
        id = stored.id,
        "stored reading"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Handle `GET /sensor`.
///
/// Parses the recognized query parameters into a filter (unknown ones are
/// ignored), then either fetches the matching readings or, when both
/// `metrics` and `statistic` are present, runs the per-sensor grouped
/// aggregation. Filter validation failures are 400; storage failures on
/// this path are 500.
async fn read_readings(
    State(store): State<PgRecordStore>,
    Query(params): Query<ReadParams>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    debug!("GET /sensor - params: {:?}", params);

    let request = validate::parse_read_request(&params)?;

    let storage_failed = |e: StoreError| {
        error!("failed to retrieve readings: {}", e);
        ApiError::Storage {
            message: "Error retrieving sensor data".into(),
            detail: e.to_string(),
        }
    };

    let body = match &request.aggregate {
        Some(spec) => {
            let rows = store
                .aggregate(&request.filter, spec)
                .await
                .map_err(storage_failed)?;
            info!("aggregation returned {} groups", rows.len());
            serde_json::to_value(rows).map_err(|e| ApiError::Storage {
                message: "Error retrieving sensor data".into(),
                detail: e.to_string(),
            })?
        }
        None => {
            let readings = store.find(&request.filter).await.map_err(storage_failed)?;
            info!("query returned {} readings", readings.len());
            serde_json::to_value(readings).map_err(|e| ApiError::Storage {
                message: "Error retrieving sensor data".into(),
                detail: e.to_string(),
            })?
        }
    };

    Ok((StatusCode::OK, Json(body)))
}
