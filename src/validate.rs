//! Request validation for the write and read paths.
//!
//! Both paths are a parse-then-validate boundary: untyped input
//! ([`RawReading`] / [`ReadParams`]) goes in, a fully typed value
//! ([`NewReading`] / [`ReadRequest`]) or a [`ValidationError`] naming the
//! first offending field comes out. Nothing unvalidated reaches the store.
//!
//! Field order is fixed and short-circuits at the first failure:
//! `sensor_id`, then the timestamp(s), then the ten metrics in
//! [`Metric::ALL`] order. A payload with several bad fields is therefore
//! always rejected with the message of the earliest one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::ValidationError;
use crate::models::{Metric, NewReading, RawReading, ReadParams, Statistic};
use crate::query::{AggregateSpec, ReadRequest, ReadingFilter};

// ---

/// Validate a POST body into an insert-ready reading.
///
/// Required fields must be present with the expected JSON type; optional
/// fields are checked only when present. All range checks are inclusive.
pub fn validate_reading(raw: &RawReading) -> Result<NewReading, ValidationError> {
    // ---
    let sensor_id = parse_sensor_id(raw.sensor_id.as_ref())?;

    let date = raw
        .date
        .as_ref()
        .and_then(json_timestamp)
        .ok_or_else(|| ValidationError::new("Invalid date format."))?;

    // Walk the metric table in its fixed order; the first failing field
    // wins. Required metrics come back as Some by construction.
    let mut checked = [None; 10];
    for (slot, metric) in checked.iter_mut().zip(Metric::ALL) {
        *slot = check_metric(metric, raw.metric(metric))?;
    }
    let [temperature, humidity, wind_speed, pressure, precipitation, wind_direction, solar_radiation, uv_index, visibility, cloud_cover] =
        checked;

    let missing = |m: Metric| ValidationError::new(m.invalid_message());
    Ok(NewReading {
        sensor_id,
        date,
        temperature: temperature.ok_or_else(|| missing(Metric::Temperature))?,
        humidity: humidity.ok_or_else(|| missing(Metric::Humidity))?,
        wind_speed: wind_speed.ok_or_else(|| missing(Metric::WindSpeed))?,
        pressure,
        precipitation,
        wind_direction,
        solar_radiation,
        uv_index,
        visibility,
        cloud_cover,
    })
}

/// Validate one metric field from the write payload.
///
/// Absent: an error for required metrics, `None` otherwise. Present: must
/// be a JSON number inside the metric's domain.
fn check_metric(metric: Metric, value: Option<&Value>) -> Result<Option<f64>, ValidationError> {
    // ---
    let reject = || ValidationError::new(metric.invalid_message());
    match value {
        None | Some(Value::Null) => {
            if metric.required() {
                Err(reject())
            } else {
                Ok(None)
            }
        }
        Some(Value::Number(n)) => {
            let v = n.as_f64().filter(|v| metric.contains(*v)).ok_or_else(reject)?;
            Ok(Some(v))
        }
        Some(_) => Err(reject()),
    }
}

/// `sensor_id` must be a JSON number with no fractional part, >= 0.
/// `1.0` is accepted, `1.5` and `"1"` are not.
fn parse_sensor_id(value: Option<&Value>) -> Result<i64, ValidationError> {
    // ---
    let reject = || ValidationError::new("Invalid sensor_id, must be a positive integer.");
    let n = match value {
        Some(Value::Number(n)) => n,
        _ => return Err(reject()),
    };
    if let Some(i) = n.as_i64() {
        if i >= 0 {
            return Ok(i);
        }
    } else if let Some(f) = n.as_f64() {
        if f.fract() == 0.0 && f >= 0.0 && f <= i64::MAX as f64 {
            return Ok(f as i64);
        }
    }
    Err(reject())
}

// ---

/// Validate GET query parameters into a filter plus optional aggregation.
///
/// Recognized filters share the write path's domains and messages;
/// unrecognized parameters never reach this function (serde drops them).
/// Empty-string values for `sensor_id`, the date bounds, `metrics`, and
/// `statistic` are treated as absent.
pub fn parse_read_request(params: &ReadParams) -> Result<ReadRequest, ValidationError> {
    // ---
    let mut filter = ReadingFilter::default();

    if let Some(raw) = present(&params.sensor_id) {
        let id = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::new("Invalid sensor_id, must be an integer."))?;
        filter.sensor_id = Some(id);
    }

    if let Some(raw) = present(&params.start_date) {
        filter.start_date =
            Some(parse_timestamp(raw).ok_or_else(|| ValidationError::new("Invalid date format."))?);
    }
    if let Some(raw) = present(&params.end_date) {
        filter.end_date =
            Some(parse_timestamp(raw).ok_or_else(|| ValidationError::new("Invalid date format."))?);
    }

    for metric in Metric::ALL {
        if let Some(raw) = params.metric(metric) {
            let v = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| metric.contains(*v))
                .ok_or_else(|| ValidationError::new(metric.invalid_message()))?;
            filter.metric_minimums.push((metric, v));
        }
    }

    // Aggregation only when both knobs are supplied. Unknown metric names
    // contribute no computed field; an unknown statistic groups without
    // computing anything.
    let aggregate = match (present(&params.metrics), present(&params.statistic)) {
        (Some(metrics), Some(statistic)) => Some(AggregateSpec {
            metrics: metrics
                .split(',')
                .filter_map(|name| Metric::from_name(name.trim()))
                .collect(),
            statistic: Statistic::from_name(statistic),
        }),
        _ => None,
    };

    Ok(ReadRequest { filter, aggregate })
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ---

/// Parse an accepted timestamp form: RFC 3339, bare date, or a naive
/// date-time interpreted as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // ---
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&ndt));
    }
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&nd.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Timestamp from a JSON value: a string in an accepted form, or a number
/// of epoch milliseconds.
fn json_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    // ---
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => {
            let ms = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(ms)
        }
        _ => None,
    }
}
