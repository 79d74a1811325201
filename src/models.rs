//! Data models for weather-sensor telemetry.
//!
//! Three representations of a reading cross this service:
//! - [`RawReading`] – the untyped POST body as received (every field is an
//!   optional `serde_json::Value`), inspected by the validator.
//! - [`NewReading`] – a validated, range-checked reading ready for insertion.
//! - [`SensorReading`] – a stored row, including server-assigned `id` and
//!   `created_at`.
//!
//! The [`Metric`] and [`Statistic`] enums are the shared vocabulary used by
//! both the validator and the query builder, so field names, domains, and
//! rejection messages live in exactly one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---

/// The ten numeric measurement fields a reading may carry.
///
/// Each metric knows its wire/column name, its inclusive domain, whether the
/// write path requires it, and the message used when a value falls outside
/// the domain. `ALL` fixes the order in which fields are validated; that
/// order is part of the API contract (the first failing field names the
/// error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    // ---
    Temperature,
    Humidity,
    WindSpeed,
    Pressure,
    Precipitation,
    WindDirection,
    SolarRadiation,
    UvIndex,
    Visibility,
    CloudCover,
}

impl Metric {
    /// Validation order for both the write path and the read path.
    pub const ALL: [Metric; 10] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::WindSpeed,
        Metric::Pressure,
        Metric::Precipitation,
        Metric::WindDirection,
        Metric::SolarRadiation,
        Metric::UvIndex,
        Metric::Visibility,
        Metric::CloudCover,
    ];

    /// Wire name, query-parameter name, and database column name.
    pub fn column(self) -> &'static str {
        // ---
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::WindSpeed => "wind_speed",
            Metric::Pressure => "pressure",
            Metric::Precipitation => "precipitation",
            Metric::WindDirection => "wind_direction",
            Metric::SolarRadiation => "solar_radiation",
            Metric::UvIndex => "uv_index",
            Metric::Visibility => "visibility",
            Metric::CloudCover => "cloud_cover",
        }
    }

    /// Human-readable name used in rejection messages. Differs from the
    /// column name for a few metrics ("wind direction", "UV index", ...).
    fn label(self) -> &'static str {
        // ---
        match self {
            Metric::WindDirection => "wind direction",
            Metric::SolarRadiation => "solar radiation",
            Metric::UvIndex => "UV index",
            Metric::CloudCover => "cloud cover",
            other => other.column(),
        }
    }

    /// Inclusive domain. Unbounded-above metrics use `f64::INFINITY`.
    pub fn bounds(self) -> (f64, f64) {
        // ---
        match self {
            Metric::Temperature => (-50.0, 50.0),
            Metric::Humidity => (0.0, 100.0),
            Metric::WindSpeed => (0.0, f64::INFINITY),
            Metric::Pressure => (800.0, 1100.0),
            Metric::Precipitation => (0.0, f64::INFINITY),
            Metric::WindDirection => (0.0, 360.0),
            Metric::SolarRadiation => (0.0, f64::INFINITY),
            Metric::UvIndex => (0.0, 11.0),
            Metric::Visibility => (0.0, f64::INFINITY),
            Metric::CloudCover => (0.0, 100.0),
        }
    }

    /// Whether the write path requires this field.
    pub fn required(self) -> bool {
        // ---
        matches!(
            self,
            Metric::Temperature | Metric::Humidity | Metric::WindSpeed
        )
    }

    /// `true` when `v` lies inside the metric's inclusive domain.
    pub fn contains(self, v: f64) -> bool {
        // ---
        let (lo, hi) = self.bounds();
        v >= lo && v <= hi
    }

    /// Rejection message for a missing, non-numeric, or out-of-range value.
    pub fn invalid_message(self) -> String {
        // ---
        let (lo, hi) = self.bounds();
        if hi.is_finite() {
            format!(
                "Invalid {}, must be a number between {} and {}.",
                self.label(),
                lo,
                hi
            )
        } else {
            format!("Invalid {}, must be a non-negative number.", self.label())
        }
    }

    /// Look up a metric by its wire name (e.g. from the `metrics=` list).
    pub fn from_name(name: &str) -> Option<Metric> {
        // ---
        Metric::ALL.iter().copied().find(|m| m.column() == name)
    }
}

/// Aggregation statistic requested via the `statistic=` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    // ---
    Min,
    Max,
    Sum,
    Average,
}

impl Statistic {
    /// Parse the wire name. Unrecognized names return `None`; the caller
    /// treats that as "group, but compute nothing" rather than an error.
    pub fn from_name(name: &str) -> Option<Statistic> {
        // ---
        match name {
            "min" => Some(Statistic::Min),
            "max" => Some(Statistic::Max),
            "sum" => Some(Statistic::Sum),
            "average" => Some(Statistic::Average),
            _ => None,
        }
    }

    /// SQL aggregate function implementing this statistic.
    pub fn sql_fn(self) -> &'static str {
        // ---
        match self {
            Statistic::Min => "MIN",
            Statistic::Max => "MAX",
            Statistic::Sum => "SUM",
            Statistic::Average => "AVG",
        }
    }

    /// Suffix used in computed-field names (`temperature_average`, ...).
    pub fn suffix(self) -> &'static str {
        // ---
        match self {
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Sum => "sum",
            Statistic::Average => "average",
        }
    }
}

// ---

/// Untyped POST body as received from the client.
///
/// Every field is captured as an optional raw JSON value; nothing here is
/// trusted until `validate::validate_reading` has walked it. Unknown body
/// fields are dropped by serde.
#[derive(Debug, Default, Deserialize)]
pub struct RawReading {
    // ---
    pub sensor_id: Option<Value>,
    pub date: Option<Value>,
    pub temperature: Option<Value>,
    pub humidity: Option<Value>,
    pub wind_speed: Option<Value>,
    pub pressure: Option<Value>,
    pub precipitation: Option<Value>,
    pub wind_direction: Option<Value>,
    pub solar_radiation: Option<Value>,
    pub uv_index: Option<Value>,
    pub visibility: Option<Value>,
    pub cloud_cover: Option<Value>,
}

impl RawReading {
    /// Raw value for one metric field, if the client sent it.
    pub fn metric(&self, metric: Metric) -> Option<&Value> {
        // ---
        match metric {
            Metric::Temperature => self.temperature.as_ref(),
            Metric::Humidity => self.humidity.as_ref(),
            Metric::WindSpeed => self.wind_speed.as_ref(),
            Metric::Pressure => self.pressure.as_ref(),
            Metric::Precipitation => self.precipitation.as_ref(),
            Metric::WindDirection => self.wind_direction.as_ref(),
            Metric::SolarRadiation => self.solar_radiation.as_ref(),
            Metric::UvIndex => self.uv_index.as_ref(),
            Metric::Visibility => self.visibility.as_ref(),
            Metric::CloudCover => self.cloud_cover.as_ref(),
        }
    }
}

/// Query parameters of `GET /sensor`, still untyped.
///
/// serde drops unrecognized parameters, which gives the read path its
/// permissive-unknown-field policy for free; recognized parameters are
/// parsed and range-checked by `validate::parse_read_request`.
#[derive(Debug, Default, Deserialize)]
pub struct ReadParams {
    // ---
    pub sensor_id: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub metrics: Option<String>,
    pub statistic: Option<String>,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub wind_speed: Option<String>,
    pub pressure: Option<String>,
    pub precipitation: Option<String>,
    pub wind_direction: Option<String>,
    pub solar_radiation: Option<String>,
    pub uv_index: Option<String>,
    pub visibility: Option<String>,
    pub cloud_cover: Option<String>,
}

impl ReadParams {
    /// Raw filter string for one metric, if present in the query string.
    pub fn metric(&self, metric: Metric) -> Option<&str> {
        // ---
        let v = match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::WindSpeed => &self.wind_speed,
            Metric::Pressure => &self.pressure,
            Metric::Precipitation => &self.precipitation,
            Metric::WindDirection => &self.wind_direction,
            Metric::SolarRadiation => &self.solar_radiation,
            Metric::UvIndex => &self.uv_index,
            Metric::Visibility => &self.visibility,
            Metric::CloudCover => &self.cloud_cover,
        };
        v.as_deref()
    }
}

// ---

/// A validated reading, ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    // ---
    pub sensor_id: i64,
    pub date: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_direction: Option<f64>,
    pub solar_radiation: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
    pub cloud_cover: Option<f64>,
}

/// A stored reading as returned to clients, including server-assigned
/// metadata. Immutable once written; there is no update or delete path.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SensorReading {
    // ---
    pub id: i64,
    pub sensor_id: i64,
    pub date: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_direction: Option<f64>,
    pub solar_radiation: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn metric_messages_match_wire_contract() {
        // ---
        assert_eq!(
            Metric::Temperature.invalid_message(),
            "Invalid temperature, must be a number between -50 and 50."
        );
        assert_eq!(
            Metric::Humidity.invalid_message(),
            "Invalid humidity, must be a number between 0 and 100."
        );
        assert_eq!(
            Metric::WindSpeed.invalid_message(),
            "Invalid wind_speed, must be a non-negative number."
        );
        assert_eq!(
            Metric::Pressure.invalid_message(),
            "Invalid pressure, must be a number between 800 and 1100."
        );
        assert_eq!(
            Metric::WindDirection.invalid_message(),
            "Invalid wind direction, must be a number between 0 and 360."
        );
        assert_eq!(
            Metric::UvIndex.invalid_message(),
            "Invalid UV index, must be a number between 0 and 11."
        );
        assert_eq!(
            Metric::CloudCover.invalid_message(),
            "Invalid cloud cover, must be a number between 0 and 100."
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        // ---
        assert!(Metric::Temperature.contains(-50.0));
        assert!(Metric::Temperature.contains(50.0));
        assert!(!Metric::Temperature.contains(50.001));
        assert!(Metric::UvIndex.contains(11.0));
        assert!(!Metric::UvIndex.contains(-0.1));
        assert!(Metric::WindSpeed.contains(1.0e9));
        assert!(!Metric::WindSpeed.contains(-0.5));
    }

    #[test]
    fn metric_lookup_by_wire_name() {
        // ---
        assert_eq!(Metric::from_name("wind_speed"), Some(Metric::WindSpeed));
        assert_eq!(Metric::from_name("cloud_cover"), Some(Metric::CloudCover));
        assert_eq!(Metric::from_name("windSpeed"), None);
        assert_eq!(Metric::from_name("sensor_id"), None);
    }

    #[test]
    fn statistic_parsing_is_exact() {
        // ---
        assert_eq!(Statistic::from_name("average"), Some(Statistic::Average));
        assert_eq!(Statistic::from_name("min"), Some(Statistic::Min));
        assert_eq!(Statistic::from_name("median"), None);
        assert_eq!(Statistic::from_name("AVG"), None);
        assert_eq!(Statistic::Average.sql_fn(), "AVG");
        assert_eq!(Statistic::Average.suffix(), "average");
    }

    #[test]
    fn unknown_body_fields_are_dropped() {
        // ---
        let raw: RawReading = serde_json::from_str(
            r#"{"sensor_id": 1, "temperature": 20.5, "extra_field": "ignored"}"#,
        )
        .unwrap();
        assert_eq!(raw.sensor_id, Some(serde_json::json!(1)));
        assert_eq!(raw.temperature, Some(serde_json::json!(20.5)));
        assert!(raw.date.is_none());
    }
}
