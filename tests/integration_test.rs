//! Black-box tests against a running service instance.
//!
//! Point `BASE_URL` at a live server (default `http://localhost:3001`)
//! backed by a real database, then run with `cargo test -- --ignored`.

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

// ---

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3001".into())
}

/// Distinct sensor_id per test run so reruns don't trip the unique index.
fn fresh_sensor_id() -> i64 {
    // ---
    use std::time::{SystemTime, UNIX_EPOCH};
    (SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_millis()
        % 1_000_000_000) as i64
}

fn reading(sensor_id: i64, date: &str) -> Value {
    // ---
    json!({
        "sensor_id": sensor_id,
        "date": date,
        "temperature": 25,
        "humidity": 50,
        "wind_speed": 10
    })
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn post_then_get_round_trip() -> Result<()> {
    // ---
    let client = Client::new();
    let base = base_url();
    let sensor_id = fresh_sensor_id();

    let resp = client
        .post(format!("{base}/sensor"))
        .json(&reading(sensor_id, "2024-06-01T12:00:00Z"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await?;
    assert_eq!(body["sensor_id"], json!(sensor_id));
    assert_eq!(body["temperature"], json!(25.0));
    assert_eq!(body["humidity"], json!(50.0));
    assert_eq!(body["wind_speed"], json!(10.0));
    assert!(body["id"].is_i64(), "stored reading has an id");
    assert!(body["created_at"].is_string(), "server assigns created_at");

    let found: Vec<Value> = client
        .get(format!("{base}/sensor?sensor_id={sensor_id}"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["sensor_id"], json!(sensor_id));

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn out_of_range_temperature_names_the_field() -> Result<()> {
    // ---
    let client = Client::new();
    let mut body = reading(fresh_sensor_id(), "2024-06-01T12:00:00Z");
    body["temperature"] = json!(100);

    let resp = client
        .post(format!("{}/sensor", base_url()))
        .json(&body)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let err: Value = resp.json().await?;
    assert_eq!(
        err["message"],
        "Invalid temperature, must be a number between -50 and 50."
    );

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn uniqueness_is_per_sensor_and_timestamp() -> Result<()> {
    // ---
    let client = Client::new();
    let base = base_url();
    let sensor_id = fresh_sensor_id();

    // Same sensor, two different instants: both accepted.
    for date in ["2024-06-01T00:00:00Z", "2024-06-01T00:05:00Z"] {
        let resp = client
            .post(format!("{base}/sensor"))
            .json(&reading(sensor_id, date))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // Repeating an existing pair loses to the unique index.
    let resp = client
        .post(format!("{base}/sensor"))
        .json(&reading(sensor_id, "2024-06-01T00:00:00Z"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let err: Value = resp.json().await?;
    assert_eq!(err["message"], "Error saving sensor data");
    assert!(err["error"].is_string());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn invalid_read_filters_reject_with_400() -> Result<()> {
    // ---
    let client = Client::new();
    let base = base_url();

    let resp = client
        .get(format!("{base}/sensor?sensor_id=invalid"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("{base}/sensor?startDate=notadate"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("{base}/sensor?humidity=999"))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn unknown_query_params_are_ignored() -> Result<()> {
    // ---
    let resp = Client::new()
        .get(format!("{}/sensor?totally_unknown=1&other=x", base_url()))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert!(body.is_array());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn metric_filters_are_lower_bounds() -> Result<()> {
    // ---
    let client = Client::new();
    let base = base_url();
    let sensor_id = fresh_sensor_id();

    for (i, wind_speed) in [5.0, 15.0, 25.0].iter().enumerate() {
        let mut body = reading(sensor_id, &format!("2024-07-01T0{i}:00:00Z"));
        body["wind_speed"] = json!(wind_speed);
        let resp = client
            .post(format!("{base}/sensor"))
            .json(&body)
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let found: Vec<Value> = client
        .get(format!("{base}/sensor?sensor_id={sensor_id}&wind_speed=15"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(found.len(), 2);
    for r in &found {
        let ws = r["wind_speed"].as_f64().expect("numeric wind_speed");
        assert!(ws >= 15.0, "lower-bound filter leaked {ws}");
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn aggregation_groups_by_sensor_and_is_idempotent() -> Result<()> {
    // ---
    let client = Client::new();
    let base = base_url();
    let sensor_id = fresh_sensor_id();

    for (i, temp) in [10.0, 20.0].iter().enumerate() {
        let mut body = reading(sensor_id, &format!("2024-08-01T0{i}:00:00Z"));
        body["temperature"] = json!(temp);
        client
            .post(format!("{base}/sensor"))
            .json(&body)
            .send()
            .await?;
    }

    let url = format!(
        "{base}/sensor?sensor_id={sensor_id}&metrics=temperature,humidity&statistic=average"
    );
    let first: Vec<Value> = client.get(&url).send().await?.json().await?;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0]["sensor_id"], json!(sensor_id));
    assert_eq!(first[0]["temperature_average"], json!(15.0));
    assert_eq!(first[0]["humidity_average"], json!(50.0));

    // Same request against unchanged data: identical result.
    let second: Vec<Value> = client.get(&url).send().await?.json().await?;
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn unrecognized_statistic_returns_groups_without_computed_fields() -> Result<()> {
    // ---
    let client = Client::new();
    let base = base_url();
    let sensor_id = fresh_sensor_id();

    client
        .post(format!("{base}/sensor"))
        .json(&reading(sensor_id, "2024-09-01T00:00:00Z"))
        .send()
        .await?;

    let rows: Vec<Value> = client
        .get(format!(
            "{base}/sensor?sensor_id={sensor_id}&metrics=temperature&statistic=median"
        ))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sensor_id"], json!(sensor_id));
    assert!(rows[0].get("temperature_median").is_none());
    assert!(rows[0].get("temperature_average").is_none());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn unmatched_routes_return_404_and_health_is_up() -> Result<()> {
    // ---
    let client = Client::new();
    let base = base_url();

    let resp = client.get(format!("{base}/nonexistent")).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client.get(format!("{base}/health")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);

    Ok(())
}
