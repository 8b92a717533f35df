//! End-to-end tests for the chart endpoints, driven through the axum router.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use coviscope::{server, ConnectionProvider, CoviscopeError};
use duckdb::Connection as DuckDbConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Provider standing in for a database that cannot be reached.
#[derive(Default)]
struct UnreachableStore {
    attempts: AtomicUsize,
}

impl ConnectionProvider for UnreachableStore {
    fn acquire(&self) -> coviscope::Result<DuckDbConnection> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CoviscopeError::Connectivity(
            "dial tcp 127.0.0.1:9000: connection refused".to_string(),
        ))
    }
}

fn sample_router() -> Router {
    server::router(Arc::new(common::setup_sample_db()))
}

async fn post_raw(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, json)
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(router, uri, &body.to_string()).await
}

fn january_sum() -> Value {
    json!({
        "startDate": "2021-01-01",
        "endDate": "2021-01-31",
        "matrix": "new_confirmed",
        "aggregationFunc": "sum"
    })
}

// ---------------------------------------------------------------------------
// POST /chart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chart_returns_one_point_per_date_in_order() {
    let router = sample_router();

    let (status, body) = post_json(&router, "/chart", january_sum()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    let data = body["data"].as_array().unwrap();
    let dates: Vec<&str> = data.iter().map(|p| p["date"].as_str().unwrap()).collect();
    assert_eq!(dates, common::JANUARY_DAYS);
    assert!(data.iter().all(|p| p["value"] == 565));
    assert!(data.iter().all(|p| p.get("country").is_none()));
}

#[tokio::test]
async fn chart_filters_by_countries() {
    let router = sample_router();
    let mut req = january_sum();
    req["countries"] = json!(["US", "IN"]);

    let (status, body) = post_json(&router, "/chart", req).await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert!(data.iter().all(|p| p["value"] == 190));
}

#[tokio::test]
async fn chart_accepts_null_countries() {
    let router = sample_router();
    let mut req = january_sum();
    req["countries"] = Value::Null;

    let (status, body) = post_json(&router, "/chart", req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn chart_with_no_matching_rows_returns_empty_data() {
    let router = sample_router();
    let mut req = january_sum();
    req["startDate"] = json!("2022-01-01");
    req["endDate"] = json!("2022-01-31");

    let (status, body) = post_json(&router, "/chart", req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn reversed_date_range_returns_empty_data() {
    let router = sample_router();
    let mut req = january_sum();
    req["startDate"] = json!("2021-01-31");
    req["endDate"] = json!("2021-01-01");

    let (status, body) = post_json(&router, "/chart", req.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": []}));

    let (status, body) = post_json(&router, "/chart/countries", req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": []}));
}

#[tokio::test]
async fn bogus_matrix_is_bad_request() {
    let router = sample_router();
    let mut req = january_sum();
    req["matrix"] = json!("bogus");

    let (status, body) = post_json(&router, "/chart", req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("matrix"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn missing_aggregation_is_bad_request() {
    let router = sample_router();
    let mut req = january_sum();
    req.as_object_mut().unwrap().remove("aggregationFunc");

    let (status, body) = post_json(&router, "/chart", req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("missing required parameters"));
}

#[tokio::test]
async fn malformed_date_is_bad_request() {
    let router = sample_router();
    let mut req = january_sum();
    req["startDate"] = json!("2021/01/01");

    let (status, body) = post_json(&router, "/chart", req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "invalid start_date format (expected YYYY-MM-DD)"
    );
}

#[tokio::test]
async fn undecodable_body_is_bad_request() {
    let router = sample_router();

    let (status, body) = post_raw(&router, "/chart", "{\"startDate\": ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn wrongly_typed_field_is_bad_request() {
    let router = sample_router();
    let mut req = january_sum();
    req["countries"] = json!("US");

    let (status, body) = post_json(&router, "/chart", req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn chart_only_accepts_post() {
    let router = sample_router();
    let request = Request::builder()
        .method("GET")
        .uri("/chart")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ---------------------------------------------------------------------------
// POST /chart/countries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn per_country_chart_defaults_to_top_ten() {
    let router = sample_router();
    let req = json!({
        "startDate": "2021-01-01",
        "endDate": "2021-01-31",
        "matrix": "new_confirmed"
    });

    let (status, body) = post_json(&router, "/chart/countries", req).await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 30);

    let first_day: Vec<&str> = data
        .iter()
        .filter(|p| p["date"] == "2021-01-01")
        .map(|p| p["country"].as_str().unwrap())
        .collect();
    assert_eq!(first_day, common::expected_top_locations());
}

#[tokio::test]
async fn per_country_chart_ignores_aggregation_func() {
    let router = sample_router();
    let mut req = january_sum();
    req["aggregationFunc"] = json!("max");
    req["countries"] = json!(["US", "IN"]);

    let (status, body) = post_json(&router, "/chart/countries", req).await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 6);
    assert_eq!(data[0], json!({"country": "IN", "date": "2021-01-01", "value": 90}));
    assert_eq!(data[1], json!({"country": "US", "date": "2021-01-01", "value": 100}));
}

// ---------------------------------------------------------------------------
// Server-side failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_store_is_generic_server_error() {
    let store = Arc::new(UnreachableStore::default());
    let router = server::router(store.clone());

    let (status, body) = post_json(&router, "/chart", january_sum()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Database connection error"}));
    assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn validation_fails_before_touching_the_store() {
    let store = Arc::new(UnreachableStore::default());
    let router = server::router(store.clone());
    let mut req = january_sum();
    req["aggregationFunc"] = json!("median");

    let (status, _) = post_json(&router, "/chart", req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn query_failure_hides_engine_details() {
    // No covid19 table: the engine rejects the statement.
    let router = server::router(Arc::new(coviscope::Store::open_in_memory().unwrap()));

    let (status, body) = post_json(&router, "/chart", january_sum()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Error fetching data"}));
}
