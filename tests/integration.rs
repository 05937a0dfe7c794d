use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use fleet_dispatch::api::rest::router;
use fleet_dispatch::config::Config;
use fleet_dispatch::engine::balancer::{Assignment, AssignmentStrategy, GreedyBalancer};
use fleet_dispatch::engine::optimizer::DispatchOptimizer;
use fleet_dispatch::engine::sequencer::NearestNeighbor;
use fleet_dispatch::engine::worker::run_dispatch_engine;
use fleet_dispatch::models::driver::Driver;
use fleet_dispatch::models::job::{DispatchRequest, JobStatus};
use fleet_dispatch::models::point::DeliveryPoint;
use fleet_dispatch::state::AppState;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

fn setup() -> (axum::Router, mpsc::Receiver<DispatchRequest>) {
    let (state, rx) = AppState::new(&Config::default());
    (router(Arc::new(state)), rx)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn three_points_one_driver() -> Value {
    json!({
        "points": [
            { "id": "order-low", "location": { "lat": -4.27, "lng": 15.25 }, "priority": 1 },
            { "id": "order-high", "location": { "lat": -4.28, "lng": 15.26 }, "priority": 5 },
            { "id": "order-mid", "location": { "lat": -4.29, "lng": 15.27 }, "priority": 3 }
        ],
        "drivers": [
            {
                "id": "driver-1",
                "location": { "lat": -4.2634, "lng": 15.2429 },
                "maxCapacity": 2,
                "currentLoad": 0,
                "vehicleType": "scooter"
            }
        ]
    })
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _rx) = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["jobs"], 0);
    assert_eq!(body["queued_jobs"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let (app, _rx) = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("jobs_in_queue"));
    assert!(body.contains("points_unassigned_total"));
}

#[tokio::test]
async fn optimize_assigns_by_priority_and_reports_overflow() {
    let (app, _rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/dispatch/optimize",
            three_points_one_driver(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let stops = body["assignments"]["driver-1"].as_array().unwrap();
    assert_eq!(stops.len(), 2);
    assert!(stops.contains(&json!("order-high")));
    assert!(stops.contains(&json!("order-mid")));
    assert_eq!(body["unassigned"], json!(["order-low"]));

    let route = &body["routes"][0];
    assert_eq!(route["driverId"], "driver-1");
    assert_eq!(route["stopCount"], 2);
    assert!(route["totalDistanceKm"].as_f64().unwrap() > 0.0);
    assert!(route["estimatedMinutes"].as_u64().unwrap() >= 20);
}

#[tokio::test]
async fn optimize_orders_stops_nearest_first() {
    let (app, _rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/dispatch/optimize",
            json!({
                "points": [
                    { "id": "far", "location": { "lat": 0.0, "lng": 0.3 } },
                    { "id": "near", "location": { "lat": 0.0, "lng": 0.1 } },
                    { "id": "mid", "location": { "lat": 0.0, "lng": 0.2 } }
                ],
                "drivers": [
                    { "id": "d1", "location": { "lat": 0.0, "lng": 0.0 }, "maxCapacity": 5 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["assignments"]["d1"], json!(["near", "mid", "far"]));
    assert_eq!(body["unassigned"], json!([]));
}

#[tokio::test]
async fn optimize_uses_default_capacity_when_omitted() {
    let (app, _rx) = setup();
    let points: Vec<Value> = (0..5)
        .map(|i| json!({ "id": format!("p{i}"), "location": { "lat": -4.26, "lng": 15.24 } }))
        .collect();

    let response = app
        .oneshot(json_request(
            "POST",
            "/dispatch/optimize",
            json!({
                "points": points,
                "drivers": [
                    { "id": "d1", "location": { "lat": -4.26, "lng": 15.24 } }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["assignments"]["d1"], json!(["p0", "p1", "p2"]));
    assert_eq!(body["unassigned"], json!(["p3", "p4"]));
}

#[tokio::test]
async fn optimize_with_no_drivers_leaves_everything_unassigned() {
    let (app, _rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/dispatch/optimize",
            json!({
                "points": [
                    { "id": "p1", "location": { "lat": -4.26, "lng": 15.24 } },
                    { "id": "p2", "location": { "lat": -4.27, "lng": 15.25 } }
                ],
                "drivers": []
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["assignments"], json!({}));
    assert_eq!(body["unassigned"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn optimize_invalid_coordinate_returns_400() {
    let (app, _rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/dispatch/optimize",
            json!({
                "points": [
                    { "id": "p1", "location": { "lat": 123.0, "lng": 15.24 } }
                ],
                "drivers": [
                    { "id": "d1", "location": { "lat": -4.26, "lng": 15.24 }, "maxCapacity": 2 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("invalid coordinate"));
}

#[tokio::test]
async fn optimize_overloaded_driver_returns_400() {
    let (app, _rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/dispatch/optimize",
            json!({
                "points": [],
                "drivers": [
                    {
                        "id": "d1",
                        "location": { "lat": -4.26, "lng": 15.24 },
                        "maxCapacity": 2,
                        "currentLoad": 3
                    }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pricing_quote_for_quiet_weekday_night() {
    let (app, _rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/pricing/quote",
            json!({
                "basePrice": 5000,
                "demand": 0,
                "timeOfDay": 3,
                "dayOfWeek": 2,
                "specialEvent": false
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["amount"], 3600.0);
    assert_eq!(body["breakdown"]["competitorClamped"], false);
}

#[tokio::test]
async fn pricing_quote_clamps_to_competitors() {
    let (app, _rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/pricing/quote",
            json!({
                "basePrice": 5000,
                "demand": 0,
                "timeOfDay": 3,
                "dayOfWeek": 2,
                "specialEvent": false,
                "competitorPrices": [1500, 2500],
                "stockLevel": 20
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["amount"], 2300.0);
    assert_eq!(body["breakdown"]["competitorClamped"], true);
}

#[tokio::test]
async fn pricing_quote_rejects_invalid_hour() {
    let (app, _rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/pricing/quote",
            json!({
                "basePrice": 5000,
                "demand": 50,
                "timeOfDay": 24,
                "dayOfWeek": 2
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_nonexistent_job_returns_404() {
    let (app, _rx) = setup();
    let fake_id = "00000000-0000-0000-0000-000000000000";
    let response = app
        .oneshot(get_request(&format!("/dispatch/jobs/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_job_returns_queued() {
    let (app, _rx) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/dispatch/jobs",
            three_points_one_driver(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "Queued");
    assert_eq!(body["pointCount"], 3);
    assert_eq!(body["driverCount"], 1);
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn full_job_flow() {
    let (state, rx) = AppState::new(&Config::default());
    let shared = Arc::new(state);
    let mut events = shared.plan_events_tx.subscribe();
    tokio::spawn(run_dispatch_engine(shared.clone(), rx));
    let app = router(shared.clone());

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dispatch/jobs",
            three_points_one_driver(),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let job = body_json(res).await;
    let job_id = job["id"].as_str().unwrap().to_string();

    let event = tokio::time::timeout(tokio::time::Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.job_id.to_string(), job_id);
    assert_eq!(event.plan.unassigned, vec!["order-low".to_string()]);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/dispatch/jobs/{job_id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let finished = body_json(res).await;
    assert_eq!(finished["status"], "Completed");
    assert_eq!(
        finished["result"]["assignments"]["driver-1"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
    assert!(!finished["completedAt"].is_null());

    let res = app.oneshot(get_request("/health")).await.unwrap();
    let health = body_json(res).await;
    assert_eq!(health["jobs"], 1);
    assert_eq!(health["queued_jobs"], 0);
}

struct SlowBalancer;

impl AssignmentStrategy for SlowBalancer {
    fn plan(&self, points: &[DeliveryPoint], drivers: &[Driver]) -> Assignment {
        std::thread::sleep(std::time::Duration::from_millis(300));
        GreedyBalancer.plan(points, drivers)
    }
}

#[tokio::test]
async fn optimize_past_deadline_returns_504() {
    let config = Config {
        dispatch_timeout_ms: 20,
        ..Config::default()
    };
    let (mut state, _rx) = AppState::new(&config);
    state.optimizer = DispatchOptimizer::new(Box::new(SlowBalancer), Box::new(NearestNeighbor), 10);
    let app = router(Arc::new(state));

    let response = app
        .oneshot(json_request(
            "POST",
            "/dispatch/optimize",
            three_points_one_driver(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn job_is_marked_failed_when_queue_is_closed() {
    let (state, rx) = AppState::new(&Config::default());
    drop(rx);
    let shared = Arc::new(state);
    let app = router(shared.clone());

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dispatch/jobs",
            three_points_one_driver(),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let res = app.oneshot(get_request("/health")).await.unwrap();
    let health = body_json(res).await;
    assert_eq!(health["jobs"], 1);
    assert_eq!(health["queued_jobs"], 0);

    let job = shared.jobs.iter().next().unwrap().value().clone();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.is_some());
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn queued_job_with_bad_coordinate_ends_failed() {
    let (state, rx) = AppState::new(&Config::default());
    let shared = Arc::new(state);
    tokio::spawn(run_dispatch_engine(shared.clone(), rx));
    let app = router(shared.clone());

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/dispatch/jobs",
            json!({
                "points": [
                    { "id": "p1", "location": { "lat": 123.0, "lng": 15.24 } }
                ],
                "drivers": [
                    { "id": "d1", "location": { "lat": -4.26, "lng": 15.24 }, "maxCapacity": 2 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let job = body_json(res).await;
    let job_id = job["id"].as_str().unwrap().to_string();

    let mut finished = Value::Null;
    for _ in 0..40 {
        let res = app
            .clone()
            .oneshot(get_request(&format!("/dispatch/jobs/{job_id}")))
            .await
            .unwrap();
        finished = body_json(res).await;
        if finished["status"] != "Queued" {
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    assert_eq!(finished["status"], "Failed");
    assert!(finished["error"].as_str().unwrap().contains("invalid coordinate"));
    assert!(finished.get("result").is_none());
    assert!(!finished["completedAt"].is_null());
}

#[tokio::test]
async fn pricing_quote_rejects_calendar_values_outside_u8_with_400() {
    let (app, _rx) = setup();

    for (hour, day) in [(300, 2), (-1, 2), (12, 7), (12, -3)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/pricing/quote",
                json!({
                    "basePrice": 5000,
                    "demand": 50,
                    "timeOfDay": hour,
                    "dayOfWeek": day
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "hour={hour} day={day}");
    }
}
