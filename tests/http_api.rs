use serde_json::{Value, json};
use std::net::SocketAddr;
use traff_29::api::router;
use traff_29::insights::InsightEngine;
use traff_29::providers::mock::{MockGeocoder, MockRouter};
use traff_29::providers::{Geocoder, RouteProvider};
use traff_29::state::ApiState;

async fn spawn_app<G, R>(state: ApiState<G, R>) -> Result<SocketAddr, Box<dyn std::error::Error>>
where
    G: Geocoder + 'static,
    R: RouteProvider + 'static,
{
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

fn mock_state() -> ApiState<MockGeocoder, MockRouter> {
    let geocoder = MockGeocoder::new()
        .with_place("Koramangala", 77.62, 12.93)
        .with_place("Electronic City", 77.67, 12.84)
        .with_suggestions("Mum", &["Mumbai", "Mumbra"]);
    let router = MockRouter::with_route(
        vec![[77.62, 12.93], [77.64, 12.90], [77.66, 12.86], [77.67, 12.84]],
        vec![60.0, 240.0, 90.0],
    );
    ApiState::new(InsightEngine::default(), geocoder, router)
}

#[tokio::test]
async fn estimate_endpoint_serves_defaults_for_empty_body() -> Result<(), Box<dyn std::error::Error>> {
    let addr = spawn_app(mock_state()).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/commute-estimate"))
        .header("content-type", "application/json")
        .body("{}")
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["travelTimeMinutes"], json!(45));
    assert_eq!(body["noTrafficMinutes"], json!(37));
    assert_eq!(body["wastedMinutes"], json!(8));
    assert_eq!(body["provider"], json!("traff-29 heuristics"));
    assert_eq!(body["travelMode"], json!("unspecified"));
    assert_eq!(body["startLabel"], json!("Starting point"));
    assert_eq!(body["endLabel"], json!("Destination"));
    assert_eq!(body["timeZone"], json!("Asia/Kolkata"));
    assert!(body["departureLocal"].as_str().is_some_and(|s| s.ends_with('Z')));
    Ok(())
}

#[tokio::test]
async fn estimate_endpoint_never_rejects_bad_bodies() -> Result<(), Box<dyn std::error::Error>> {
    let addr = spawn_app(mock_state()).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/commute-estimate"))
        .header("content-type", "text/plain")
        .body("definitely not json")
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["travelTimeMinutes"], json!(45));
    Ok(())
}

#[tokio::test]
async fn estimate_endpoint_get_reports_status() -> Result<(), Box<dyn std::error::Error>> {
    let addr = spawn_app(mock_state()).await?;

    let response = reqwest::get(format!("http://{addr}/api/commute-estimate")).await?;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn insights_endpoint_returns_grouped_stats() -> Result<(), Box<dyn std::error::Error>> {
    let addr = spawn_app(mock_state()).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/insights"))
        .json(&json!({
            "city": "Bengaluru",
            "timeOfDay": "morning",
            "mode": "car",
            "duration": 45,
            "frequency": "daily"
        }))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["freeFlowMinutes"], json!(30));
    assert_eq!(body["wastedPerTrip"], json!(15));
    assert_eq!(body["wastedWeekly"], json!(150));
    assert_eq!(body["groups"][0]["category"], json!("personal"));
    Ok(())
}

#[tokio::test]
async fn suggestion_endpoints_apply_thresholds() -> Result<(), Box<dyn std::error::Error>> {
    let addr = spawn_app(mock_state()).await?;

    let cities: Value = reqwest::get(format!("http://{addr}/api/suggestions/cities?q=Mum"))
        .await?
        .json()
        .await?;
    let short: Value = reqwest::get(format!("http://{addr}/api/suggestions/cities?q=M"))
        .await?
        .json()
        .await?;
    let locations: Value = reqwest::get(format!("http://{addr}/api/suggestions/locations?q=Ko"))
        .await?
        .json()
        .await?;

    assert_eq!(cities["suggestions"][0]["full"], json!("Mumbai"));
    assert_eq!(cities["suggestions"].as_array().map(Vec::len), Some(2));
    assert_eq!(short["suggestions"][0]["id"], json!("default-city-Bengaluru"));
    assert_eq!(locations, json!({ "suggestions": [] }));
    Ok(())
}

#[tokio::test]
async fn route_endpoint_returns_geojson_snapshot() -> Result<(), Box<dyn std::error::Error>> {
    let addr = spawn_app(mock_state()).await?;

    let response = reqwest::get(format!(
        "http://{addr}/api/route?start=Koramangala&end=Electronic%20City&mode=car"
    ))
    .await?;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["profile"], json!("driving"));
    assert_eq!(body["bounds"], json!([[77.62, 12.84], [77.67, 12.93]]));
    assert_eq!(body["route"]["type"], json!("Feature"));
    assert_eq!(body["route"]["geometry"]["type"], json!("LineString"));
    assert_eq!(body["hotspots"]["type"], json!("FeatureCollection"));
    assert_eq!(
        body["hotspots"]["features"][0]["properties"]["duration"],
        json!(240.0)
    );
    assert_eq!(
        body["caption"],
        json!("Red markers highlight slower segments reported by the routing service.")
    );
    Ok(())
}

#[tokio::test]
async fn route_endpoint_reports_user_facing_errors() -> Result<(), Box<dyn std::error::Error>> {
    let addr = spawn_app(mock_state()).await?;

    let missing = reqwest::get(format!("http://{addr}/api/route?start=Koramangala")).await?;
    assert_eq!(missing.status().as_u16(), 422);
    let body: Value = missing.json().await?;
    assert_eq!(body["error_code"], json!("MISSING_LOCATIONS"));
    assert_eq!(
        body["error_message"],
        json!("Provide both start and end locations to plot a route.")
    );

    let unresolved =
        reqwest::get(format!("http://{addr}/api/route?start=Koramangala&end=Narnia")).await?;
    assert_eq!(unresolved.status().as_u16(), 422);
    let body: Value = unresolved.json().await?;
    assert_eq!(body["error_code"], json!("UNRESOLVED_LOCATION"));
    Ok(())
}

#[tokio::test]
async fn route_endpoint_reports_provider_outage() -> Result<(), Box<dyn std::error::Error>> {
    let state = ApiState::new(
        InsightEngine::default(),
        MockGeocoder::new()
            .with_place("Koramangala", 77.62, 12.93)
            .with_place("Electronic City", 77.67, 12.84),
        MockRouter::failing(),
    );
    let addr = spawn_app(state).await?;

    let response = reqwest::get(format!(
        "http://{addr}/api/route?start=Koramangala&end=Electronic%20City"
    ))
    .await?;

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await?;
    assert_eq!(body["error_code"], json!("ROUTE_UNAVAILABLE"));
    assert_eq!(body["error_message"], json!("Unable to load the route map."));
    Ok(())
}
