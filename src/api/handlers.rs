use crate::api::responses::{
    ApiErrorCode, ApiErrorResponse, CommuteEstimateResponse, InsightsResponse, RouteSuccessResponse,
    ServiceStatus, StatusResponse, SuggestionsResponse, WrappedGroupResponse,
};
use crate::error::AppError;
use crate::insights::InsightEngine;
use crate::insights::congestion::CongestionInputs;
use crate::insights::narrative::group_by_category;
use crate::lookup::{LookupPolicy, resolve};
use crate::providers::{Geocoder, RouteProvider};
use crate::route_map::{RouteMapError, load_route};
use crate::state::ApiState;
use crate::survey::{Frequency, Priority, SurveyAnswers, TimeOfDay, TravelMode, sanitize_duration};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const PROVIDER_NAME: &str = "traff-29 heuristics";
/// Upper bound for durations sent to the estimate endpoints.
pub const MAX_REQUEST_DURATION_MINUTES: u32 = 180;
pub const DEFAULT_START_LABEL: &str = "Starting point";
pub const DEFAULT_END_LABEL: &str = "Destination";
pub const DEFAULT_TIME_ZONE: &str = "Asia/Kolkata";

pub enum ApiResponse<T> {
    Success(T),
    Error {
        status: StatusCode,
        body: ApiErrorResponse,
    },
}

impl<T: serde::Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            ApiResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub type EstimateResponse = ApiResponse<CommuteEstimateResponse>;
pub type RouteResponse = ApiResponse<RouteSuccessResponse>;

/// Top-level fields of a JSON object body. Anything that is not an object
/// reads as empty.
#[derive(Debug, Default)]
struct BodyFields(Map<String, Value>);

impl BodyFields {
    fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self(map),
            Ok(_) => {
                debug!("Request body is not an object, treating as empty");
                Self::default()
            }
            Err(err) => {
                debug!(error = %err, "Request body is not valid JSON, treating as empty");
                Self::default()
            }
        }
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    fn answers(&self) -> SurveyAnswers {
        SurveyAnswers {
            city: self.text("city").unwrap_or_default().to_string(),
            start_location: self.text("startLocation").unwrap_or_default().to_string(),
            end_location: self.text("endLocation").unwrap_or_default().to_string(),
            time_of_day: self.text("timeOfDay").and_then(TimeOfDay::parse),
            mode: self.text("mode").and_then(TravelMode::parse),
            duration_minutes: sanitize_duration(
                self.number("duration"),
                MAX_REQUEST_DURATION_MINUTES,
            ),
            priority: self.text("priority").and_then(Priority::parse),
            frequency: self.text("frequency").and_then(Frequency::parse),
        }
    }
}

pub async fn get_commute_estimate() -> impl IntoResponse {
    Json(StatusResponse {
        status: ServiceStatus::Ok,
    })
}

pub async fn post_commute_estimate<G, R>(
    State(state): State<ApiState<G, R>>,
    body: Bytes,
) -> impl IntoResponse {
    build_estimate_response(&body, &state.engine, SystemTime::now())
}

pub async fn post_insights<G, R>(
    State(state): State<ApiState<G, R>>,
    body: Bytes,
) -> impl IntoResponse {
    Json(build_insights_response(&body, &state.engine))
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn get_city_suggestions<G: Geocoder, R>(
    State(state): State<ApiState<G, R>>,
    Query(query): Query<SuggestionQuery>,
) -> impl IntoResponse {
    Json(build_suggestions_response(state.geocoder.as_ref(), &state.city_policy, &query.q).await)
}

pub async fn get_location_suggestions<G: Geocoder, R>(
    State(state): State<ApiState<G, R>>,
    Query(query): Query<SuggestionQuery>,
) -> impl IntoResponse {
    Json(
        build_suggestions_response(state.geocoder.as_ref(), &state.location_policy, &query.q)
            .await,
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub mode: String,
}

pub async fn get_route<G: Geocoder, R: RouteProvider>(
    State(state): State<ApiState<G, R>>,
    Query(query): Query<RouteQuery>,
) -> impl IntoResponse {
    build_route_response(state.geocoder.as_ref(), state.router.as_ref(), &query).await
}

fn build_estimate_response(body: &[u8], engine: &InsightEngine, now: SystemTime) -> EstimateResponse {
    let fields = BodyFields::parse(body);
    let answers = fields.answers();
    let trip = engine.trip_estimate(CongestionInputs::from(&answers), answers.duration_minutes);

    let departure_local = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(err) => {
            return internal_error("/api/commute-estimate", &err.to_string());
        }
    };

    let travel_mode = match fields.text("mode") {
        Some(mode) if !mode.is_empty() => mode.to_lowercase(),
        _ => "unspecified".to_string(),
    };

    ApiResponse::Success(CommuteEstimateResponse {
        travel_time_minutes: trip.travel_time_minutes,
        no_traffic_minutes: trip.free_flow_minutes,
        wasted_minutes: trip.wasted_minutes,
        provider: PROVIDER_NAME.to_string(),
        travel_mode,
        start_label: label_or(&answers.start_location, DEFAULT_START_LABEL),
        end_label: label_or(&answers.end_location, DEFAULT_END_LABEL),
        departure_local,
        time_zone: infer_time_zone(&answers.city).to_string(),
    })
}

fn build_insights_response(body: &[u8], engine: &InsightEngine) -> InsightsResponse {
    let answers = BodyFields::parse(body).answers();
    let insights = engine.estimate(&answers);
    let groups = group_by_category(&insights.wrapped)
        .into_iter()
        .map(|group| WrappedGroupResponse {
            category: group.category,
            label: group.label.to_string(),
            entries: group.entries.into_iter().cloned().collect(),
        })
        .collect();
    InsightsResponse { insights, groups }
}

async fn build_suggestions_response<G: Geocoder>(
    geocoder: &G,
    policy: &LookupPolicy,
    query: &str,
) -> SuggestionsResponse {
    SuggestionsResponse {
        suggestions: resolve(geocoder, policy, query).await,
    }
}

async fn build_route_response<G: Geocoder, R: RouteProvider>(
    geocoder: &G,
    router: &R,
    query: &RouteQuery,
) -> RouteResponse {
    match load_route(geocoder, router, &query.start, &query.end, &query.mode).await {
        Ok(summary) => ApiResponse::Success(RouteSuccessResponse {
            profile: summary.profile,
            bounds: summary.bounds,
            route: summary.route_feature(),
            hotspots: summary.hotspot_collection(),
            caption: summary.caption().to_string(),
        }),
        Err(err) => route_error(err),
    }
}

fn route_error(err: RouteMapError) -> RouteResponse {
    let (status, error_code) = match err {
        RouteMapError::MissingLocations => {
            (StatusCode::UNPROCESSABLE_ENTITY, ApiErrorCode::MissingLocations)
        }
        RouteMapError::Unresolved => {
            (StatusCode::UNPROCESSABLE_ENTITY, ApiErrorCode::UnresolvedLocation)
        }
        RouteMapError::NoRoute => (StatusCode::UNPROCESSABLE_ENTITY, ApiErrorCode::NoRoute),
        RouteMapError::Unavailable => (StatusCode::BAD_GATEWAY, ApiErrorCode::RouteUnavailable),
    };
    ApiResponse::Error {
        status,
        body: ApiErrorResponse {
            error_code,
            error_message: err.to_string(),
        },
    }
}

fn internal_error<T>(path: &str, message: &str) -> ApiResponse<T> {
    error!(path, message, "Internal error while handling request");
    ApiResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ApiErrorResponse {
            error_code: ApiErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
        },
    }
}

fn label_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Case-insensitive substring match on a handful of known cities.
pub fn infer_time_zone(city: &str) -> &'static str {
    let lower = city.to_lowercase();
    if ["new york", "chicago", "los angeles"]
        .iter()
        .any(|name| lower.contains(name))
    {
        "America/New_York"
    } else if lower.contains("london") {
        "Europe/London"
    } else {
        DEFAULT_TIME_ZONE
    }
}

fn format_timestamp(timestamp: SystemTime) -> Result<String, AppError> {
    let datetime = OffsetDateTime::from(timestamp);
    Ok(datetime.format(&Rfc3339)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::{MockGeocoder, MockRouter};
    use std::time::{Duration, UNIX_EPOCH};

    fn estimate(body: &str) -> CommuteEstimateResponse {
        let engine = InsightEngine::default();
        match build_estimate_response(
            body.as_bytes(),
            &engine,
            UNIX_EPOCH + Duration::from_secs(1),
        ) {
            ApiResponse::Success(body) => body,
            ApiResponse::Error { status, .. } => {
                panic!("expected success response, got error: {status}");
            }
        }
    }

    #[test]
    fn empty_object_uses_defaults() {
        let body = estimate("{}");

        assert_eq!(body.travel_time_minutes, 45);
        assert_eq!(body.no_traffic_minutes, 37);
        assert_eq!(body.wasted_minutes, 8);
        assert_eq!(body.provider, "traff-29 heuristics");
        assert_eq!(body.travel_mode, "unspecified");
        assert_eq!(body.start_label, "Starting point");
        assert_eq!(body.end_label, "Destination");
        assert_eq!(body.departure_local, "1970-01-01T00:00:01Z");
        assert_eq!(body.time_zone, "Asia/Kolkata");
    }

    #[test]
    fn malformed_bodies_are_treated_as_empty() {
        for body in ["", "not json", "[1, 2]", "null", "42"] {
            let response = estimate(body);
            assert_eq!(response.travel_time_minutes, 45, "body {body:?}");
            assert_eq!(response.no_traffic_minutes, 37, "body {body:?}");
        }
    }

    #[test]
    fn wrong_typed_fields_are_ignored() {
        let body = estimate(r#"{"duration": "60", "mode": 3, "startLocation": ["a"]}"#);

        assert_eq!(body.travel_time_minutes, 45);
        assert_eq!(body.travel_mode, "unspecified");
        assert_eq!(body.start_label, "Starting point");
    }

    #[test]
    fn bengaluru_morning_car_estimate() {
        let body = estimate(
            r#"{
                "city": "Bengaluru",
                "startLocation": "  Indiranagar ",
                "endLocation": "Whitefield",
                "mode": "Car",
                "duration": 45,
                "timeOfDay": "morning",
                "frequency": "daily"
            }"#,
        );

        // factor 0.52, free flow round(45 * (1 - 0.52 * 0.65)) = 30
        assert_eq!(body.no_traffic_minutes, 30);
        assert_eq!(body.travel_time_minutes, 45);
        assert_eq!(body.wasted_minutes, 15);
        assert_eq!(body.travel_mode, "car");
        assert_eq!(body.start_label, "Indiranagar");
        assert_eq!(body.end_label, "Whitefield");
    }

    #[test]
    fn duration_is_rounded_and_clamped() {
        assert_eq!(estimate(r#"{"duration": 1}"#).travel_time_minutes, 7);
        assert_eq!(estimate(r#"{"duration": 500}"#).travel_time_minutes, 180);
        assert_eq!(estimate(r#"{"duration": 59.6}"#).travel_time_minutes, 60);
    }

    #[test]
    fn short_trips_are_padded_past_free_flow() {
        let body = estimate(r#"{"duration": 5, "mode": "walking", "timeOfDay": "night"}"#);

        assert_eq!(body.no_traffic_minutes, 5);
        assert_eq!(body.travel_time_minutes, 7);
        assert_eq!(body.wasted_minutes, 2);
    }

    #[test]
    fn time_zone_follows_city_name() {
        assert_eq!(infer_time_zone("New York City"), "America/New_York");
        assert_eq!(infer_time_zone("chicago"), "America/New_York");
        assert_eq!(infer_time_zone("Los Angeles"), "America/New_York");
        assert_eq!(infer_time_zone("Greater LONDON"), "Europe/London");
        assert_eq!(infer_time_zone("Pune"), "Asia/Kolkata");
        assert_eq!(infer_time_zone(""), "Asia/Kolkata");
    }

    #[test]
    fn insights_response_groups_wrapped_stats() {
        let engine = InsightEngine::default();
        let body = br#"{"city": "Bengaluru", "timeOfDay": "morning", "mode": "car", "duration": 45, "frequency": "daily"}"#;

        let response = build_insights_response(body, &engine);

        assert_eq!(response.insights.wasted_per_trip, 15);
        assert_eq!(response.insights.wasted_weekly, 150);
        assert_eq!(response.groups.first().map(|g| g.label.as_str()), Some("Personal Pace"));
        let grouped: usize = response.groups.iter().map(|g| g.entries.len()).sum();
        assert_eq!(grouped, response.insights.wrapped.len());
    }

    #[tokio::test]
    async fn short_city_query_returns_defaults() {
        let geocoder = MockGeocoder::new();

        let response = build_suggestions_response(&geocoder, &LookupPolicy::city(), "B").await;

        assert_eq!(response.suggestions.len(), 11);
        assert!(geocoder.calls().is_empty());
    }

    #[tokio::test]
    async fn route_errors_map_to_status_codes() {
        let geocoder = MockGeocoder::new().with_place("Andheri", 72.85, 19.12);
        let query = RouteQuery {
            start: "Andheri".to_string(),
            end: "Atlantis".to_string(),
            mode: "car".to_string(),
        };

        let unresolved = build_route_response(&geocoder, &MockRouter::no_route(), &query).await;
        let missing = build_route_response(
            &geocoder,
            &MockRouter::no_route(),
            &RouteQuery::default(),
        )
        .await;
        let unavailable =
            build_route_response(&MockGeocoder::failing(), &MockRouter::no_route(), &query).await;

        match unresolved {
            ApiResponse::Error { status, body } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(body.error_code, ApiErrorCode::UnresolvedLocation);
                assert_eq!(body.error_message, "We couldn't pinpoint one of the locations.");
            }
            ApiResponse::Success(_) => panic!("expected unresolved error"),
        }
        match missing {
            ApiResponse::Error { body, .. } => {
                assert_eq!(body.error_code, ApiErrorCode::MissingLocations);
            }
            ApiResponse::Success(_) => panic!("expected missing locations error"),
        }
        match unavailable {
            ApiResponse::Error { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body.error_message, "Unable to load the route map.");
            }
            ApiResponse::Success(_) => panic!("expected unavailable error"),
        }
    }

    #[tokio::test]
    async fn route_success_carries_geojson() {
        let geocoder = MockGeocoder::new()
            .with_place("Andheri", 72.85, 19.12)
            .with_place("Powai", 72.90, 19.12);
        let router = MockRouter::with_route(
            vec![[72.85, 19.12], [72.87, 19.13], [72.90, 19.12]],
            vec![40.0, 90.0],
        );
        let query = RouteQuery {
            start: "Andheri".to_string(),
            end: "Powai".to_string(),
            mode: "two-wheeler".to_string(),
        };

        let response = build_route_response(&geocoder, &router, &query).await;

        match response {
            ApiResponse::Success(body) => {
                assert_eq!(body.bounds, [[72.85, 19.12], [72.90, 19.13]]);
                assert_eq!(body.route.geometry.coordinates.len(), 3);
                assert!(!body.hotspots.features.is_empty());
                assert_eq!(
                    body.caption,
                    "Red markers highlight slower segments reported by the routing service."
                );
            }
            ApiResponse::Error { status, .. } => {
                panic!("expected success response, got error: {status}");
            }
        }
    }
}
