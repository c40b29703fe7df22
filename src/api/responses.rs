use crate::insights::CongestionInsights;
use crate::insights::narrative::{WrappedCategory, WrappedStat};
use crate::providers::{RouteProfile, Suggestion};
use crate::route_map::{Bounds, LineFeature, PointCollection};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuteEstimateResponse {
    pub travel_time_minutes: u32,
    pub no_traffic_minutes: u32,
    pub wasted_minutes: u32,
    pub provider: String,
    pub travel_mode: String,
    pub start_label: String,
    pub end_label: String,
    pub departure_local: String,
    pub time_zone: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Ok,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusResponse {
    pub status: ServiceStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    #[serde(flatten)]
    pub insights: CongestionInsights,
    pub groups: Vec<WrappedGroupResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct WrappedGroupResponse {
    pub category: WrappedCategory,
    pub label: String,
    pub entries: Vec<WrappedStat>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RouteSuccessResponse {
    pub profile: RouteProfile,
    pub bounds: Bounds,
    pub route: LineFeature,
    pub hotspots: PointCollection,
    pub caption: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiErrorResponse {
    pub error_code: ApiErrorCode,
    pub error_message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    MissingLocations,
    UnresolvedLocation,
    NoRoute,
    RouteUnavailable,
    InternalError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn estimate_response_uses_camel_case() {
        let response = CommuteEstimateResponse {
            travel_time_minutes: 45,
            no_traffic_minutes: 37,
            wasted_minutes: 8,
            provider: "traff-29 heuristics".to_string(),
            travel_mode: "unspecified".to_string(),
            start_label: "Starting point".to_string(),
            end_label: "Destination".to_string(),
            departure_local: "2026-01-11T12:30:00Z".to_string(),
            time_zone: "Asia/Kolkata".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize estimate response");
        assert_eq!(
            value,
            json!({
                "travelTimeMinutes": 45,
                "noTrafficMinutes": 37,
                "wastedMinutes": 8,
                "provider": "traff-29 heuristics",
                "travelMode": "unspecified",
                "startLabel": "Starting point",
                "endLabel": "Destination",
                "departureLocal": "2026-01-11T12:30:00Z",
                "timeZone": "Asia/Kolkata"
            })
        );
    }

    #[test]
    fn status_response_serializes_lowercase() {
        let value = serde_json::to_value(StatusResponse {
            status: ServiceStatus::Ok,
        })
        .expect("serialize status response");

        assert_eq!(value, json!({ "status": "ok" }));
    }

    #[test]
    fn error_response_uses_screaming_snake_case_code() {
        let response = ApiErrorResponse {
            error_code: ApiErrorCode::UnresolvedLocation,
            error_message: "We couldn't pinpoint one of the locations.".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize error response");
        assert_eq!(
            value,
            json!({
                "error_code": "UNRESOLVED_LOCATION",
                "error_message": "We couldn't pinpoint one of the locations."
            })
        );
    }

    #[test]
    fn suggestions_response_lists_all_label_parts() {
        let response = SuggestionsResponse {
            suggestions: vec![Suggestion {
                id: "default-city-Pune".to_string(),
                primary: "Pune".to_string(),
                secondary: String::new(),
                full: "Pune".to_string(),
            }],
        };

        let value = serde_json::to_value(response).expect("serialize suggestions response");
        assert_eq!(
            value,
            json!({
                "suggestions": [{
                    "id": "default-city-Pune",
                    "primary": "Pune",
                    "secondary": "",
                    "full": "Pune"
                }]
            })
        );
    }
}
