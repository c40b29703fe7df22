use crate::providers::{LonLat, ProviderError, RouteGeometry, RouteProfile, RouteProvider};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_ROUTING_URL: &str = "https://router.project-osrm.org/route/v1";

#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
}

impl OsrmClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn route_url(&self, profile: RouteProfile, start: LonLat, end: LonLat) -> String {
        format!(
            "{}/{}/{},{};{},{}",
            self.base_url.trim_end_matches('/'),
            profile.as_str(),
            start[0],
            start[1],
            end[0],
            end[1]
        )
    }
}

impl RouteProvider for OsrmClient {
    async fn route(
        &self,
        profile: RouteProfile,
        start: LonLat,
        end: LonLat,
    ) -> Result<Option<RouteGeometry>, ProviderError> {
        let response = self
            .client
            .get(self.route_url(profile, start, end))
            .query(&[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("annotations", "duration"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Routing service returned no route");
            return Ok(None);
        }

        let payload = response.json::<Value>().await?;
        Ok(parse_route(&payload))
    }
}

/// Geometry of the first route plus the per-segment durations of its
/// first leg. A route without coordinates counts as no route.
pub fn parse_route(payload: &Value) -> Option<RouteGeometry> {
    let route = payload.get("routes")?.as_array()?.first()?;
    let coordinates: Vec<LonLat> = route
        .get("geometry")?
        .get("coordinates")?
        .as_array()?
        .iter()
        .filter_map(|pair| {
            let pair = pair.as_array()?;
            Some([pair.first()?.as_f64()?, pair.get(1)?.as_f64()?])
        })
        .collect();
    if coordinates.is_empty() {
        return None;
    }

    let segment_durations = route
        .get("legs")
        .and_then(Value::as_array)
        .and_then(|legs| legs.first())
        .and_then(|leg| leg.get("annotation"))
        .and_then(|annotation| annotation.get("duration"))
        .and_then(Value::as_array)
        .map(|durations| durations.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default();

    Some(RouteGeometry {
        coordinates,
        segment_durations,
    })
}
