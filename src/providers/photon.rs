use crate::providers::labels::{city_suggestion, location_suggestion};
use crate::providers::{GeoPoint, Geocoder, ProviderError, Suggestion, SuggestionKind};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::debug;

pub const DEFAULT_GEOCODE_URL: &str = "https://photon.komoot.io/api/";
pub const CITY_SUGGESTION_LIMIT: usize = 8;
pub const LOCATION_SUGGESTION_LIMIT: usize = 6;

#[derive(Debug, Clone)]
pub struct PhotonClient {
    client: Client,
    base_url: String,
    city_limit: usize,
    location_limit: usize,
}

impl PhotonClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            city_limit: CITY_SUGGESTION_LIMIT,
            location_limit: LOCATION_SUGGESTION_LIMIT,
        }
    }

    pub fn with_limits(mut self, city_limit: usize, location_limit: usize) -> Self {
        self.city_limit = city_limit;
        self.location_limit = location_limit;
        self
    }

    async fn search(&self, params: &[(&str, String)]) -> Result<Value, ProviderError> {
        let response = self.client.get(&self.base_url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }
}

impl Geocoder for PhotonClient {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>, ProviderError> {
        let params = [
            ("q", query.to_string()),
            ("limit", "1".to_string()),
            ("lang", "en".to_string()),
        ];
        match self.search(&params).await {
            Ok(payload) => Ok(parse_best_match(&payload)),
            // A rejected lookup means the place could not be pinpointed.
            Err(ProviderError::Status(code)) => {
                debug!(status = code, query, "Geocoder rejected lookup");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn suggest(
        &self,
        query: &str,
        kind: SuggestionKind,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        let mut params = vec![("q", query.to_string()), ("lang", "en".to_string())];
        match kind {
            SuggestionKind::City => {
                params.push(("limit", self.city_limit.to_string()));
                params.push(("osm_tag", "place:city".to_string()));
                params.push(("osm_tag", "place:town".to_string()));
            }
            SuggestionKind::Location => {
                params.push(("limit", self.location_limit.to_string()));
            }
        }
        let payload = self.search(&params).await?;
        Ok(parse_suggestions(&payload, kind))
    }
}

fn features(payload: &Value) -> impl Iterator<Item = &Value> {
    payload
        .get("features")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn properties(feature: &Value) -> Option<&Map<String, Value>> {
    feature.get("properties").and_then(Value::as_object)
}

/// Coordinates and label of the first feature, if it has a usable point.
pub fn parse_best_match(payload: &Value) -> Option<GeoPoint> {
    let feature = features(payload).next()?;
    let coordinates = feature
        .get("geometry")?
        .get("coordinates")?
        .as_array()?;
    let lon = coordinates.first()?.as_f64()?;
    let lat = coordinates.get(1)?.as_f64()?;
    let label = properties(feature)
        .and_then(|props| location_suggestion(props, 0))
        .map(|suggestion| suggestion.full)
        .unwrap_or_default();
    Some(GeoPoint {
        coordinates: [lon, lat],
        label,
    })
}

/// Suggestions in provider rank order. Non-object features and features
/// without a usable label are skipped.
pub fn parse_suggestions(payload: &Value, kind: SuggestionKind) -> Vec<Suggestion> {
    let empty = Map::new();
    features(payload)
        .enumerate()
        .filter(|(_, feature)| feature.is_object())
        .filter_map(|(index, feature)| {
            let props = properties(feature).unwrap_or(&empty);
            match kind {
                SuggestionKind::City => city_suggestion(props, index),
                SuggestionKind::Location => location_suggestion(props, index),
            }
        })
        .collect()
}
