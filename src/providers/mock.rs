use crate::providers::{
    GeoPoint, Geocoder, LonLat, ProviderError, RouteGeometry, RouteProfile, RouteProvider,
    Suggestion, SuggestionKind,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Status reported by doubles configured to fail.
pub const MOCK_FAILURE_STATUS: u16 = 503;

#[derive(Debug, Default)]
pub struct MockGeocoder {
    places: HashMap<String, GeoPoint>,
    suggestions: HashMap<String, Vec<Suggestion>>,
    delays: HashMap<String, Duration>,
    failing: bool,
    calls: Mutex<Vec<String>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_place(mut self, query: &str, lon: f64, lat: f64) -> Self {
        self.places.insert(
            query.to_string(),
            GeoPoint {
                coordinates: [lon, lat],
                label: query.to_string(),
            },
        );
        self
    }

    pub fn with_suggestions(mut self, query: &str, labels: &[&str]) -> Self {
        let suggestions = labels
            .iter()
            .enumerate()
            .map(|(index, label)| Suggestion {
                id: format!("mock-{label}-{index}"),
                primary: label.to_string(),
                secondary: String::new(),
                full: label.to_string(),
            })
            .collect();
        self.suggestions.insert(query.to_string(), suggestions);
        self
    }

    /// Holds the answer for `query` back by `delay`.
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, query: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.to_string());
        }
    }

    async fn wait_for(&self, query: &str) {
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
    }
}

impl Geocoder for MockGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>, ProviderError> {
        self.record(query);
        self.wait_for(query).await;
        if self.failing {
            return Err(ProviderError::Status(MOCK_FAILURE_STATUS));
        }
        Ok(self.places.get(query).cloned())
    }

    async fn suggest(
        &self,
        query: &str,
        _kind: SuggestionKind,
    ) -> Result<Vec<Suggestion>, ProviderError> {
        self.record(query);
        self.wait_for(query).await;
        if self.failing {
            return Err(ProviderError::Status(MOCK_FAILURE_STATUS));
        }
        Ok(self.suggestions.get(query).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Default)]
pub struct MockRouter {
    geometry: Option<RouteGeometry>,
    failing: bool,
    profiles: Mutex<Vec<RouteProfile>>,
}

impl MockRouter {
    pub fn with_route(coordinates: Vec<LonLat>, segment_durations: Vec<f64>) -> Self {
        Self {
            geometry: Some(RouteGeometry {
                coordinates,
                segment_durations,
            }),
            ..Self::default()
        }
    }

    pub fn no_route() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Profiles requested so far, in call order.
    pub fn profiles(&self) -> Vec<RouteProfile> {
        self.profiles
            .lock()
            .map(|profiles| profiles.clone())
            .unwrap_or_default()
    }
}

impl RouteProvider for MockRouter {
    async fn route(
        &self,
        profile: RouteProfile,
        _start: LonLat,
        _end: LonLat,
    ) -> Result<Option<RouteGeometry>, ProviderError> {
        if let Ok(mut profiles) = self.profiles.lock() {
            profiles.push(profile);
        }
        if self.failing {
            return Err(ProviderError::Status(MOCK_FAILURE_STATUS));
        }
        Ok(self.geometry.clone())
    }
}
