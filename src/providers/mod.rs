//! Adapters for the external geocoding and routing services.
//!
//! Handlers and the lookup controller depend on the [`Geocoder`] and
//! [`RouteProvider`] traits; [`photon::PhotonClient`] and
//! [`osrm::OsrmClient`] are the HTTP implementations and [`mock`] holds the
//! in-memory doubles used by tests.

use serde::Serialize;
use std::future::Future;
use thiserror::Error;

pub mod labels;
pub mod mock;
pub mod osrm;
pub mod photon;

/// `[longitude, latitude]`, the GeoJSON coordinate order.
pub type LonLat = [f64; 2];

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub coordinates: LonLat,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub primary: String,
    pub secondary: String,
    pub full: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    City,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteProfile {
    Driving,
    Walking,
}

impl RouteProfile {
    /// Only walking has its own profile; every other mode is routed as driving.
    pub fn for_mode(mode: &str) -> Self {
        if mode.trim().eq_ignore_ascii_case("walking") {
            Self::Walking
        } else {
            Self::Driving
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
        }
    }
}

/// First route returned by the routing service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteGeometry {
    pub coordinates: Vec<LonLat>,
    /// Travel time in seconds for each segment between consecutive coordinates.
    pub segment_durations: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {0}")]
    Status(u16),
}

pub trait Geocoder: Send + Sync {
    /// Best match for a free-text place name, if any.
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<GeoPoint>, ProviderError>> + Send;

    /// Ranked suggestions for partially typed input.
    fn suggest(
        &self,
        query: &str,
        kind: SuggestionKind,
    ) -> impl Future<Output = Result<Vec<Suggestion>, ProviderError>> + Send;
}

pub trait RouteProvider: Send + Sync {
    /// `Ok(None)` when the service has no route for the pair.
    fn route(
        &self,
        profile: RouteProfile,
        start: LonLat,
        end: LonLat,
    ) -> impl Future<Output = Result<Option<RouteGeometry>, ProviderError>> + Send;
}
