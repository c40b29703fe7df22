//! Route snapshot for a pair of free-text locations.
//!
//! Both ends are geocoded concurrently, the route is fetched with the
//! profile matching the travel mode, and the slowest segments are marked
//! as hotspots.

use crate::providers::{Geocoder, LonLat, RouteGeometry, RouteProfile, RouteProvider};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const MAX_HOTSPOTS: usize = 7;
pub const FALLBACK_HOTSPOTS: usize = 3;
const HOTSPOT_PERCENTILE: f64 = 0.8;

pub const HOTSPOT_CAPTION: &str =
    "Red markers highlight slower segments reported by the routing service.";
pub const PLAIN_CAPTION: &str =
    "Route plotted using open data; no specific slow segments detected for this snapshot.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteMapError {
    #[error("Provide both start and end locations to plot a route.")]
    MissingLocations,
    #[error("We couldn't pinpoint one of the locations.")]
    Unresolved,
    #[error("No route found for this combination.")]
    NoRoute,
    #[error("Unable to load the route map.")]
    Unavailable,
}

pub type Bounds = [LonLat; 2];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hotspot {
    pub coordinates: LonLat,
    /// Segment travel time in seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub profile: RouteProfile,
    pub bounds: Bounds,
    pub coordinates: Vec<LonLat>,
    pub hotspots: Vec<Hotspot>,
}

impl RouteSummary {
    pub fn from_geometry(profile: RouteProfile, geometry: RouteGeometry) -> Option<Self> {
        let bounds = bounds(&geometry.coordinates)?;
        let hotspots = hotspots(&geometry.coordinates, &geometry.segment_durations);
        Some(Self {
            profile,
            bounds,
            coordinates: geometry.coordinates,
            hotspots,
        })
    }

    pub fn caption(&self) -> &'static str {
        if self.hotspots.is_empty() {
            PLAIN_CAPTION
        } else {
            HOTSPOT_CAPTION
        }
    }

    pub fn route_feature(&self) -> LineFeature {
        LineFeature {
            kind: "Feature",
            geometry: LineString {
                kind: "LineString",
                coordinates: self.coordinates.clone(),
            },
            properties: EmptyProperties {},
        }
    }

    pub fn hotspot_collection(&self) -> PointCollection {
        PointCollection {
            kind: "FeatureCollection",
            features: self
                .hotspots
                .iter()
                .map(|hotspot| PointFeature {
                    kind: "Feature",
                    geometry: Point {
                        kind: "Point",
                        coordinates: hotspot.coordinates,
                    },
                    properties: HotspotProperties {
                        duration: hotspot.duration,
                    },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LineFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: LineString,
    pub properties: EmptyProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: Vec<LonLat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmptyProperties {}

#[derive(Debug, Clone, Serialize)]
pub struct PointCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<PointFeature>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: Point,
    pub properties: HotspotProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: LonLat,
}

#[derive(Debug, Clone, Serialize)]
pub struct HotspotProperties {
    pub duration: f64,
}

pub async fn load_route<G, R>(
    geocoder: &G,
    router: &R,
    start: &str,
    end: &str,
    mode: &str,
) -> Result<RouteSummary, RouteMapError>
where
    G: Geocoder,
    R: RouteProvider,
{
    let start = start.trim();
    let end = end.trim();
    if start.is_empty() || end.is_empty() {
        return Err(RouteMapError::MissingLocations);
    }

    let (start_point, end_point) = tokio::join!(geocoder.geocode(start), geocoder.geocode(end));
    let (start_point, end_point) = match (start_point, end_point) {
        (Ok(Some(start_point)), Ok(Some(end_point))) => (start_point, end_point),
        (Err(err), _) | (_, Err(err)) => {
            warn!(error = %err, "Geocoding failed");
            return Err(RouteMapError::Unavailable);
        }
        _ => {
            debug!(start, end, "Location could not be geocoded");
            return Err(RouteMapError::Unresolved);
        }
    };

    let profile = RouteProfile::for_mode(mode);
    let geometry = router
        .route(profile, start_point.coordinates, end_point.coordinates)
        .await
        .map_err(|err| {
            warn!(error = %err, profile = profile.as_str(), "Routing failed");
            RouteMapError::Unavailable
        })?
        .ok_or(RouteMapError::NoRoute)?;

    RouteSummary::from_geometry(profile, geometry).ok_or(RouteMapError::NoRoute)
}

/// `[[min_lon, min_lat], [max_lon, max_lat]]`, `None` for an empty line.
pub fn bounds(coordinates: &[LonLat]) -> Option<Bounds> {
    let first = *coordinates.first()?;
    Some(
        coordinates
            .iter()
            .fold([first, first], |[min, max], point| {
                [
                    [min[0].min(point[0]), min[1].min(point[1])],
                    [max[0].max(point[0]), max[1].max(point[1])],
                ]
            }),
    )
}

/// Duration at the 80th percentile position; a zero value there falls back
/// to the longest segment.
pub fn duration_threshold(durations: &[f64]) -> Option<f64> {
    let mut sorted = durations.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last = *sorted.last()?;
    let index = ((sorted.len() as f64 * HOTSPOT_PERCENTILE).floor() as usize).saturating_sub(1);
    let value = sorted[index];
    if value == 0.0 || value.is_nan() {
        Some(last)
    } else {
        Some(value)
    }
}

/// Slowest segments, located at their midpoints. Only computed when every
/// segment has a duration.
pub fn hotspots(coordinates: &[LonLat], durations: &[f64]) -> Vec<Hotspot> {
    if durations.is_empty() || coordinates.len() != durations.len() + 1 {
        return Vec::new();
    }
    let Some(threshold) = duration_threshold(durations) else {
        return Vec::new();
    };

    let mut ranked: Vec<(usize, f64)> = durations.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut selected: Vec<(usize, f64)> = ranked
        .iter()
        .copied()
        .filter(|(_, duration)| *duration >= threshold)
        .take(MAX_HOTSPOTS)
        .collect();
    if selected.is_empty() {
        selected = ranked.into_iter().take(FALLBACK_HOTSPOTS).collect();
    }

    selected
        .into_iter()
        .map(|(index, duration)| Hotspot {
            coordinates: midpoint(coordinates[index], coordinates[index + 1]),
            duration,
        })
        .collect()
}

fn midpoint(a: LonLat, b: LonLat) -> LonLat {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}
