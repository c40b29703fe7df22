use crate::providers::{Geocoder, RouteProvider};
use crate::state::ApiState;
use axum::Router;
use axum::routing::{get, post};

pub mod handlers;
pub mod responses;

pub fn router<G, R>(state: ApiState<G, R>) -> Router
where
    G: Geocoder + 'static,
    R: RouteProvider + 'static,
{
    Router::new()
        .route(
            "/api/commute-estimate",
            get(handlers::get_commute_estimate).post(handlers::post_commute_estimate::<G, R>),
        )
        .route("/api/insights", post(handlers::post_insights::<G, R>))
        .route(
            "/api/suggestions/cities",
            get(handlers::get_city_suggestions::<G, R>),
        )
        .route(
            "/api/suggestions/locations",
            get(handlers::get_location_suggestions::<G, R>),
        )
        .route("/api/route", get(handlers::get_route::<G, R>))
        .with_state(state)
}
