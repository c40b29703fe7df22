use crate::config::Config;
use crate::error::AppError;
use crate::insights::InsightEngine;
use crate::lookup::LookupPolicy;
use crate::providers::osrm::OsrmClient;
use crate::providers::photon::PhotonClient;
use std::sync::Arc;

/// Shared, read-only state handed to every request handler.
#[derive(Debug)]
pub struct ApiState<G = PhotonClient, R = OsrmClient> {
    pub engine: Arc<InsightEngine>,
    pub geocoder: Arc<G>,
    pub router: Arc<R>,
    pub city_policy: LookupPolicy,
    pub location_policy: LookupPolicy,
}

impl<G, R> Clone for ApiState<G, R> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            geocoder: Arc::clone(&self.geocoder),
            router: Arc::clone(&self.router),
            city_policy: self.city_policy,
            location_policy: self.location_policy,
        }
    }
}

impl<G, R> ApiState<G, R> {
    pub fn new(engine: InsightEngine, geocoder: G, router: R) -> Self {
        Self {
            engine: Arc::new(engine),
            geocoder: Arc::new(geocoder),
            router: Arc::new(router),
            city_policy: LookupPolicy::city(),
            location_policy: LookupPolicy::location(),
        }
    }

    pub fn with_policies(mut self, city: LookupPolicy, location: LookupPolicy) -> Self {
        self.city_policy = city;
        self.location_policy = location;
        self
    }
}

impl ApiState {
    /// HTTP-backed state built from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.provider_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let (city_limit, location_limit) = config.suggestion_limits();
        let geocoder = PhotonClient::new(client.clone(), config.geocode_url())
            .with_limits(city_limit, location_limit);
        let router = OsrmClient::new(client, config.routing_url());
        let engine = InsightEngine::from_optional_path(config.congestion_table_path());

        Ok(Self::new(engine, geocoder, router)
            .with_policies(config.city_lookup_policy(), config.location_lookup_policy()))
    }
}
