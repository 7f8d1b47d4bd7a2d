use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use tripshare::api::ApiState;
use tripshare::cache::PersistentCache;
use tripshare::config::TripShareConfig;
use tripshare::geocoding::NominatimClient;
use tripshare::{telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = TripShareConfig::load().context("Failed to load configuration")?;
    telemetry::init(&config.logging)?;

    let mut client = NominatimClient::new(config.geocoding.clone())?;
    if config.cache.enabled {
        let cache = PersistentCache::open(&config.cache.location, config.cache.ttl())
            .with_context(|| format!("Failed to open cache at {}", config.cache.location))?;
        info!("Reverse geocoding cache enabled at {}", config.cache.location);
        client = client.with_cache(cache);
    }

    let state = ApiState {
        geocoder: Arc::new(client),
        precision: config.geocoding.coordinate_precision,
    };
    let app = web::app(state, config.geocoding.timeout() * 2);
    web::run(config.server.port, app).await
}
