//! Nominatim (OpenStreetMap) geocoding client
//!
//! Forward search and reverse lookups with request pacing, transient-error
//! retries and an optional label cache. Malformed or empty responses are
//! treated as "no results".

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::address::{StructuredAddress, format_clean_address};
use super::pacing::RequestPacer;
use super::Geocoder;
use crate::cache::PersistentCache;
use crate::config::GeocodingConfig;
use crate::error::LocationError;
use crate::models::location::{validate_latitude, validate_longitude};
use crate::models::{Coordinates, SearchCandidate};

/// Search hit as returned by `/search?format=json`
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: Option<String>,
    lon: Option<String>,
    display_name: Option<String>,
}

impl NominatimPlace {
    fn into_candidate(self) -> Option<SearchCandidate> {
        let latitude = self.lat?.trim().parse::<f64>().ok()?;
        let longitude = self.lon?.trim().parse::<f64>().ok()?;
        let label = self.display_name.filter(|name| !name.trim().is_empty())?;

        if !validate_latitude(latitude) || !validate_longitude(longitude) {
            return None;
        }

        Some(SearchCandidate {
            label,
            latitude,
            longitude,
        })
    }
}

/// Response of `/reverse?format=json`
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    address: Option<StructuredAddress>,
    error: Option<String>,
}

/// Geocoder backed by a Nominatim instance
pub struct NominatimClient {
    client: ClientWithMiddleware,
    config: GeocodingConfig,
    pacer: RequestPacer,
    cache: Option<PersistentCache>,
}

impl std::fmt::Debug for NominatimClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimClient")
            .field("config", &self.config)
            .field("pacer", &self.pacer)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl NominatimClient {
    /// Create a new client from configuration
    pub fn new(config: GeocodingConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(referer) = &config.referer {
            let value = HeaderValue::from_str(referer)
                .with_context(|| format!("Invalid referer header: {referer}"))?;
            headers.insert(REFERER, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let pacer = RequestPacer::new(config.min_request_interval());

        Ok(Self {
            client,
            config,
            pacer,
            cache: None,
        })
    }

    /// Cache reverse lookup labels in `cache`
    #[must_use]
    pub fn with_cache(mut self, cache: PersistentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn config(&self) -> &GeocodingConfig {
        &self.config
    }

    /// Paced GET returning the response body
    async fn fetch(&self, url: &str) -> Result<String, LocationError> {
        self.pacer.wait_turn().await;

        let start = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Geocoding request failed: {}", e);
            LocationError::lookup(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoding service returned HTTP {}", status);
            return Err(LocationError::lookup(format!(
                "service returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LocationError::lookup(format!("failed to read response: {e}")))?;

        debug!(
            "Geocoding response ({} bytes) in {:.3}s",
            body.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(body)
    }

    async fn cached_label(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match cache.get::<String>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Reverse geocode cache read failed: {}", e);
                None
            }
        }
    }

    async fn store_label(&self, key: &str, label: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(key, label.to_string()).await {
                warn!("Reverse geocode cache write failed: {}", e);
            }
        }
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, LocationError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}?q={}&format=json&addressdetails=1&limit={}",
            self.config.search_url,
            urlencoding::encode(query),
            self.config.result_limit
        );
        let body = self.fetch(&url).await?;

        let places: Vec<NominatimPlace> = match serde_json::from_str(&body) {
            Ok(places) => places,
            Err(e) => {
                warn!("Malformed search response for '{}': {}", query, e);
                return Ok(Vec::new());
            }
        };

        let candidates: Vec<SearchCandidate> = places
            .into_iter()
            .filter_map(NominatimPlace::into_candidate)
            .collect();

        if candidates.is_empty() {
            warn!("No results found for '{}'", query);
        } else {
            info!("Found {} candidates for '{}'", candidates.len(), query);
        }
        Ok(candidates)
    }

    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn reverse(&self, coordinates: Coordinates) -> Result<String, LocationError> {
        let key = coordinates.cache_key();
        if let Some(label) = self.cached_label(&key).await {
            debug!("Reverse geocode cache hit");
            return Ok(label);
        }

        let url = format!(
            "{}?lat={}&lon={}&format=json&addressdetails=1&namedetails=0&extratags=0",
            self.config.reverse_url, coordinates.latitude, coordinates.longitude
        );
        let body = self.fetch(&url).await?;

        let response: NominatimReverse = serde_json::from_str(&body).map_err(|e| {
            warn!("Malformed reverse geocoding response: {}", e);
            LocationError::lookup("malformed reverse geocoding response")
        })?;

        if let Some(error) = response.error {
            return Err(LocationError::lookup(error));
        }

        let label = response
            .address
            .as_ref()
            .and_then(format_clean_address)
            .ok_or_else(|| LocationError::lookup("address not found"))?;

        info!("Resolved address '{}'", label);
        self.store_label(&key, &label).await;
        Ok(label)
    }
}
