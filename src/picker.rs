//! Location picker for the experience form
//!
//! Combines the debounced search box with map selection. Both paths feed the
//! same [`LocationResolver`], so whichever selection came last is the one the
//! form submits.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::config::GeocodingConfig;
use crate::error::LocationError;
use crate::geocoding::Geocoder;
use crate::location_resolver::{LocationResolver, SelectionState};
use crate::models::{Location, SearchCandidate};
use crate::search::{DebouncedSearch, SearchState};

/// Label mirroring armed by a map click
#[derive(Debug)]
struct PendingMirror {
    token: CancellationToken,
    /// Search box text at click time
    expected: String,
}

#[derive(Debug)]
pub struct LocationPicker {
    search: DebouncedSearch,
    resolver: LocationResolver,
    mirror: Option<PendingMirror>,
}

impl LocationPicker {
    /// Empty picker for a new experience
    pub fn new(geocoder: Arc<dyn Geocoder>, config: &GeocodingConfig) -> Self {
        Self {
            search: DebouncedSearch::from_config(Arc::clone(&geocoder), config),
            resolver: LocationResolver::new(geocoder, config.coordinate_precision),
            mirror: None,
        }
    }

    /// Picker pre-filled from an existing experience; the stored address is
    /// shown in the search box without searching for it
    pub fn editing(geocoder: Arc<dyn Geocoder>, config: &GeocodingConfig, location: Location) -> Self {
        let mut search = DebouncedSearch::from_config(Arc::clone(&geocoder), config);
        search.set_query_silently(location.address());
        Self {
            search,
            resolver: LocationResolver::with_location(geocoder, config.coordinate_precision, location),
            mirror: None,
        }
    }

    /// User typed into the search box
    pub fn type_query(&mut self, query: impl Into<String>) {
        self.search.input(query);
    }

    /// User pressed Enter or the search button
    pub fn submit_query(&mut self) {
        self.search.submit();
    }

    /// User picked one of the listed results.
    ///
    /// The label goes into the search box without triggering another search
    /// and the results list closes.
    #[instrument(skip(self), fields(label = %candidate.label))]
    pub fn choose_result(&mut self, candidate: &SearchCandidate) -> Result<Location, LocationError> {
        let location = self.resolver.select_from_search_result(candidate)?;
        self.disarm_mirror();
        self.search.set_query_silently(candidate.label.clone());
        Ok(location)
    }

    /// User clicked the map (or the device reported its position).
    ///
    /// Once the address for the point arrives it is written into the search
    /// box silently, unless the user has typed in the meantime. Must be
    /// called from within a Tokio runtime.
    pub fn click_map(&mut self, latitude: f64, longitude: f64) -> Result<Location, LocationError> {
        let clicked = self.resolver.select_from_map(latitude, longitude)?;
        self.search.cancel();
        self.disarm_mirror();

        let token = CancellationToken::new();
        let expected = self.search.query();
        self.mirror = Some(PendingMirror {
            token: token.clone(),
            expected: expected.clone(),
        });

        let mirror = self.search.mirror();
        let mut selection = self.resolver.subscribe();
        let point = clicked.coordinates();
        tokio::spawn(async move {
            let settled = async {
                selection
                    .wait_for(|state| !state.is_pending())
                    .await
                    .ok()
                    .and_then(|state| state.location().cloned())
            };
            let resolved = tokio::select! {
                () = token.cancelled() => return,
                resolved = settled => resolved,
            };

            let Some(location) = resolved else { return };
            if location.coordinates() == point
                && location.has_address()
                && mirror.replace_if_unchanged(&expected, location.address())
            {
                debug!("Mirrored resolved address into search box");
            }
        });

        Ok(clicked)
    }

    /// Wait for any address lookup to finish and return the selection
    pub async fn resolved_location(&mut self) -> Option<Location> {
        let location = self.resolver.settled().await?;
        if let Some(pending) = self.mirror.take() {
            pending.token.cancel();
            if location.has_address() {
                self.search
                    .mirror()
                    .replace_if_unchanged(&pending.expected, location.address());
            }
        }
        Some(location)
    }

    /// The current selection, possibly still waiting for its address
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.resolver.location()
    }

    #[must_use]
    pub fn selection(&self) -> SelectionState {
        self.resolver.state()
    }

    /// Watch selection changes
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<SelectionState> {
        self.resolver.subscribe()
    }

    #[must_use]
    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    /// Text in the search box
    #[must_use]
    pub fn query(&self) -> String {
        self.search.query()
    }

    /// Drop any lookup still in flight
    pub fn cancel(&mut self) {
        self.disarm_mirror();
        self.search.cancel();
        self.resolver.cancel_pending();
    }

    fn disarm_mirror(&mut self) {
        if let Some(pending) = self.mirror.take() {
            pending.token.cancel();
        }
    }
}

impl Drop for LocationPicker {
    fn drop(&mut self) {
        self.disarm_mirror();
    }
}
