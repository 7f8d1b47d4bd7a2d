//! Location Resolution Module
//!
//! Turns map clicks and search-result picks into validated, rounded
//! [`Location`] values for the experience form that owns the resolver.
//!
//! Map clicks resolve immediately with an empty address; the label is
//! backfilled by a reverse lookup in the background. A failed lookup leaves
//! the point selected without a label. A newer selection always wins over a
//! lookup still in flight for an older one.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::LocationError;
use crate::geocoding::Geocoder;
use crate::models::{Coordinates, Location, SearchCandidate};

/// Progress of the current selection
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    /// Nothing selected yet
    #[default]
    Idle,
    /// Point chosen on the map, address lookup in flight
    ReverseGeocodePending(Location),
    /// Point chosen with an address
    Resolved(Location),
    /// Point chosen but no address could be found
    ResolvedWithoutLabel(Location),
}

impl SelectionState {
    /// The selected location, if any
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            SelectionState::Idle => None,
            SelectionState::ReverseGeocodePending(location)
            | SelectionState::Resolved(location)
            | SelectionState::ResolvedWithoutLabel(location) => Some(location),
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, SelectionState::ReverseGeocodePending(_))
    }
}

/// Look up the address for `coordinates`, logging and swallowing failures
#[instrument(skip(geocoder))]
pub async fn reverse_geocode(geocoder: &dyn Geocoder, coordinates: Coordinates) -> Option<String> {
    match geocoder.reverse(coordinates).await {
        Ok(label) if !label.trim().is_empty() => Some(label),
        Ok(_) => {
            debug!("Reverse geocoding returned an empty label");
            None
        }
        Err(e) => {
            warn!("Reverse geocoding failed, keeping coordinates without label: {}", e);
            None
        }
    }
}

/// Resolves location selections for one form
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    precision: u32,
    state: Arc<watch::Sender<SelectionState>>,
    pending: Option<CancellationToken>,
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver")
            .field("precision", &self.precision)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl LocationResolver {
    /// Create a resolver with nothing selected
    pub fn new(geocoder: Arc<dyn Geocoder>, precision: u32) -> Self {
        let (state, _) = watch::channel(SelectionState::Idle);
        Self {
            geocoder,
            precision,
            state: Arc::new(state),
            pending: None,
        }
    }

    /// Create a resolver pre-filled from an existing record, rounded to
    /// `precision`
    pub fn with_location(geocoder: Arc<dyn Geocoder>, precision: u32, location: Location) -> Self {
        let resolver = Self::new(geocoder, precision);
        resolver
            .state
            .send_replace(SelectionState::Resolved(location.rounded(precision)));
        resolver
    }

    /// Snapshot of the current selection state
    #[must_use]
    pub fn state(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    /// The selected location, if any
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.state.borrow().location().cloned()
    }

    /// Watch selection changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    /// Select a point clicked on the map.
    ///
    /// Returns the rounded location straight away with an empty address and
    /// starts a background reverse lookup to fill it in. Must be called from
    /// within a Tokio runtime.
    #[instrument(skip(self))]
    pub fn select_from_map(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Location, LocationError> {
        let coordinates = Coordinates::new(latitude, longitude, self.precision)?;
        let location = Location::at(coordinates, "");

        let token = self.restart();
        self.state
            .send_replace(SelectionState::ReverseGeocodePending(location.clone()));

        let geocoder = Arc::clone(&self.geocoder);
        let state = Arc::clone(&self.state);
        let pending = location.clone();
        tokio::spawn(async move {
            let label = tokio::select! {
                () = token.cancelled() => {
                    debug!("Reverse lookup superseded");
                    return;
                }
                label = reverse_geocode(geocoder.as_ref(), coordinates) => label,
            };

            state.send_if_modified(|current| {
                if token.is_cancelled() {
                    return false;
                }
                *current = match label {
                    Some(label) => SelectionState::Resolved(pending.with_address(label)),
                    None => SelectionState::ResolvedWithoutLabel(pending),
                };
                true
            });
        });

        Ok(location)
    }

    /// Select a candidate returned by an address search.
    ///
    /// The candidate's label is used as the address as-is; no reverse
    /// lookup is made.
    #[instrument(skip(self), fields(label = %candidate.label))]
    pub fn select_from_search_result(
        &mut self,
        candidate: &SearchCandidate,
    ) -> Result<Location, LocationError> {
        let coordinates = Coordinates::new(candidate.latitude, candidate.longitude, self.precision)?;
        let location = Location::at(coordinates, candidate.label.clone());

        self.cancel_lookup();
        self.state
            .send_replace(SelectionState::Resolved(location.clone()));
        Ok(location)
    }

    /// Wait until no reverse lookup is in flight and return the selection
    pub async fn settled(&self) -> Option<Location> {
        let mut receiver = self.state.subscribe();
        match receiver.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.location().cloned(),
            Err(_) => self.location(),
        }
    }

    /// Cancel any reverse lookup still in flight.
    ///
    /// A point still waiting for its label stays selected without one.
    pub fn cancel_pending(&mut self) {
        self.cancel_lookup();
        self.state.send_if_modified(|current| {
            let SelectionState::ReverseGeocodePending(location) = current else {
                return false;
            };
            let unlabelled = location.clone();
            *current = SelectionState::ResolvedWithoutLabel(unlabelled);
            true
        });
    }

    fn cancel_lookup(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    fn restart(&mut self) -> CancellationToken {
        self.cancel_lookup();
        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        token
    }
}

impl Drop for LocationResolver {
    fn drop(&mut self) {
        self.cancel_lookup();
    }
}
