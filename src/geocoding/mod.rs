//! Address lookup boundary
//!
//! The location picker talks to the external geocoding service only through
//! the [`Geocoder`] trait, so the debounce and fallback logic can run against
//! a fake in tests. [`NominatimClient`] is the production implementation.

use async_trait::async_trait;

use crate::error::LocationError;
use crate::models::{Coordinates, SearchCandidate};

pub mod address;
pub mod nominatim;
pub mod pacing;

pub use address::{StructuredAddress, format_clean_address};
pub use nominatim::NominatimClient;
pub use pacing::RequestPacer;

/// Forward and reverse address lookups
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates for a free-text query, best match first.
    ///
    /// Blank queries and malformed responses yield an empty list.
    async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, LocationError>;

    /// Display address for a point
    async fn reverse(&self, coordinates: Coordinates) -> Result<String, LocationError>;
}
