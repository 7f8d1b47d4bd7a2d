//! `TripShare` - location and pagination core for the travel experience app
//!
//! This library provides the pagination engine behind experience and trip
//! listings, and the location picker used when creating or editing an
//! experience: debounced address search, map selection with reverse
//! geocoding, and the small HTTP surface exposing both.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod location_resolver;
pub mod models;
pub mod navigation;
pub mod pagination;
pub mod picker;
pub mod search;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::TripShareConfig;
pub use error::{LocationError, TripShareError};
pub use geocoding::{Geocoder, NominatimClient};
pub use location_resolver::{LocationResolver, SelectionState};
pub use models::{Coordinates, Location, SearchCandidate};
pub use navigation::{Navigator, PageQuery, Paginator, QueryNavigator};
pub use pagination::{PageItem, PageWindow};
pub use picker::LocationPicker;
pub use search::{DebouncedSearch, SearchState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
