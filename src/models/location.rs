//! Location model for resolved geographic points and their address labels

use serde::{Deserialize, Serialize};

use crate::error::{Axis, LocationError};

/// Decimal places kept when rounding coordinates unless configured otherwise
pub const DEFAULT_COORDINATE_PRECISION: u32 = 6;

/// Returns true iff `value` lies within [-90, 90]
#[must_use]
pub fn validate_latitude(value: f64) -> bool {
    (-90.0..=90.0).contains(&value)
}

/// Returns true iff `value` lies within [-180, 180]
#[must_use]
pub fn validate_longitude(value: f64) -> bool {
    (-180.0..=180.0).contains(&value)
}

/// Round a coordinate to `precision` decimal places
#[must_use]
pub fn round_coordinate(value: f64, precision: u32) -> f64 {
    let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(6));
    (value * multiplier).round() / multiplier
}

fn check_range(latitude: f64, longitude: f64) -> Result<(), LocationError> {
    if !validate_latitude(latitude) {
        return Err(LocationError::InvalidCoordinate {
            axis: Axis::Latitude,
            value: latitude,
        });
    }
    if !validate_longitude(longitude) {
        return Err(LocationError::InvalidCoordinate {
            axis: Axis::Longitude,
            value: longitude,
        });
    }
    Ok(())
}

/// A validated, rounded coordinate pair
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Validate both axes and round them to `precision` decimal places
    pub fn new(latitude: f64, longitude: f64, precision: u32) -> Result<Self, LocationError> {
        check_range(latitude, longitude)?;
        Ok(Self {
            latitude: round_coordinate(latitude, precision),
            longitude: round_coordinate(longitude, precision),
        })
    }

    /// Key used for caching lookups of this point
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("reverse:{}:{}", self.latitude, self.longitude)
    }
}

/// A resolved point plus its human-readable address.
///
/// Only constructible through validating constructors, so coordinates held by
/// a `Location` are always in range. Deserialization checks the range but
/// keeps stored values as they are; use [`Location::rounded`] to bring a
/// stored record to the configured precision before comparing it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    address: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawLocation {
    #[serde(default)]
    address: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawLocation> for Location {
    type Error = LocationError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        check_range(raw.latitude, raw.longitude)?;
        Ok(Self {
            address: raw.address,
            latitude: raw.latitude,
            longitude: raw.longitude,
        })
    }
}

impl Location {
    /// Create a location from raw coordinates, e.g. those stored on an
    /// existing experience record
    pub fn new(
        latitude: f64,
        longitude: f64,
        address: impl Into<String>,
        precision: u32,
    ) -> Result<Self, LocationError> {
        let coordinates = Coordinates::new(latitude, longitude, precision)?;
        Ok(Self::at(coordinates, address))
    }

    /// Create a location from already validated coordinates
    #[must_use]
    pub fn at(coordinates: Coordinates, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Whether a reverse lookup has labelled this point yet
    #[must_use]
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }

    /// Replace the address label, keeping the coordinates
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Same location with coordinates rounded to `precision` decimal places
    #[must_use]
    pub fn rounded(mut self, precision: u32) -> Self {
        self.latitude = round_coordinate(self.latitude, precision);
        self.longitude = round_coordinate(self.longitude, precision);
        self
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One candidate returned by a forward address search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchCandidate {
    /// Display label as returned by the geocoding service
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}
