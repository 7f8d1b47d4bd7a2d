//! Error types and handling for the `TripShare` location and pagination core

use thiserror::Error;

/// Which half of a coordinate pair failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Latitude => write!(f, "latitude"),
            Axis::Longitude => write!(f, "longitude"),
        }
    }
}

/// Errors raised while resolving a location.
///
/// Both variants are handled inside the location picker: an invalid
/// coordinate rejects the selection, a failed lookup degrades to an empty
/// result list or a missing label.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    /// Latitude or longitude outside its valid range
    #[error("Invalid {axis}: {value}")]
    InvalidCoordinate { axis: Axis, value: f64 },

    /// Network or service failure during search or reverse geocoding
    #[error("Lookup failed: {message}")]
    LookupFailed { message: String },
}

impl LocationError {
    /// Create a new lookup failure
    pub fn lookup<S: Into<String>>(message: S) -> Self {
        Self::LookupFailed {
            message: message.into(),
        }
    }
}

/// Main error type for the `TripShare` application
#[derive(Error, Debug)]
pub enum TripShareError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Geocoding service communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripShareError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripShareError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TripShareError::Api { .. } => {
                "Unable to reach the address lookup service. Please check your internet connection."
                    .to_string()
            }
            TripShareError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripShareError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            TripShareError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripShareError::General { message } => message.clone(),
        }
    }
}

impl From<LocationError> for TripShareError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::InvalidCoordinate { .. } => Self::validation(err.to_string()),
            LocationError::LookupFailed { message } => Self::api(message),
        }
    }
}
