//! Configuration management for `TripShare`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripShareError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for `TripShare`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripShareConfig {
    /// Address lookup service configuration
    pub geocoding: GeocodingConfig,
    /// List pagination settings
    pub pagination: PaginationConfig,
    /// Reverse lookup cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// HTTP server settings
    pub server: ServerConfig,
}

/// Geocoding service and location picker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Forward search endpoint
    pub search_url: String,
    /// Reverse geocoding endpoint
    pub reverse_url: String,
    /// User-Agent sent with every request (required by the service policy)
    pub user_agent: String,
    /// Optional Referer header
    pub referer: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
    /// Minimum spacing between two requests in milliseconds
    pub min_request_interval_ms: u64,
    /// Maximum number of candidates returned by a search
    pub result_limit: u32,
    /// Quiet period after the last keystroke before a search is issued
    pub debounce_ms: u64,
    /// Shortest trimmed query that triggers an automatic search
    pub min_query_chars: usize,
    /// Decimal places kept on coordinates
    pub coordinate_precision: u32,
}

/// Pagination settings shared by list views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Items shown on one page
    pub items_per_page: usize,
    /// Query parameter carrying the current page
    pub page_param: String,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether reverse lookups are cached on disk
    pub enabled: bool,
    /// Cache directory location
    pub location: String,
    /// Cache TTL in hours
    pub ttl_hours: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

// Default value functions
fn default_search_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_reverse_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_user_agent() -> String {
    "TripShare/1.0".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_min_request_interval() -> u64 {
    1000
}

fn default_result_limit() -> u32 {
    5
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_min_query_chars() -> usize {
    2
}

fn default_coordinate_precision() -> u32 {
    crate::models::location::DEFAULT_COORDINATE_PRECISION
}

fn default_items_per_page() -> usize {
    6
}

fn default_page_param() -> String {
    crate::navigation::DEFAULT_PAGE_PARAM.to_string()
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("tripshare").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".cache/tripshare".to_string())
}

fn default_cache_ttl() -> u32 {
    168
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            reverse_url: default_reverse_url(),
            user_agent: default_user_agent(),
            referer: None,
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            min_request_interval_ms: default_min_request_interval(),
            result_limit: default_result_limit(),
            debounce_ms: default_debounce_ms(),
            min_query_chars: default_min_query_chars(),
            coordinate_precision: default_coordinate_precision(),
        }
    }
}

impl GeocodingConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    #[must_use]
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            items_per_page: default_items_per_page(),
            page_param: default_page_param(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            location: default_cache_location(),
            ttl_hours: default_cache_ttl(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 60 * 60)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl TripShareConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPSHARE_GEOCODING__DEBOUNCE_MS=300 style overrides
        builder = builder.add_source(
            Environment::with_prefix("TRIPSHARE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripShareConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripshare").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        let geocoding = &mut self.geocoding;
        if geocoding.search_url.is_empty() {
            geocoding.search_url = default_search_url();
        }
        if geocoding.reverse_url.is_empty() {
            geocoding.reverse_url = default_reverse_url();
        }
        if geocoding.user_agent.is_empty() {
            geocoding.user_agent = default_user_agent();
        }
        if geocoding.timeout_seconds == 0 {
            geocoding.timeout_seconds = default_timeout();
        }
        if geocoding.result_limit == 0 {
            geocoding.result_limit = default_result_limit();
        }
        if geocoding.debounce_ms == 0 {
            geocoding.debounce_ms = default_debounce_ms();
        }
        if geocoding.min_query_chars == 0 {
            geocoding.min_query_chars = default_min_query_chars();
        }
        if self.pagination.items_per_page == 0 {
            self.pagination.items_per_page = default_items_per_page();
        }
        if self.pagination.page_param.is_empty() {
            self.pagination.page_param = default_page_param();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let geocoding = &self.geocoding;

        if geocoding.timeout_seconds > 300 {
            return Err(TripShareError::config(
                "Geocoding timeout cannot exceed 300 seconds",
            )
            .into());
        }

        if geocoding.max_retries > 10 {
            return Err(TripShareError::config("Geocoding max retries cannot exceed 10").into());
        }

        if !(1..=50).contains(&geocoding.result_limit) {
            return Err(TripShareError::config("Search result limit must be between 1 and 50").into());
        }

        if !(300..=2000).contains(&geocoding.debounce_ms) {
            return Err(TripShareError::config(
                "Search debounce must be between 300 and 2000 milliseconds",
            )
            .into());
        }

        if geocoding.min_query_chars == 0 {
            return Err(TripShareError::config("Minimum query length must be at least 1").into());
        }

        if geocoding.coordinate_precision > 10 {
            return Err(TripShareError::config(
                "Coordinate precision cannot exceed 10 decimal places",
            )
            .into());
        }

        if !(1..=100).contains(&self.pagination.items_per_page) {
            return Err(TripShareError::config("Items per page must be between 1 and 100").into());
        }

        if self.cache.ttl_hours > 8760 {
            return Err(TripShareError::config("Cache TTL cannot exceed 8760 hours (1 year)").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripShareError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripShareError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("search", &self.geocoding.search_url),
            ("reverse", &self.geocoding.reverse_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripShareError::config(format!(
                    "Geocoding {name} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
