//! Run configuration for a single capture-to-map pass.

use crate::geo::Coordinates;
use crate::map::MapView;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Capture file read when none is given.
pub const DEFAULT_INPUT: &str = "ipinfo.io.har";
/// Map file written when none is given.
pub const DEFAULT_OUTPUT: &str = "ip_map.html";
/// Cap on the number of addresses looked up per run.
pub const DEFAULT_MAX_ADDRESSES: usize = 25;
/// Geolocation endpoint; `{ip}` is replaced with the raw address.
pub const DEFAULT_ENDPOINT: &str = "https://ipinfo.io/{ip}/json";
/// Placeholder substituted into the endpoint template.
pub const ADDRESS_PLACEHOLDER: &str = "{ip}";
/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Upper bound on lookups in flight at once.
pub const MAX_CONCURRENCY: usize = 64;

/// Invalid configuration, reported before any work starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("endpoint template {0:?} has no {{ip}} placeholder")]
    MissingPlaceholder(String),
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("concurrency {0} is above the limit of {max}", max = MAX_CONCURRENCY)]
    ConcurrencyTooHigh(usize),
    #[error("zoom level {0} is outside 0..=18")]
    InvalidZoom(u8),
}

/// Everything one run needs: where to read, where to write, and how to
/// talk to the geolocation service.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub max_addresses: usize,
    pub endpoint: String,
    /// `None` waits on the service indefinitely.
    pub timeout: Option<Duration>,
    /// Lookups in flight at once. 1 keeps the run strictly sequential.
    pub concurrency: usize,
    /// Minimum gap between the start of two lookups.
    pub min_delay: Duration,
    pub view: MapView,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            max_addresses: DEFAULT_MAX_ADDRESSES,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            concurrency: 1,
            min_delay: Duration::ZERO,
            view: MapView::default(),
        }
    }
}

impl MapperConfig {
    /// Build a config for the given input and output, other fields defaulted.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    /// Convert a timeout given in whole seconds; 0 disables the timeout.
    pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
        (secs > 0).then(|| Duration::from_secs(secs))
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.endpoint.contains(ADDRESS_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(self.endpoint.clone()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::ConcurrencyTooHigh(self.concurrency));
        }
        if self.view.zoom > 18 {
            return Err(ConfigError::InvalidZoom(self.view.zoom));
        }
        Ok(())
    }

    /// Override the map's initial center.
    pub fn with_center(mut self, lat: f64, lon: f64) -> Self {
        self.view.center = Coordinates { lat, lon };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = MapperConfig::default();
        assert_eq!(config.input, PathBuf::from("ipinfo.io.har"));
        assert_eq!(config.output, PathBuf::from("ip_map.html"));
        assert_eq!(config.max_addresses, 25);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_zero_disables() {
        assert_eq!(MapperConfig::timeout_from_secs(0), None);
        assert_eq!(
            MapperConfig::timeout_from_secs(3),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = MapperConfig::default();
        config.endpoint = "https://example.com/lookup".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingPlaceholder(_))
        ));

        let mut config = MapperConfig::default();
        config.concurrency = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroConcurrency));

        let mut config = MapperConfig::default();
        config.concurrency = usize::MAX;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ConcurrencyTooHigh(usize::MAX))
        );

        let mut config = MapperConfig::default();
        config.concurrency = MAX_CONCURRENCY;
        assert!(config.validate().is_ok());

        let mut config = MapperConfig::default();
        config.view.zoom = 30;
        assert_eq!(config.validate(), Err(ConfigError::InvalidZoom(30)));
    }

    #[test]
    fn test_with_center() {
        let config = MapperConfig::new("in.har", "out.html").with_center(51.5, -0.1);
        assert_eq!(config.view.center.lat, 51.5);
        assert_eq!(config.view.center.lon, -0.1);
        assert_eq!(config.output, PathBuf::from("out.html"));
    }
}
