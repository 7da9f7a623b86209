//! HTTP client for the geolocation service.

use super::types::{GeoRecord, GeoResponse, LookupError, ResolvedLocation};
use crate::config::ADDRESS_PLACEHOLDER;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Resolves server addresses to coordinates, one GET per address.
pub struct GeoResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl GeoResolver {
    /// Create a resolver for an endpoint template containing `{ip}`.
    ///
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, LookupError> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("harmap/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    /// The request URL for one address.
    pub fn lookup_url(&self, address: &str) -> Result<Url, LookupError> {
        let raw = self.endpoint.replace(ADDRESS_PLACEHOLDER, address);
        Url::parse(&raw).map_err(|source| LookupError::Url { url: raw, source })
    }

    /// Query the service for one address.
    ///
    /// A response without a `loc` field is not an error; the record simply
    /// carries no coordinates.
    pub async fn lookup(&self, address: &str) -> Result<GeoRecord, LookupError> {
        let url = self.lookup_url(address)?;
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        let body: GeoResponse = serde_json::from_slice(&bytes)?;
        debug!(address, ?body, "geolocation response");

        GeoRecord::try_from(body)
    }

    /// Look up one address, turning any failure into an unresolved result.
    pub async fn resolve(&self, address: &str) -> ResolvedLocation {
        match self.lookup(address).await {
            Ok(record) => {
                if record.coordinates.is_none() {
                    debug!("no location for {address}");
                }
                ResolvedLocation::from_record(address, record)
            }
            Err(e) => {
                warn!("error locating {address}: {e}");
                ResolvedLocation::unresolved(address)
            }
        }
    }
}
