//! Geolocation result types and the `loc` field parser.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Why a single lookup produced nothing usable.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid lookup URL {url:?}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("service answered HTTP {0}")]
    Status(u16),
    #[error("response is not JSON: {0}")]
    Body(#[from] serde_json::Error),
    #[error("malformed loc field {0:?}")]
    MalformedLoc(String),
}

/// The subset of a geolocation response this tool reads.
///
/// Every field is optional; ipinfo.io omits `loc` for bogon and
/// reserved addresses. Fields are kept as raw JSON so a label of an
/// unexpected type cannot reject the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoResponse {
    pub loc: Option<Value>,
    pub city: Option<Value>,
    pub region: Option<Value>,
    pub country: Option<Value>,
    pub org: Option<Value>,
}

/// A parsed lookup: coordinates when the service had them, plus labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoRecord {
    pub coordinates: Option<Coordinates>,
    pub place: Option<String>,
    pub org: Option<String>,
}

/// A non-empty string label; anything else is dropped.
fn label(value: &Option<Value>) -> Option<&str> {
    value
        .as_ref()
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

impl TryFrom<GeoResponse> for GeoRecord {
    type Error = LookupError;

    fn try_from(resp: GeoResponse) -> Result<Self, Self::Error> {
        let coordinates = match &resp.loc {
            Some(Value::String(loc)) => Some(parse_loc(loc)?),
            Some(other) => return Err(LookupError::MalformedLoc(other.to_string())),
            None => None,
        };

        let parts: Vec<&str> = [&resp.city, &resp.region, &resp.country]
            .into_iter()
            .filter_map(label)
            .collect();
        let place = (!parts.is_empty()).then(|| parts.join(", "));

        Ok(Self {
            coordinates,
            place,
            org: label(&resp.org).map(str::to_string),
        })
    }
}

/// One address and where it resolved to, if anywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub address: String,
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
}

impl ResolvedLocation {
    /// An address with no known location.
    pub fn unresolved(address: &str) -> Self {
        Self {
            address: address.to_string(),
            coordinates: None,
            place: None,
            org: None,
        }
    }

    pub fn from_record(address: &str, record: GeoRecord) -> Self {
        Self {
            address: address.to_string(),
            coordinates: record.coordinates,
            place: record.place,
            org: record.org,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// Parse a `"<lat>,<lon>"` string.
pub fn parse_loc(loc: &str) -> Result<Coordinates, LookupError> {
    let malformed = || LookupError::MalformedLoc(loc.to_string());

    let (lat, lon) = loc.split_once(',').ok_or_else(malformed)?;
    let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;
    let lon: f64 = lon.trim().parse().map_err(|_| malformed())?;
    if !lat.is_finite() || !lon.is_finite() {
        return Err(malformed());
    }

    Ok(Coordinates { lat, lon })
}
