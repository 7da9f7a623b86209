//! HAR document walking.

use super::CaptureError;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Field on each HAR entry holding the contacted server's address.
const SERVER_ADDRESS_FIELD: &str = "serverIPAddress";

/// Result of scanning one capture document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureScan {
    /// Number of entries under `log.entries`.
    pub entries: usize,
    /// Entries that carried a non-empty server address.
    pub with_address: usize,
    /// Distinct normalized addresses, in first-seen order.
    pub addresses: Vec<String>,
}

/// Read and parse a capture file.
pub fn load_document(path: &Path) -> Result<Value, CaptureError> {
    let text = std::fs::read_to_string(path).map_err(|source| CaptureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CaptureError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Walk `log.entries` and collect distinct server addresses.
///
/// A missing `log` or `entries` key (or one of the wrong type) counts as
/// empty. Bracketed IPv6 literals are unwrapped before deduplication.
pub fn scan_document(doc: &Value) -> CaptureScan {
    let entries = doc
        .get("log")
        .and_then(|log| log.get("entries"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut scan = CaptureScan {
        entries: entries.len(),
        ..CaptureScan::default()
    };
    let mut seen = HashSet::new();

    for entry in entries {
        let Some(raw) = entry.get(SERVER_ADDRESS_FIELD).and_then(Value::as_str) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        scan.with_address += 1;
        debug!("entry server address: {raw}");

        let address = normalize_address(raw);
        if address.is_empty() {
            continue;
        }
        if seen.insert(address.to_string()) {
            info!("found server address {address}");
            scan.addresses.push(address.to_string());
        }
    }

    scan
}

/// Distinct server addresses of a parsed document, first-seen order.
pub fn extract_addresses(doc: &Value) -> Vec<String> {
    scan_document(doc).addresses
}

/// Load a capture file and extract its distinct server addresses.
pub fn load_addresses(path: &Path) -> Result<Vec<String>, CaptureError> {
    Ok(extract_addresses(&load_document(path)?))
}

/// Strip IPv6 literal brackets, e.g. `[::1]` -> `::1`.
fn normalize_address(raw: &str) -> &str {
    raw.trim_matches(|c| c == '[' || c == ']')
}
