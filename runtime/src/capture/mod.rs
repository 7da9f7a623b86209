//! Capture file loading and server address extraction.
//!
//! Reads a HAR document and collects the distinct server addresses recorded
//! on its entries. Missing structure degrades to an empty result; only an
//! unreadable or malformed file is an error.

pub mod har;

pub use har::{extract_addresses, load_addresses, load_document, scan_document, CaptureScan};

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a capture document at all.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot read capture file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("capture file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
