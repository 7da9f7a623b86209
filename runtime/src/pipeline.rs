//! One run: capture file in, map file out.

use crate::capture;
use crate::config::MapperConfig;
use crate::geo::{self, GeoResolver, LookupThrottle, ResolvedLocation};
use crate::map;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What a run did, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub entries: usize,
    pub addresses_found: usize,
    pub addresses_considered: usize,
    pub resolved: usize,
    pub markers: usize,
    pub unresolved: Vec<String>,
    pub locations: Vec<ResolvedLocation>,
    pub generated_at: DateTime<Utc>,
}

/// Run the pipeline without progress reporting.
pub async fn run(config: &MapperConfig) -> Result<RunSummary> {
    run_with_progress(config, |_, _| {}, |_| {}).await
}

/// Run the pipeline.
///
/// `on_start` receives every distinct address found in the capture, in
/// first-seen order, and how many of them will be looked up; `on_result`
/// is called once per finished lookup.
pub async fn run_with_progress<S, F>(
    config: &MapperConfig,
    on_start: S,
    on_result: F,
) -> Result<RunSummary>
where
    S: FnOnce(&[String], usize),
    F: FnMut(&ResolvedLocation),
{
    config.validate()?;

    let doc = capture::load_document(&config.input)
        .with_context(|| format!("failed to load capture {}", config.input.display()))?;
    let scan = capture::scan_document(&doc);
    drop(doc);
    info!(
        entries = scan.entries,
        unique = scan.addresses.len(),
        "capture scanned"
    );

    let considered = &scan.addresses[..scan.addresses.len().min(config.max_addresses)];
    on_start(&scan.addresses, considered.len());

    let resolver = GeoResolver::new(config.endpoint.as_str(), config.timeout)
        .context("failed to build HTTP client")?;
    let throttle = LookupThrottle::new(config.concurrency, config.min_delay);
    let locations = geo::resolve_all(&resolver, considered, &throttle, on_result).await;

    let markers = map::build_map(&locations, &config.output, config.view)?;

    let unresolved: Vec<String> = locations
        .iter()
        .filter(|l| !l.is_resolved())
        .map(|l| l.address.clone())
        .collect();

    Ok(RunSummary {
        input: config.input.clone(),
        output: config.output.clone(),
        entries: scan.entries,
        addresses_found: scan.addresses.len(),
        addresses_considered: considered.len(),
        resolved: locations.len() - unresolved.len(),
        markers,
        unresolved,
        locations,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureError;

    #[tokio::test]
    async fn test_missing_capture_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = MapperConfig::new(dir.path().join("absent.har"), dir.path().join("out.html"));

        let err = run(&config).await.unwrap_err();
        assert!(err.downcast_ref::<CaptureError>().is_some());
        assert!(!dir.path().join("out.html").exists());
    }

    #[tokio::test]
    async fn test_invalid_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MapperConfig::new(dir.path().join("in.har"), dir.path().join("out.html"));
        config.concurrency = 0;

        assert!(run(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_start_hook_sees_every_found_address() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("three.har");
        std::fs::write(
            &input,
            r#"{"log": {"entries": [
                {"serverIPAddress": "192.0.2.1"},
                {"serverIPAddress": "[2001:db8::1]"},
                {"serverIPAddress": "192.0.2.1"},
                {"serverIPAddress": "192.0.2.2"}
            ]}}"#,
        )
        .unwrap();
        let mut config = MapperConfig::new(&input, dir.path().join("out.html"));
        config.max_addresses = 0;

        let mut seen = Vec::new();
        let mut lookups = 0;
        run_with_progress(
            &config,
            |found, considered| {
                seen = found.to_vec();
                assert_eq!(considered, 0);
            },
            |_| lookups += 1,
        )
        .await
        .unwrap();

        assert_eq!(seen, vec!["192.0.2.1", "2001:db8::1", "192.0.2.2"]);
        assert_eq!(lookups, 0);
    }

    #[tokio::test]
    async fn test_empty_capture_still_writes_map() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.har");
        std::fs::write(&input, r#"{"log": {"entries": []}}"#).unwrap();
        let output = dir.path().join("out.html");

        let summary = run(&MapperConfig::new(&input, &output)).await.unwrap();
        assert_eq!(summary.addresses_found, 0);
        assert_eq!(summary.markers, 0);
        assert!(summary.locations.is_empty());
        assert!(std::fs::read_to_string(&output)
            .unwrap()
            .contains("var markers = [];"));
    }
}
