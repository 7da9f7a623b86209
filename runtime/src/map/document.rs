//! In-memory map: a view plus the markers placed on it.

use super::html;
use crate::geo::{Coordinates, ResolvedLocation};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Initial camera position of the rendered map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
}

impl Default for MapView {
    /// World scale, nudged north so populated latitudes fill the frame.
    fn default() -> Self {
        Self {
            center: Coordinates { lat: 20.0, lon: 0.0 },
            zoom: 2,
        }
    }
}

/// A single pin. `popup` is already HTML-escaped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub popup: String,
}

impl MapMarker {
    /// Marker for a resolved location; `None` when it has no coordinates.
    pub fn for_location(location: &ResolvedLocation) -> Option<Self> {
        let Coordinates { lat, lon } = location.coordinates?;

        let mut popup = format!("IP: {}", html::escape(&location.address));
        for line in [&location.place, &location.org].into_iter().flatten() {
            popup.push_str("<br>");
            popup.push_str(&html::escape(line));
        }

        Some(Self { lat, lon, popup })
    }
}

/// Map being assembled for one run. Markers are clustered when rendered.
#[derive(Debug, Clone, Default)]
pub struct MapDocument {
    view: MapView,
    markers: Vec<MapMarker>,
}

impl MapDocument {
    pub fn new(view: MapView) -> Self {
        Self {
            view,
            markers: Vec::new(),
        }
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn add_marker(&mut self, marker: MapMarker) {
        self.markers.push(marker);
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    /// Serialize to a standalone HTML page.
    pub fn to_html(&self) -> String {
        html::render_page(self)
    }

    /// Write the page to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_html())
            .with_context(|| format!("failed to write map: {}", path.display()))
    }
}

/// Place one marker per location that has coordinates.
pub fn render_locations(locations: &[ResolvedLocation], view: MapView) -> MapDocument {
    let mut doc = MapDocument::new(view);
    for marker in locations.iter().filter_map(MapMarker::for_location) {
        doc.add_marker(marker);
    }
    doc
}

/// Render locations and save the page. Returns the number of markers.
pub fn build_map(locations: &[ResolvedLocation], output: &Path, view: MapView) -> Result<usize> {
    let doc = render_locations(locations, view);
    doc.save(output)?;
    info!(
        markers = doc.markers().len(),
        "map saved to {}",
        output.display()
    );
    Ok(doc.markers().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(address: &str, lat: f64, lon: f64) -> ResolvedLocation {
        ResolvedLocation {
            address: address.to_string(),
            coordinates: Some(Coordinates { lat, lon }),
            place: None,
            org: None,
        }
    }

    #[test]
    fn test_one_marker_per_resolved_location() {
        let locations = vec![
            located("1.2.3.4", 10.0, 20.0),
            ResolvedLocation::unresolved("::1"),
            located("5.6.7.8", -33.9, 151.2),
        ];

        let doc = render_locations(&locations, MapView::default());
        assert_eq!(doc.markers().len(), 2);
        assert_eq!(doc.markers()[0].lat, 10.0);
        assert_eq!(doc.markers()[0].lon, 20.0);
        assert_eq!(doc.markers()[0].popup, "IP: 1.2.3.4");
    }

    #[test]
    fn test_zero_coordinates_are_rendered() {
        let doc = render_locations(&[located("0.0.0.1", 0.0, 0.0)], MapView::default());
        assert_eq!(doc.markers().len(), 1);

        let doc = render_locations(&[located("0.0.0.2", 51.48, 0.0)], MapView::default());
        assert_eq!(doc.markers().len(), 1);
    }

    #[test]
    fn test_popup_includes_labels_escaped() {
        let mut loc = located("1.1.1.1", -27.47, 153.02);
        loc.place = Some("Brisbane, Queensland, AU".to_string());
        loc.org = Some("AS13335 <Cloudflare> & co".to_string());

        let marker = MapMarker::for_location(&loc).unwrap();
        assert_eq!(
            marker.popup,
            "IP: 1.1.1.1<br>Brisbane, Queensland, AU<br>AS13335 &lt;Cloudflare&gt; &amp; co"
        );
    }

    #[test]
    fn test_default_view() {
        let view = MapView::default();
        assert_eq!(view.center, Coordinates { lat: 20.0, lon: 0.0 });
        assert_eq!(view.zoom, 2);
    }

    #[test]
    fn test_build_map_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maps").join("ip_map.html");

        let count = build_map(&[located("1.2.3.4", 10.0, 20.0)], &path, MapView::default()).unwrap();
        assert_eq!(count, 1);

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("IP: 1.2.3.4"));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ip_map.html");
        std::fs::write(&path, "stale").unwrap();

        build_map(&[], &path, MapView::default()).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(!html.contains("stale"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
