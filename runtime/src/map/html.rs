//! Standalone Leaflet page generation.

use super::document::MapDocument;

const LEAFLET_VERSION: &str = "1.9.4";
const MARKERCLUSTER_VERSION: &str = "1.5.3";
const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Marker data as a JS literal that cannot close the surrounding script.
fn markers_literal(doc: &MapDocument) -> String {
    serde_json::to_string(doc.markers())
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/")
}

/// Render the full page: base map, cluster group, one marker per entry.
pub fn render_page(doc: &MapDocument) -> String {
    let view = doc.view();
    let leaflet = format!("https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist");
    let cluster = format!("https://unpkg.com/leaflet.markercluster@{MARKERCLUSTER_VERSION}/dist");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Server locations</title>
<link rel="stylesheet" href="{leaflet}/leaflet.css">
<link rel="stylesheet" href="{cluster}/MarkerCluster.css">
<link rel="stylesheet" href="{cluster}/MarkerCluster.Default.css">
<script src="{leaflet}/leaflet.js"></script>
<script src="{cluster}/leaflet.markercluster.js"></script>
<style>html, body, #map {{ width: 100%; height: 100%; margin: 0; padding: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView([{lat}, {lon}], {zoom});
L.tileLayer("{TILE_URL}", {{
    maxZoom: 18,
    attribution: '{TILE_ATTRIBUTION}'
}}).addTo(map);
var cluster = L.markerClusterGroup();
var markers = {markers};
markers.forEach(function (m) {{
    L.marker([m.lat, m.lon]).bindPopup(m.popup).addTo(cluster);
}});
cluster.addTo(map);
</script>
</body>
</html>
"#,
        lat = view.center.lat,
        lon = view.center.lon,
        zoom = view.zoom,
        markers = markers_literal(doc),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{MapMarker, MapView};

    #[test]
    fn test_escape() {
        assert_eq!(escape("1.2.3.4"), "1.2.3.4");
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_empty_map_is_complete_page() {
        let html = MapDocument::new(MapView::default()).to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("var markers = [];"));
        assert!(html.contains("setView([20, 0], 2)"));
        assert!(html.contains("L.markerClusterGroup()"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_markers_embedded_as_json() {
        let mut doc = MapDocument::new(MapView::default());
        doc.add_marker(MapMarker {
            lat: 10.0,
            lon: 20.0,
            popup: "IP: 1.2.3.4".to_string(),
        });

        let html = doc.to_html();
        assert!(html.contains(r#"var markers = [{"lat":10.0,"lon":20.0,"popup":"IP: 1.2.3.4"}];"#));
    }

    #[test]
    fn test_script_close_is_neutralized() {
        let mut doc = MapDocument::new(MapView::default());
        doc.add_marker(MapMarker {
            lat: 1.0,
            lon: 1.0,
            popup: "</script><script>alert(1)</script>".to_string(),
        });

        let html = doc.to_html();
        assert_eq!(html.matches("</script>").count(), 3);
        assert!(html.contains(r"<\/script>"));
    }
}
