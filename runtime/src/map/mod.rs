//! Map rendering: markers for resolved locations on a clustered world map.
//!
//! The output is a single HTML page that loads Leaflet and
//! Leaflet.markercluster and embeds the marker data inline.

pub mod document;
pub mod html;

pub use document::{build_map, render_locations, MapDocument, MapMarker, MapView};
