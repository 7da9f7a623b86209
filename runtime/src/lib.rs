//! Harmap: plot the servers contacted in a HAR capture on a world map.
//!
//! A run has three stages: [`capture`] pulls distinct server addresses out
//! of the capture file, [`geo`] resolves each to coordinates through a
//! geolocation service, and [`map`] writes a clustered Leaflet page.
//! [`pipeline`] wires them together from a [`config::MapperConfig`].

pub mod capture;
pub mod cli;
pub mod config;
pub mod geo;
pub mod map;
pub mod pipeline;
