//! Overlays drawn on top of the map: markers with popups, and route polylines.
//!
//! The registries here own only geography and text. Screen placement is recomputed from the
//! [`meridian::Projector`] on every frame, so overlays stay glued to their coordinates through
//! any pan, zoom or view mode change.

mod markers;
mod route;

pub use markers::{Marker, MarkerId, MarkerLayer, MarkerStyle, Markers};
pub use route::{ActiveRoute, RouteLayer, RouteStyle};
