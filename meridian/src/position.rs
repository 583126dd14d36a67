//! Types and functions for working with positions.

use crate::mercator::{project, unproject};
use egui::Vec2;

/// Geographical position with latitude and longitude.
pub type Position = geo_types::Point;

/// Construct `Position` from latitude and longitude.
pub fn lat_lon(lat: f64, lon: f64) -> Position {
    Position::new(lon, lat)
}

/// Construct `Position` from longitude and latitude. Note that it is common standard to write
/// coordinates starting with the latitude instead (e.g. `40.7580, -73.9855` is Times Square).
pub fn lon_lat(lon: f64, lat: f64) -> Position {
    Position::new(lon, lat)
}

/// Location projected on the screen or an abstract bitmap.
pub type Pixels = geo_types::Point;

pub trait PixelsExt {
    fn to_vec2(&self) -> egui::Vec2;
    fn from_vec2(_: egui::Vec2) -> Self;
}

impl PixelsExt for Pixels {
    fn to_vec2(&self) -> egui::Vec2 {
        egui::Vec2::new(self.x() as f32, self.y() as f32)
    }

    fn from_vec2(vec2: egui::Vec2) -> Self {
        Pixels::new(vec2.x as f64, vec2.y as f64)
    }
}

/// Geographical [`Position`] shifted by a number of pixels on the screen.
///
/// A bare [`Position`] cannot represent a dragged map accurately: repeatedly unprojecting after
/// every pointer move accumulates floating point error, so the pixel offset is kept separate and
/// only resolved when the real position is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedPosition {
    /// Base geographical position.
    pub position: Position,
    /// Offset in pixels.
    pub offset: Pixels,
    /// Zoom level at which the position was adjusted.
    pub zoom: f64,
}

impl AdjustedPosition {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            offset: Pixels::new(0.0, 0.0),
            zoom: 1.0, // Does not matter, as offset is zero.
        }
    }

    /// Calculate the real position, i.e. including the offset.
    pub fn position(&self) -> Position {
        unproject(project(self.position, self.zoom) - self.offset, self.zoom)
    }

    /// Shift by a number of screen pixels. An offset gathered at a different zoom level is
    /// rescaled first, since the same pixel distance covers twice the geography one level down.
    pub fn shift(self, offset: Vec2, zoom: f64) -> Self {
        let changed_zoom_factor = 2.0_f64.powf(zoom - self.zoom);
        Self {
            position: self.position,
            offset: self.offset * changed_zoom_factor + Pixels::from_vec2(offset),
            zoom,
        }
    }

    pub fn offset_length(&self) -> f32 {
        self.offset.to_vec2().length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_adjusted_position() -> AdjustedPosition {
        AdjustedPosition::new(lat_lon(40.7128, -74.0060))
    }

    #[test]
    fn shifting_by_zero_pixels_changes_nothing() {
        let original = base_adjusted_position();
        let shifted = original.clone().shift(Vec2::ZERO, 13.0);
        approx::assert_relative_eq!(shifted.position().x(), original.position().x());
        approx::assert_relative_eq!(shifted.position().y(), original.position().y());
    }

    #[test]
    fn shifting_moves_the_resolved_position() {
        let shifted = base_adjusted_position().shift(Vec2::new(10.0, 20.0), 13.0);
        assert_ne!(shifted.position(), base_adjusted_position().position());
        approx::assert_relative_eq!(shifted.offset_length(), Vec2::new(10.0, 20.0).length());
    }

    #[test]
    fn shifting_at_different_zoom_levels_rescales_the_offset() {
        // 5px at zoom 10 covers the same geography as 10px at zoom 11.
        let a = base_adjusted_position()
            .shift(Vec2::new(5.0, 10.0), 10.0)
            .shift(Vec2::new(10.0, 20.0), 11.0);
        let b = base_adjusted_position().shift(Vec2::new(20.0, 40.0), 11.0);

        approx::assert_relative_eq!(a.position().x(), b.position().x());
        approx::assert_relative_eq!(a.position().y(), b.position().y());
    }
}
