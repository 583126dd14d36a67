#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid zoom level")]
pub struct InvalidZoom;

/// Zoom level of the map. Bounded to what raster tile servers typically serve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Zoom(f64);

pub(crate) const MIN_ZOOM: f64 = 0.;

/// Mapnik supports zooms up to 19.
/// <https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames#Zoom_levels>
pub(crate) const MAX_ZOOM: f64 = 19.;

impl TryFrom<f64> for Zoom {
    type Error = InvalidZoom;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&value) {
            Err(InvalidZoom)
        } else {
            Ok(Self(value))
        }
    }
}

// The reverse shouldn't be implemented, since we already have TryFrom<f64>.
#[allow(clippy::from_over_into)]
impl Into<f64> for Zoom {
    fn into(self) -> f64 {
        self.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(13.)
    }
}

impl Zoom {
    /// Clamp an arbitrary value into the valid range.
    pub fn clamped(value: f64) -> Self {
        Self(value.clamp(MIN_ZOOM, MAX_ZOOM))
    }

    pub fn round(&self) -> u8 {
        self.0.round() as u8
    }

    /// Step in by one level, failing when already at the maximum so that callers can skip the
    /// repaint.
    pub fn zoom_in(&mut self) -> Result<(), InvalidZoom> {
        *self = Self::try_from(self.0 + 1.)?;
        Ok(())
    }

    /// Step out by one level, failing when already at the minimum.
    pub fn zoom_out(&mut self) -> Result<(), InvalidZoom> {
        *self = Self::try_from(self.0 - 1.)?;
        Ok(())
    }

    /// Zoom using a relative value, clamped to the valid range.
    pub fn zoom_by(&mut self, value: f64) {
        *self = Self::clamped(self.0 + value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructing_zoom() {
        assert_eq!(13, Zoom::default().round());
        assert_eq!(19, Zoom::try_from(19.).unwrap().round());
        assert_eq!(InvalidZoom, Zoom::try_from(20.).unwrap_err());
        assert_eq!(InvalidZoom, Zoom::try_from(-1.).unwrap_err());
        assert_eq!(19, Zoom::clamped(25.).round());
        assert_eq!(0, Zoom::clamped(-3.).round());
    }

    #[test]
    fn test_zooming_in() {
        let mut zoom = Zoom::try_from(18.).unwrap();
        assert!(zoom.zoom_in().is_ok());
        assert_eq!(19, zoom.round());

        // Repeated attempts beyond the maximum all fail and leave the value untouched.
        assert_eq!(Err(InvalidZoom), zoom.zoom_in());
        assert_eq!(Err(InvalidZoom), zoom.zoom_in());
        assert_eq!(19, zoom.round());
    }

    #[test]
    fn test_zooming_out() {
        let mut zoom = Zoom::try_from(1.).unwrap();
        assert!(zoom.zoom_out().is_ok());
        assert_eq!(0, zoom.round());

        assert_eq!(Err(InvalidZoom), zoom.zoom_out());
        assert_eq!(Err(InvalidZoom), zoom.zoom_out());
        assert_eq!(0, zoom.round());
    }

    #[test]
    fn test_relative_zoom_is_clamped() {
        let mut zoom = Zoom::default();
        zoom.zoom_by(100.);
        assert_eq!(19, zoom.round());
        zoom.zoom_by(-100.);
        assert_eq!(0, zoom.round());
    }
}
