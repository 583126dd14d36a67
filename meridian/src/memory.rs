use crate::{
    InvalidZoom,
    center::Center,
    globe::GlobeCamera,
    position::{AdjustedPosition, Position, lat_lon},
    zoom::Zoom,
};

/// Default view: lower Manhattan, a reasonable city-scale starting point.
fn default_center() -> Position {
    lat_lon(40.7128, -74.0060)
}

/// Levels to zoom out when entering the globe, so the first frame frames a continent rather
/// than a city block.
const GLOBE_ZOOM_OUT: f64 = 3.;

/// Which of the two view modes the map is rendered in.
///
/// The camera exists only while the globe is active; switching back to flat drops it, which is
/// what resets pitch and bearing to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ViewMode {
    #[default]
    Flat,
    Globe(GlobeCamera),
}

/// State of the map widget which must persist between frames.
///
/// This is the single authority on where the map is looking. Every mutation goes through one of
/// the methods below, so the invariants (zoom bounds, pitch clamp, bearing wrap, camera reset)
/// are enforced in one place; the rendering code only ever reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMemory {
    pub(crate) center_mode: Center,
    pub(crate) zoom: Zoom,
    pub(crate) view_mode: ViewMode,
    pub(crate) dark_mode: bool,
}

impl Default for MapMemory {
    fn default() -> Self {
        Self {
            center_mode: Center::new(default_center()),
            zoom: Zoom::default(),
            view_mode: ViewMode::default(),
            dark_mode: false,
        }
    }
}

impl MapMemory {
    /// Try to zoom in, returning `Err(InvalidZoom)` if already at maximum.
    pub fn zoom_in(&mut self) -> Result<(), InvalidZoom> {
        self.zoom.zoom_in()
    }

    /// Try to zoom out, returning `Err(InvalidZoom)` if already at minimum.
    pub fn zoom_out(&mut self) -> Result<(), InvalidZoom> {
        self.zoom.zoom_out()
    }

    /// Set exact zoom level.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), InvalidZoom> {
        self.zoom = Zoom::try_from(zoom)?;
        Ok(())
    }

    /// Returns the current zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom.into()
    }

    /// The position at the map's center.
    pub fn center(&self) -> Position {
        self.center_mode.position()
    }

    /// Center exactly at the given position, interrupting any drag or inertia.
    pub fn center_at(&mut self, position: Position) {
        self.center_mode = Center::Exact(AdjustedPosition::new(position));
    }

    /// Jump to a position, optionally changing the zoom level. An out-of-range zoom is clamped
    /// rather than rejected; jumping somewhere should never fail.
    pub fn set_view(&mut self, position: Position, zoom: Option<f64>) {
        self.center_at(position);
        if let Some(zoom) = zoom {
            self.zoom = Zoom::clamped(zoom);
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn is_globe(&self) -> bool {
        matches!(self.view_mode, ViewMode::Globe(_))
    }

    /// Switch between the flat map and the globe.
    ///
    /// Entering the globe tilts the camera to its default pitch and zooms out for a sensible
    /// initial framing. Leaving it discards the camera, so pitch and bearing read as zero again.
    /// Tile layers address different zoom ranges in the two modes; callers should
    /// [`clear`](crate::HttpTiles::clear) their layers after a toggle.
    pub fn toggle_globe(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Flat => {
                self.zoom.zoom_by(-GLOBE_ZOOM_OUT);
                ViewMode::Globe(GlobeCamera::default())
            }
            ViewMode::Globe(_) => ViewMode::Flat,
        };
    }

    /// Rotate the globe camera. No-op in flat mode, which has no camera to rotate.
    pub fn rotate_by(&mut self, bearing_delta: f64, pitch_delta: f64) {
        if let ViewMode::Globe(ref mut camera) = self.view_mode {
            camera.rotate_by(bearing_delta, pitch_delta);
        }
    }

    /// Whether tiles are painted with the darkened color transform.
    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    /// Whether the map is gliding on inertia and will keep repainting on its own.
    pub fn animating(&self) -> bool {
        self.center_mode.animating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::{DEFAULT_PITCH, MAX_PITCH};

    #[test]
    fn zooming_stops_at_the_bounds() {
        let mut memory = MapMemory::default();

        for _ in 0..40 {
            let _ = memory.zoom_in();
        }
        assert_eq!(19., memory.zoom());

        for _ in 0..40 {
            let _ = memory.zoom_out();
        }
        assert_eq!(0., memory.zoom());
    }

    #[test]
    fn set_view_moves_center_and_clamps_zoom() {
        let mut memory = MapMemory::default();

        memory.set_view(lat_lon(51.5074, -0.1278), Some(99.));
        approx::assert_abs_diff_eq!(memory.center().y(), 51.5074, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(memory.center().x(), -0.1278, epsilon = 1e-9);
        assert_eq!(19., memory.zoom());

        // Without a zoom, only the center moves.
        memory.set_view(lat_lon(48.8566, 2.3522), None);
        assert_eq!(19., memory.zoom());
    }

    #[test]
    fn toggling_globe_twice_restores_the_flat_view() {
        let mut memory = MapMemory::default();
        assert!(!memory.is_globe());

        memory.toggle_globe();
        let ViewMode::Globe(camera) = memory.view_mode() else {
            panic!("expected globe mode");
        };
        assert_eq!(DEFAULT_PITCH, camera.pitch());
        assert_eq!(0., camera.bearing());

        // Rotate around a bit; none of it may leak back into the flat view.
        memory.rotate_by(123., 45.);

        memory.toggle_globe();
        assert_eq!(ViewMode::Flat, memory.view_mode());

        // Entering again starts from the default orientation, not the rotated one.
        memory.toggle_globe();
        let ViewMode::Globe(camera) = memory.view_mode() else {
            panic!("expected globe mode");
        };
        assert_eq!(DEFAULT_PITCH, camera.pitch());
        assert_eq!(0., camera.bearing());
    }

    #[test]
    fn entering_globe_zooms_out_for_framing() {
        let mut memory = MapMemory::default();
        let zoom_before = memory.zoom();

        memory.toggle_globe();
        assert_eq!(zoom_before - GLOBE_ZOOM_OUT, memory.zoom());

        // Near the lower bound the zoom clamps instead of underflowing.
        let mut memory = MapMemory::default();
        memory.set_view(lat_lon(0., 0.), Some(1.));
        memory.toggle_globe();
        assert_eq!(0., memory.zoom());
    }

    #[test]
    fn rotation_is_clamped_and_ignored_in_flat_mode() {
        let mut memory = MapMemory::default();

        // Flat mode has no camera; this must be a no-op.
        memory.rotate_by(90., 90.);
        assert_eq!(ViewMode::Flat, memory.view_mode());

        memory.toggle_globe();
        memory.rotate_by(0., 1000.);
        let ViewMode::Globe(camera) = memory.view_mode() else {
            panic!("expected globe mode");
        };
        assert_eq!(MAX_PITCH, camera.pitch());
    }

    #[test]
    fn dark_mode_toggles() {
        let mut memory = MapMemory::default();
        assert!(!memory.dark_mode());
        memory.toggle_dark_mode();
        assert!(memory.dark_mode());
        memory.toggle_dark_mode();
        assert!(!memory.dark_mode());
    }
}
