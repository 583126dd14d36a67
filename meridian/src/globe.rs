//! Stylized globe view: spherical projection and the painting of the sphere itself.
//!
//! The globe is an orthographic projection of the unit sphere, rotated by the camera's bearing
//! (yaw) and pitch. It is a visual approximation meant for planet-scale browsing, not a
//! geodetically correct renderer.

use egui::{Color32, Painter, Pos2, Stroke, Vec2, vec2};

use crate::mercator::tile_id;
use crate::position::{Position, lat_lon};
use crate::tiles::Tiles;

pub(crate) const DEFAULT_PITCH: f64 = 30.;
pub(crate) const MAX_PITCH: f64 = 60.;

/// Orientation of the globe view.
///
/// Bearing selects the meridian facing the viewer, pitch tilts the axis so the horizon stays
/// visible. Both exist only while the globe mode is active; the flat view has no use for them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeCamera {
    pitch: f64,
    bearing: f64,
}

impl Default for GlobeCamera {
    fn default() -> Self {
        Self {
            pitch: DEFAULT_PITCH,
            bearing: 0.,
        }
    }
}

impl GlobeCamera {
    /// Tilt of the view in degrees, within `[0, 60]`.
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Rotation around the vertical axis in degrees, within `[0, 360)`.
    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    /// Apply a rotation delta, wrapping the bearing and clamping the pitch.
    pub fn rotate_by(&mut self, bearing_delta: f64, pitch_delta: f64) {
        self.bearing = (self.bearing + bearing_delta).rem_euclid(360.);
        self.pitch = (self.pitch + pitch_delta).clamp(0., MAX_PITCH);
    }
}

/// A position projected onto the sphere, still in unit-sphere scale.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpherePoint {
    pub x: f64,
    pub y: f64,
    /// Rotated z, i.e. how much the point faces the viewer. In `(0, 1]` for visible points.
    pub depth: f64,
}

impl SpherePoint {
    pub fn screen(&self, center: Pos2, radius: f32) -> Pos2 {
        // Screen y grows downwards.
        center + vec2(self.x as f32 * radius, -self.y as f32 * radius)
    }
}

/// Project a geographical position through the rotated sphere. `None` means the point lies on
/// the far side and must not be drawn.
pub(crate) fn project(position: Position, camera: &GlobeCamera) -> Option<SpherePoint> {
    let lat = position.y().to_radians();
    let lon = (position.x() + camera.bearing).to_radians();
    let pitch = camera.pitch.to_radians();

    // Unit sphere with +y through the north pole and +z towards the viewer.
    let x = lat.cos() * lon.sin();
    let y = lat.sin();
    let z = lat.cos() * lon.cos();

    // Tilt around the horizontal axis.
    let y_tilted = y * pitch.cos() - z * pitch.sin();
    let z_tilted = y * pitch.sin() + z * pitch.cos();

    // Back-face culling.
    (z_tilted > 0.).then_some(SpherePoint {
        x,
        y: y_tilted,
        depth: z_tilted,
    })
}

/// Globe radius in pixels for the given viewport, leaving a margin for the atmosphere rings.
pub(crate) fn radius(rect: egui::Rect) -> f32 {
    rect.width().min(rect.height()) * 0.42
}

/// Tile zoom used while in globe mode. Halving the map zoom keeps the tile count of the sample
/// grid reasonable; the clamp keeps it within the range where world-spanning tiles exist.
pub(crate) fn globe_zoom(zoom: f64) -> u8 {
    (zoom / 2.).round().clamp(2., 7.) as u8
}

/// Angular step of the tile sample grid, in degrees.
const TILE_GRID_STEP: i32 = 18;

/// Paint the whole globe: sphere, tiles, graticule, then the atmosphere glow. Overlays are
/// painted by the caller on top of all of it.
pub(crate) fn draw(
    painter: &Painter,
    tiles: Option<&mut dyn Tiles>,
    camera: &GlobeCamera,
    zoom: f64,
    tint: Color32,
) {
    let rect = painter.clip_rect();
    let center = rect.center();
    let radius = radius(rect);

    draw_sphere(painter, center, radius);

    if let Some(tiles) = tiles {
        draw_sampled_tiles(painter, tiles, camera, zoom, center, radius, tint);
    }

    draw_graticule(painter, camera, center, radius);
    draw_atmosphere(painter, center, radius);
}

/// Radially shaded disc standing in for the night-side ocean.
fn draw_sphere(painter: &Painter, center: Pos2, radius: f32) {
    const STEPS: u32 = 16;
    for step in 0..STEPS {
        // Larger, darker circles first; the bright center is painted last.
        let t = 1. - step as f32 / STEPS as f32;
        let shade = |dark: u8, bright: u8| {
            let dark = dark as f32;
            (dark + (bright as f32 - dark) * (1. - t)) as u8
        };
        painter.circle_filled(
            center,
            radius * t,
            Color32::from_rgb(shade(8, 24), shade(18, 48), shade(38, 84)),
        );
    }
}

fn draw_sampled_tiles(
    painter: &Painter,
    tiles: &mut dyn Tiles,
    camera: &GlobeCamera,
    zoom: f64,
    center: Pos2,
    radius: f32,
    tint: Color32,
) {
    let globe_zoom = globe_zoom(zoom);
    let base_size = radius * 0.34;

    let mut lat = -72;
    while lat <= 72 {
        let mut lon = -180;
        while lon < 180 {
            let position = lat_lon(lat as f64, lon as f64);
            if let Some(point) = project(position, camera) {
                let screen = point.screen(center, radius);

                // Nearer samples are drawn larger and more opaque; this fakes the perspective
                // without a real 3D pipeline.
                let size = base_size * (0.55 + 0.45 * point.depth as f32);
                let opacity = 0.3 + 0.7 * point.depth as f32;

                if let Some(tile) = tiles.at(tile_id(position, globe_zoom, tiles.tile_size())) {
                    tile.texture.draw(
                        painter,
                        egui::Rect::from_center_size(screen, Vec2::splat(size)),
                        tile.uv,
                        tint.gamma_multiply(opacity),
                    );
                }
            }
            lon += TILE_GRID_STEP;
        }
        lat += TILE_GRID_STEP;
    }
}

/// Latitude/longitude grid. Lines are built from short chords between successive projected
/// samples; samples that fail the back-face test break the line, which is what makes the grid
/// vanish at the horizon.
fn draw_graticule(painter: &Painter, camera: &GlobeCamera, center: Pos2, radius: f32) {
    let stroke = Stroke::new(1., Color32::from_rgba_unmultiplied(255, 255, 255, 36));

    // Parallels.
    let mut lat = -60;
    while lat <= 60 {
        let samples = (-180..=180).step_by(6).map(|lon| (lat as f64, lon as f64));
        draw_polyline(painter, camera, center, radius, samples, stroke);
        lat += 30;
    }

    // Meridians.
    let mut lon = -180;
    while lon < 180 {
        let samples = (-84..=84).step_by(6).map(|lat| (lat as f64, lon as f64));
        draw_polyline(painter, camera, center, radius, samples, stroke);
        lon += 30;
    }
}

fn draw_polyline(
    painter: &Painter,
    camera: &GlobeCamera,
    center: Pos2,
    radius: f32,
    samples: impl Iterator<Item = (f64, f64)>,
    stroke: Stroke,
) {
    let mut previous: Option<Pos2> = None;
    for (lat, lon) in samples {
        let current = project(lat_lon(lat, lon), camera).map(|point| point.screen(center, radius));
        if let (Some(a), Some(b)) = (previous, current) {
            painter.line_segment([a, b], stroke);
        }
        previous = current;
    }
}

/// Rim glow suggesting an atmosphere.
fn draw_atmosphere(painter: &Painter, center: Pos2, radius: f32) {
    const RINGS: u32 = 5;
    for ring in 0..RINGS {
        let alpha = 48 / (ring + 1);
        painter.circle_stroke(
            center,
            radius + 2. + ring as f32 * 3.,
            Stroke::new(
                2.5,
                Color32::from_rgba_unmultiplied(110, 170, 255, alpha as u8),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_camera() -> GlobeCamera {
        let mut camera = GlobeCamera::default();
        camera.rotate_by(0., -DEFAULT_PITCH);
        camera
    }

    #[test]
    fn facing_point_projects_to_the_middle() {
        let point = project(lat_lon(0., 0.), &flat_camera()).unwrap();
        approx::assert_abs_diff_eq!(point.x, 0., epsilon = 1e-9);
        approx::assert_abs_diff_eq!(point.y, 0., epsilon = 1e-9);
        approx::assert_abs_diff_eq!(point.depth, 1., epsilon = 1e-9);
    }

    #[test]
    fn far_side_is_culled() {
        assert!(project(lat_lon(0., 180.), &flat_camera()).is_none());
        assert!(project(lat_lon(0., -120.), &flat_camera()).is_none());
    }

    #[test]
    fn bearing_rotates_the_far_side_into_view() {
        let mut camera = flat_camera();
        camera.rotate_by(180., 0.);

        let point = project(lat_lon(0., 180.), &camera).unwrap();
        approx::assert_abs_diff_eq!(point.depth, 1., epsilon = 1e-9);
    }

    #[test]
    fn tilt_reveals_the_pole() {
        // With no tilt, the pole sits right on the horizon.
        let point = project(lat_lon(90., 0.), &flat_camera()).unwrap();
        assert!(point.depth < 1e-9);

        // The default tilt brings it clearly into view, in the upper half of the disc.
        let point = project(lat_lon(90., 0.), &GlobeCamera::default()).unwrap();
        assert!(point.depth > 0.4);
        assert!(point.y > 0., "pole should appear in the upper half");
    }

    #[test]
    fn camera_limits() {
        let mut camera = GlobeCamera::default();

        camera.rotate_by(0., 1000.);
        assert_eq!(MAX_PITCH, camera.pitch());
        camera.rotate_by(0., -1000.);
        assert_eq!(0., camera.pitch());

        camera.rotate_by(350., 0.);
        camera.rotate_by(20., 0.);
        approx::assert_abs_diff_eq!(camera.bearing(), 10., epsilon = 1e-9);
        camera.rotate_by(-30., 0.);
        approx::assert_abs_diff_eq!(camera.bearing(), 340., epsilon = 1e-9);
    }

    #[test]
    fn globe_zoom_is_halved_and_clamped() {
        assert_eq!(2, globe_zoom(0.));
        assert_eq!(3, globe_zoom(6.));
        assert_eq!(7, globe_zoom(13.));
        assert_eq!(7, globe_zoom(19.));
    }
}
