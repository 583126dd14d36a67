use egui::{Rect, Vec2};

use crate::globe::{self, GlobeCamera};
use crate::memory::{MapMemory, ViewMode};
use crate::mercator::{project, unproject};
use crate::position::{Pixels, PixelsExt as _, Position};

/// Projects geographical positions into pixels on the viewport, suitable for [`egui::Painter`].
///
/// There is one variant per view mode, both answering the same question: where on the screen is
/// this position, if anywhere. Overlay code does not care which mode the map is in. Only the
/// globe can answer "nowhere"; flat projection always succeeds.
pub enum Projector {
    Flat(FlatProjector),
    Globe(GlobeProjector),
}

impl Projector {
    /// Snapshot the current view into a projector. Valid for the frame it was created in.
    pub fn new(clip_rect: Rect, memory: &MapMemory) -> Self {
        match memory.view_mode {
            ViewMode::Flat => Projector::Flat(FlatProjector {
                clip_rect,
                center: memory.center(),
                zoom: memory.zoom(),
            }),
            ViewMode::Globe(camera) => Projector::Globe(GlobeProjector {
                clip_rect,
                camera,
            }),
        }
    }

    /// Project `position` into pixels on the viewport. `None` when the position is not visible
    /// in principle (on the far side of the globe), as opposed to merely off-screen.
    pub fn project(&self, position: Position) -> Option<Vec2> {
        match self {
            Projector::Flat(flat) => Some(flat.project(position)),
            Projector::Globe(globe) => globe.project(position),
        }
    }

    /// Get coordinates from viewport's pixel position. Only the flat map supports picking;
    /// the globe is not an invertible view.
    pub fn unproject(&self, screen: Vec2) -> Option<Position> {
        match self {
            Projector::Flat(flat) => Some(flat.unproject(screen)),
            Projector::Globe(_) => None,
        }
    }
}

pub struct FlatProjector {
    clip_rect: Rect,
    center: Position,
    zoom: f64,
}

impl FlatProjector {
    fn project(&self, position: Position) -> Vec2 {
        // Turn that into a flat, mercator projection.
        let projected_position = project(position, self.zoom);

        // We also need to know where the map center is.
        let map_center_projected_position = project(self.center, self.zoom);

        // From the two points above we can calculate the actual point on the screen.
        self.clip_rect.center().to_vec2()
            + (projected_position - map_center_projected_position).to_vec2()
    }

    fn unproject(&self, screen: Vec2) -> Position {
        // Despite being in pixel space, `map_center_projected_position` is sufficiently large
        // that we must do the arithmetic in f64 to avoid imprecision.
        let map_center_projected_position = project(self.center, self.zoom);
        let clip_center = self.clip_rect.center();
        let x = map_center_projected_position.x() + (screen.x as f64) - (clip_center.x as f64);
        let y = map_center_projected_position.y() + (screen.y as f64) - (clip_center.y as f64);

        unproject(Pixels::new(x, y), self.zoom)
    }
}

pub struct GlobeProjector {
    clip_rect: Rect,
    camera: GlobeCamera,
}

impl GlobeProjector {
    fn project(&self, position: Position) -> Option<Vec2> {
        let point = globe::project(position, &self.camera)?;
        let screen = point.screen(self.clip_rect.center(), globe::radius(self.clip_rect));
        Some(screen.to_vec2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::lat_lon;
    use egui::{Pos2, pos2};

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800., 600.))
    }

    fn flat_memory_at(position: Position, zoom: f64) -> MapMemory {
        let mut memory = MapMemory::default();
        memory.set_view(position, Some(zoom));
        memory
    }

    #[test]
    fn marker_near_the_center_lands_inside_the_viewport() {
        // Center on lower Manhattan, then check that Times Square, a couple of kilometers away,
        // is on screen at city zoom.
        let memory = flat_memory_at(lat_lon(40.7128, -74.0060), 13.);
        let projector = Projector::new(viewport(), &memory);

        let screen = projector.project(lat_lon(40.7589, -73.9851)).unwrap();
        assert!(viewport().contains(screen.to_pos2()), "got {screen:?}");
    }

    #[test]
    fn viewport_center_maps_to_the_canvas_midpoint() {
        let center = lat_lon(51.5074, -0.1278);
        let memory = flat_memory_at(center, 10.);
        let projector = Projector::new(viewport(), &memory);

        let screen = projector.project(center).unwrap();
        approx::assert_abs_diff_eq!(screen.x, 400., epsilon = 1e-3);
        approx::assert_abs_diff_eq!(screen.y, 300., epsilon = 1e-3);
    }

    #[test]
    fn unproject_is_inverse_of_project() {
        let original = lat_lon(52.2297, 21.0122);
        let memory = flat_memory_at(original, 10.);
        let projector = Projector::new(viewport(), &memory);

        let projected = projector.project(original).unwrap();
        let unprojected = projector.unproject(projected).unwrap();

        approx::assert_abs_diff_eq!(original.x(), unprojected.x(), epsilon = 0.01);
        approx::assert_abs_diff_eq!(original.y(), unprojected.y(), epsilon = 0.01);
    }

    #[test]
    fn unproject_distinguishes_nearby_pixels() {
        let original = lat_lon(52., 21.);
        let memory = flat_memory_at(original, 18.);
        let projector = Projector::new(viewport(), &memory);

        let mut projected = projector.project(original).unwrap();
        let mut prev_x = 0.0;
        for offset in 0..10 {
            projected.x += offset as f32;
            let unprojected = projector.unproject(projected).unwrap();
            assert_ne!(
                prev_x,
                unprojected.x(),
                "input was different but projection remained the same"
            );
            prev_x = unprojected.x();
        }
    }

    #[test]
    fn globe_projector_culls_the_far_side() {
        let mut memory = MapMemory::default();
        memory.toggle_globe();
        let projector = Projector::new(viewport(), &memory);

        // Greenwich faces the viewer with the default camera, its antipode cannot.
        assert!(projector.project(lat_lon(0., 0.)).is_some());
        assert!(projector.project(lat_lon(0., 180.)).is_none());

        // And picking is flat-only.
        assert!(projector.unproject(pos2(400., 300.).to_vec2()).is_none());
    }
}
