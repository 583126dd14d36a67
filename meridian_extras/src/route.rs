use egui::{Color32, Pos2, Response, Stroke, Ui};

use meridian::{Plugin, Position, Projector};

/// The single active route. Setting a new one replaces the previous one wholesale; there is
/// never more than one route on the map.
#[derive(Debug, Default)]
pub struct ActiveRoute {
    points: Vec<Position>,
}

impl ActiveRoute {
    /// Replace the active route with the given vertices.
    pub fn set_route(&mut self, points: Vec<Position>) {
        log::debug!("New route with {} vertices.", points.len());
        self.points = points;
    }

    pub fn clear_route(&mut self) {
        self.points.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }
}

/// Visual style of the route polyline.
#[derive(Clone)]
pub struct RouteStyle {
    pub stroke: Stroke,
    pub endpoint_radius: f32,
    pub endpoint_fill: Color32,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            stroke: Stroke::new(4., Color32::from_rgb(0x29, 0x80, 0xb9).gamma_multiply(0.9)),
            endpoint_radius: 5.,
            endpoint_fill: Color32::WHITE,
        }
    }
}

/// [`Plugin`] which draws the active route, reprojecting every vertex each frame.
pub struct RouteLayer<'a> {
    route: &'a ActiveRoute,
    style: RouteStyle,
}

impl<'a> RouteLayer<'a> {
    pub fn new(route: &'a ActiveRoute) -> Self {
        Self {
            route,
            style: RouteStyle::default(),
        }
    }

    pub fn with_style(mut self, style: RouteStyle) -> Self {
        self.style = style;
        self
    }
}

impl Plugin for RouteLayer<'_> {
    fn run(self: Box<Self>, ui: &mut Ui, _response: &Response, projector: &Projector) {
        let painter = ui.painter();

        for [a, b] in visible_segments(self.route.points(), projector) {
            painter.line_segment([a, b], self.style.stroke);
        }

        // Origin and destination dots on top of the line.
        for endpoint in [self.route.points().first(), self.route.points().last()]
            .into_iter()
            .flatten()
        {
            if let Some(screen) = projector.project(*endpoint) {
                painter.circle(
                    screen.to_pos2(),
                    self.style.endpoint_radius,
                    self.style.endpoint_fill,
                    Stroke::new(2., self.style.stroke.color),
                );
            }
        }
    }
}

/// Straight segments between consecutive projectable vertices. A vertex culled by the globe
/// breaks the polyline, the same way graticule lines break at the horizon.
fn visible_segments(points: &[Position], projector: &Projector) -> Vec<[Pos2; 2]> {
    points
        .windows(2)
        .filter_map(|pair| {
            let a = projector.project(pair[0])?.to_pos2();
            let b = projector.project(pair[1])?.to_pos2();
            Some([a, b])
        })
        .collect()
}
