use egui::{Color32, FontId, Response, Stroke, Ui, vec2};

use meridian::{Plugin, Position, Projector};

/// Handle identifying a [`Marker`] within the [`Markers`] registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(u64);

/// A pin on the map. Only the geographical position is authoritative; where the pin lands on
/// the screen is recomputed every frame.
#[derive(Debug, Clone)]
pub struct Marker {
    pub position: Position,
    pub title: String,
    pub description: String,
}

/// Registry of all markers currently on the map. The application owns one of these for as long
/// as the map lives, and passes it to a fresh [`MarkerLayer`] every frame.
#[derive(Debug, Default)]
pub struct Markers {
    markers: Vec<(MarkerId, Marker)>,
    next_id: u64,
    selected: Option<MarkerId>,
}

impl Markers {
    pub fn add(
        &mut self,
        position: Position,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.push((
            id,
            Marker {
                position,
                title: title.into(),
                description: description.into(),
            },
        ));
        id
    }

    pub fn remove(&mut self, id: MarkerId) -> Option<Marker> {
        if self.selected == Some(id) {
            self.selected = None;
        }
        let index = self.markers.iter().position(|(marker_id, _)| *marker_id == id)?;
        Some(self.markers.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.selected = None;
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|(marker_id, _)| *marker_id == id)
            .map(|(_, marker)| marker)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, &Marker)> {
        self.markers.iter().map(|(id, marker)| (*id, marker))
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Select a marker, opening its details popup. Selecting the already selected one closes it.
    pub fn toggle_selected(&mut self, id: MarkerId) {
        self.selected = if self.selected == Some(id) {
            None
        } else {
            Some(id)
        };
    }

    pub fn selected(&self) -> Option<MarkerId> {
        self.selected
    }
}

/// Visual style of the markers.
#[derive(Clone)]
pub struct MarkerStyle {
    pub label_font: FontId,
    pub label_color: Color32,
    pub label_background: Color32,
    pub pin_fill: Color32,
    pub pin_stroke: Stroke,
    pub pin_radius: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            label_font: FontId::proportional(12.),
            label_color: Color32::from_gray(200),
            label_background: Color32::BLACK.gamma_multiply(0.8),
            pin_fill: Color32::from_rgb(0xe7, 0x4c, 0x3c),
            pin_stroke: Stroke::new(2., Color32::WHITE),
            pin_radius: 7.,
        }
    }
}

/// [`Plugin`] which draws the marker registry on the map and handles clicks on the pins.
pub struct MarkerLayer<'a> {
    markers: &'a mut Markers,
    style: MarkerStyle,
}

impl<'a> MarkerLayer<'a> {
    pub fn new(markers: &'a mut Markers) -> Self {
        Self {
            markers,
            style: MarkerStyle::default(),
        }
    }

    pub fn with_style(mut self, style: MarkerStyle) -> Self {
        self.style = style;
        self
    }
}

impl Plugin for MarkerLayer<'_> {
    fn run(self: Box<Self>, ui: &mut Ui, response: &Response, projector: &Projector) {
        let MarkerLayer { markers, style } = *self;

        let click = response
            .clicked()
            .then(|| response.hover_pos())
            .flatten();
        let mut clicked_marker = None;

        for (id, marker) in markers.iter() {
            // Culled on the far side of the globe.
            let Some(screen_position) = projector.project(marker.position) else {
                continue;
            };
            let screen_position = screen_position.to_pos2();

            let painter = ui.painter();
            painter.circle(
                screen_position,
                style.pin_radius,
                style.pin_fill,
                style.pin_stroke,
            );
            painter.circle_filled(screen_position, style.pin_radius * 0.35, Color32::WHITE);

            if !marker.title.is_empty() {
                let label = painter.layout_no_wrap(
                    marker.title.to_owned(),
                    style.label_font.clone(),
                    style.label_color,
                );

                // Offset of the label, relative to the pin.
                let offset = vec2(10., 8.);

                painter.rect_filled(
                    label
                        .rect
                        .translate(screen_position.to_vec2())
                        .translate(offset)
                        .expand(4.),
                    6.,
                    style.label_background,
                );
                painter.galley(screen_position + offset, label, Color32::BLACK);
            }

            if let Some(click) = click {
                if click.distance(screen_position) <= style.pin_radius + 4. {
                    clicked_marker = Some(id);
                }
            }
        }

        if let Some(id) = clicked_marker {
            markers.toggle_selected(id);
        }

        // Details popup of the selected marker, repositioned with the pin every frame.
        if let Some(id) = markers.selected() {
            if let Some(marker) = markers.get(id) {
                if let Some(screen_position) = projector.project(marker.position) {
                    egui::Window::new(&marker.title)
                        .id(egui::Id::new(("marker-details", id)))
                        .collapsible(false)
                        .resizable(false)
                        .fixed_pos(screen_position.to_pos2() + vec2(12., 12.))
                        .show(ui.ctx(), |ui| {
                            if marker.description.is_empty() {
                                ui.label(format!(
                                    "{:.4}, {:.4}",
                                    marker.position.y(),
                                    marker.position.x()
                                ));
                            } else {
                                ui.label(&marker.description);
                            }
                        });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, Rect, Vec2};
    use meridian::{MapMemory, lat_lon};

    #[test]
    fn markers_keep_their_coordinates_when_the_view_moves() {
        let mut markers = Markers::default();
        let times_square = lat_lon(40.7589, -73.9851);
        let id = markers.add(times_square, "Times Square", "Famous landmark in NYC");

        let mut memory = MapMemory::default();
        memory.set_view(lat_lon(40.7128, -74.0060), Some(13.));
        memory.set_view(lat_lon(51.5074, -0.1278), Some(5.));

        // Only the recomputed screen position may change, never the stored geography.
        let marker = markers.get(id).unwrap();
        assert_eq!(times_square, marker.position);
        assert_eq!("Times Square", marker.title);
    }

    #[test]
    fn marker_near_the_view_center_is_on_screen() {
        let mut memory = MapMemory::default();
        memory.set_view(lat_lon(40.7128, -74.0060), Some(13.));

        let viewport = Rect::from_min_size(Pos2::ZERO, Vec2::new(800., 600.));
        let projector = Projector::new(viewport, &memory);

        let screen = projector.project(lat_lon(40.7589, -73.9851)).unwrap();
        assert!(viewport.contains(screen.to_pos2()));
    }

    #[test]
    fn adding_and_removing() {
        let mut markers = Markers::default();
        assert!(markers.is_empty());

        let a = markers.add(lat_lon(40.7589, -73.9851), "Times Square", "");
        let b = markers.add(lat_lon(40.7484, -73.9857), "Empire State Building", "");
        assert_eq!(2, markers.len());
        assert_ne!(a, b);

        markers.toggle_selected(b);
        assert_eq!(Some(b), markers.selected());

        // Removing the selected marker also drops the selection.
        assert!(markers.remove(b).is_some());
        assert_eq!(None, markers.selected());
        assert!(markers.remove(b).is_none());

        markers.clear();
        assert!(markers.is_empty());
    }

    #[test]
    fn selection_toggles() {
        let mut markers = Markers::default();
        let id = markers.add(lat_lon(0., 0.), "Origin", "");

        markers.toggle_selected(id);
        assert_eq!(Some(id), markers.selected());
        markers.toggle_selected(id);
        assert_eq!(None, markers.selected());
    }
}
