use egui::{Color32, Event, PointerButton, Response, Sense, Ui, Widget};

use crate::globe;
use crate::memory::{MapMemory, ViewMode};
use crate::projector::Projector;
use crate::tiles::{Tiles, draw_tiles};

/// Plugins allow drawing custom shapes on the map. After implementing this trait for your type,
/// you can add it to the map with [`Map::with_plugin`].
pub trait Plugin {
    /// Function called at each frame, after the tiles are painted.
    fn run(self: Box<Self>, ui: &mut Ui, response: &Response, projector: &Projector);
}

/// Degrees of globe rotation per dragged pixel.
const ROTATE_SPEED: f32 = 0.25;

/// Tint darkening the tiles when dark mode is on. Applied to tile meshes only; overlays keep
/// their own colors.
const DARK_MODE_TILE_TINT: Color32 = Color32::from_rgb(110, 110, 120);

/// The map widget.
///
/// Instances are to be created on each frame, as all necessary state is stored in tile layers
/// and [`MapMemory`]. The widget never mutates [`MapMemory`] outside its input pass; painting is
/// idempotent and a frame can be repeated without accumulating anything.
///
/// # Examples
///
/// ```rust,no_run
/// use meridian::{HttpTiles, Map, MapMemory};
///
/// fn update(ui: &mut egui::Ui, tiles: &mut HttpTiles, memory: &mut MapMemory) {
///     ui.add(Map::new(Some(tiles), memory));
/// }
/// ```
pub struct Map<'a, 'b, 'c> {
    tiles: Option<&'b mut dyn Tiles>,
    label_tiles: Option<&'b mut dyn Tiles>,
    memory: &'a mut MapMemory,
    plugins: Vec<Box<dyn Plugin + 'c>>,
}

impl<'a, 'b, 'c> Map<'a, 'b, 'c> {
    pub fn new(tiles: Option<&'b mut dyn Tiles>, memory: &'a mut MapMemory) -> Self {
        Self {
            tiles,
            label_tiles: None,
            memory,
            plugins: Vec::default(),
        }
    }

    /// Composite a second, label-only tile layer above the base one. Meant for imagery bases
    /// which carry no labels of their own.
    pub fn with_label_tiles(mut self, tiles: &'b mut dyn Tiles) -> Self {
        self.label_tiles = Some(tiles);
        self
    }

    /// Add plugin to the drawing pipeline. Plugins allow drawing custom shapes on the map.
    pub fn with_plugin(mut self, plugin: impl Plugin + 'c) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }
}

impl Map<'_, '_, '_> {
    /// Translate raw input into view state changes. This is the only place where user gestures
    /// reach [`MapMemory`].
    fn handle_input(&mut self, ui: &Ui, response: &Response) {
        // Each discrete wheel notch is worth exactly one zoom level. At the bounds the steps
        // turn into no-ops; nothing changes and nothing needs repainting.
        if response.hovered() {
            let steps: i32 = ui.input(|input| {
                input
                    .events
                    .iter()
                    .map(|event| match event {
                        Event::MouseWheel { delta, .. } => delta.y.signum() as i32,
                        _ => 0,
                    })
                    .sum()
            });

            for _ in 0..steps.abs() {
                let stepped = if steps > 0 {
                    self.memory.zoom_in()
                } else {
                    self.memory.zoom_out()
                };

                if stepped.is_err() {
                    break;
                }
            }
        }

        let view_mode = self.memory.view_mode;
        match view_mode {
            ViewMode::Flat => {
                // Mouse drags and single-finger pans arrive here the same way; egui folds touch
                // into pointer events and consumes them, so nothing else scrolls meanwhile.
                self.memory.center_mode.handle_gestures(response);

                let delta_time = ui.input(|input| input.stable_dt);
                let zoom = self.memory.zoom();
                if self.memory.center_mode.update_movement(delta_time, zoom) {
                    ui.ctx().request_repaint();
                }
            }
            ViewMode::Globe(_) => {
                if response.dragged_by(PointerButton::Primary) {
                    let delta = response.drag_delta();
                    self.memory.rotate_by(
                        (delta.x * ROTATE_SPEED) as f64,
                        (delta.y * ROTATE_SPEED) as f64,
                    );
                }
            }
        }
    }
}

impl Widget for Map<'_, '_, '_> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        // Reallocating from the available space every frame is also what keeps the pixel
        // backing in sync with window resizes and display scale changes; eframe re-creates the
        // surface at native pixel density underneath us.
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        self.handle_input(ui, &response);

        let painter = ui.painter().with_clip_rect(rect);
        let tint = if self.memory.dark_mode() {
            DARK_MODE_TILE_TINT
        } else {
            Color32::WHITE
        };

        let view_mode = self.memory.view_mode;
        match view_mode {
            ViewMode::Flat => {
                let map_center = self.memory.center();
                let zoom = self.memory.zoom();

                if let Some(tiles) = self.tiles {
                    draw_tiles(&painter, map_center, zoom, tiles, tint);
                }

                if let Some(label_tiles) = self.label_tiles {
                    draw_tiles(&painter, map_center, zoom, label_tiles, tint);
                }
            }
            ViewMode::Globe(camera) => {
                globe::draw(&painter, self.tiles, &camera, self.memory.zoom(), tint);
            }
        }

        // Overlays come last and are recomputed from geography every frame, no matter what
        // triggered the frame; any earlier change of center, zoom or mode has already
        // invalidated their previous screen positions.
        let projector = Projector::new(rect, self.memory);
        for plugin in self.plugins {
            plugin.run(ui, &response, &projector);
        }

        response
    }
}
