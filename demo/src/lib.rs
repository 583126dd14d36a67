//! Demo application wiring the map widget to the page chrome and the external collaborators.

mod location;
mod routing;
mod search;
mod windows;

use egui::Context;

use meridian::sources::{ArcGisWorldImagery, CartoVoyager, CartoVoyagerLabels};
use meridian::{HttpTiles, Map, MapMemory, Tiles as _};
use meridian_extras::{ActiveRoute, MarkerLayer, Markers, RouteLayer};

use location::{EnvLocation, LocationSource};
use routing::RoutingService;
use search::SearchService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveLayer {
    Streets,
    Satellite,
}

pub struct MapApp {
    // One tile layer per source, each with its own cache namespace. Labels are composited
    // above the imagery, which carries no text of its own.
    streets: HttpTiles,
    satellite: HttpTiles,
    labels: HttpTiles,

    pub(crate) map_memory: MapMemory,
    pub(crate) markers: Markers,
    pub(crate) route: ActiveRoute,
    pub(crate) active_layer: ActiveLayer,

    pub(crate) search: SearchService,
    pub(crate) search_text: String,

    pub(crate) routing: RoutingService,
    pub(crate) route_start: String,
    pub(crate) route_end: String,
    pub(crate) route_summary: Option<String>,

    pub(crate) location: Box<dyn LocationSource>,
    pub(crate) notice: Option<String>,
}

impl MapApp {
    pub fn new(egui_ctx: Context) -> Self {
        Self {
            streets: HttpTiles::new(CartoVoyager, egui_ctx.to_owned()),
            satellite: HttpTiles::new(ArcGisWorldImagery, egui_ctx.to_owned()),
            labels: HttpTiles::new(CartoVoyagerLabels, egui_ctx.to_owned()),
            map_memory: MapMemory::default(),
            markers: Markers::default(),
            route: ActiveRoute::default(),
            active_layer: ActiveLayer::Streets,
            search: SearchService::default(),
            search_text: String::new(),
            routing: RoutingService::default(),
            route_start: String::new(),
            route_end: String::new(),
            route_summary: None,
            location: Box::new(EnvLocation),
            notice: None,
        }
    }

    /// Forget all cached tiles, in every layer. Used when the tile addressing changes, i.e. on
    /// a view mode toggle.
    pub(crate) fn clear_tile_caches(&mut self) {
        self.streets.clear();
        self.satellite.clear();
        self.labels.clear();
    }

    fn poll_collaborators(&mut self) {
        self.search.poll();
        self.routing.poll();

        if let Some(plan) = self.routing.take_plan() {
            self.route_summary = Some(plan.summary());
            self.route.set_route(plan.points);
        }
    }
}

impl eframe::App for MapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_collaborators();

        let rimless = egui::Frame {
            fill: ctx.style().visuals.panel_fill,
            ..Default::default()
        };

        egui::CentralPanel::default()
            .frame(rimless)
            .show(ctx, |ui| {
                let attribution = match self.active_layer {
                    ActiveLayer::Streets => self.streets.attribution(),
                    ActiveLayer::Satellite => self.satellite.attribution(),
                };

                // In egui, widgets are constructed and consumed in each frame.
                let map = match self.active_layer {
                    ActiveLayer::Streets => Map::new(Some(&mut self.streets), &mut self.map_memory),
                    ActiveLayer::Satellite => {
                        Map::new(Some(&mut self.satellite), &mut self.map_memory)
                            .with_label_tiles(&mut self.labels)
                    }
                };

                // Route below the markers, both below the chrome.
                let map = map
                    .with_plugin(RouteLayer::new(&self.route))
                    .with_plugin(MarkerLayer::new(&mut self.markers));

                ui.add(map);

                // Draw utility windows.
                {
                    use windows::{acknowledge, directions, notice, search, view_controls, zoom};

                    search(ui, self);
                    directions(ui, self);
                    view_controls(ui, self);
                    zoom(ui, &mut self.map_memory);
                    acknowledge(ui, attribution);
                    notice(ui, &mut self.notice);
                }
            });
    }
}
