use egui::{Align2, ComboBox, RichText, Ui, Window};

use meridian::{MapMemory, sources::Attribution};

use crate::location::{LocationSource, parse_coordinate};
use crate::search::SearchState;
use crate::routing::RoutingState;
use crate::{ActiveLayer, MapApp};

pub fn acknowledge(ui: &Ui, attribution: Attribution) {
    Window::new("Acknowledge")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::LEFT_BOTTOM, [10., -10.])
        .show(ui.ctx(), |ui| {
            ui.horizontal(|ui| {
                ui.label("map data");
                ui.hyperlink_to(attribution.text, attribution.url);
            });
        });
}

/// Simple GUI to zoom in and out.
pub fn zoom(ui: &Ui, map_memory: &mut MapMemory) {
    Window::new("Zoom")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::RIGHT_BOTTOM, [-10., -10.])
        .show(ui.ctx(), |ui| {
            ui.horizontal(|ui| {
                if ui.button(RichText::new("➕").heading()).clicked() {
                    let _ = map_memory.zoom_in();
                }

                if ui.button(RichText::new("➖").heading()).clicked() {
                    let _ = map_memory.zoom_out();
                }
            });
        });
}

/// Layer switcher and the view toggles.
pub fn view_controls(ui: &Ui, app: &mut MapApp) {
    Window::new("Controls")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::RIGHT_TOP, [-10., 10.])
        .show(ui.ctx(), |ui| {
            ComboBox::from_label("Layer")
                .selected_text(format!("{:?}", app.active_layer))
                .show_ui(ui, |ui| {
                    for layer in [ActiveLayer::Streets, ActiveLayer::Satellite] {
                        ui.selectable_value(&mut app.active_layer, layer, format!("{layer:?}"));
                    }
                });

            ui.separator();

            let mut dark_mode = app.map_memory.dark_mode();
            if ui.checkbox(&mut dark_mode, "Dark mode").changed() {
                app.map_memory.toggle_dark_mode();
            }

            let globe_label = if app.map_memory.is_globe() {
                "🗺 Flat view"
            } else {
                "🌐 Globe view"
            };
            if ui.button(globe_label).clicked() {
                app.map_memory.toggle_globe();
                // The globe addresses a different zoom range; cached tiles are useless now.
                app.clear_tile_caches();
            }

            if ui.button("📍 My location").clicked() {
                locate(app);
            }
        });
}

fn locate(app: &mut MapApp) {
    match app.location.locate() {
        Some(fix) => {
            app.map_memory.set_view(fix, Some(15.));
            app.markers.add(fix, "You are here", "");
        }
        None => {
            app.notice = Some("Unable to retrieve your location".to_owned());
        }
    }
}

/// Free-text search backed by the geocoding collaborator.
pub fn search(ui: &Ui, app: &mut MapApp) {
    Window::new("Search")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::LEFT_TOP, [10., 10.])
        .show(ui.ctx(), |ui| {
            ui.horizontal(|ui| {
                let input = ui.text_edit_singleline(&mut app.search_text);
                let submitted =
                    input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("🔍").clicked() || submitted {
                    app.search.query(&app.search_text, ui.ctx());
                }
            });

            let mut chosen = None;
            match app.search.state() {
                SearchState::Idle => {}
                SearchState::Pending => {
                    ui.label("Searching…");
                }
                SearchState::Failed => {
                    ui.colored_label(ui.visuals().error_fg_color, "Search failed");
                }
                SearchState::Ready(hits) if hits.is_empty() => {
                    ui.label("No results");
                }
                SearchState::Ready(hits) => {
                    for hit in hits {
                        if ui.button(&hit.display_name).clicked() {
                            chosen = Some(hit.clone());
                        }
                    }
                }
            }

            if let Some(hit) = chosen {
                app.map_memory.set_view(hit.position, Some(16.));
                app.markers
                    .add(hit.position, hit.short_name().to_owned(), hit.display_name.clone());
                app.search_text = hit.display_name;
                app.search.clear();
            }
        });
}

/// Directions panel backed by the routing collaborator.
pub fn directions(ui: &Ui, app: &mut MapApp) {
    Window::new("Directions")
        .collapsible(true)
        .resizable(false)
        .anchor(Align2::LEFT_TOP, [10., 60.])
        .show(ui.ctx(), |ui| {
            ui.label("from (lat, lon)");
            ui.text_edit_singleline(&mut app.route_start);
            ui.label("to (lat, lon)");
            ui.text_edit_singleline(&mut app.route_end);

            ui.horizontal(|ui| {
                if ui.button("Find route").clicked() {
                    match (
                        parse_coordinate(&app.route_start),
                        parse_coordinate(&app.route_end),
                    ) {
                        (Some(start), Some(end)) => {
                            app.routing.request(start, end, ui.ctx());
                        }
                        _ => {
                            app.notice =
                                Some("Enter both ends as \"lat, lon\" pairs".to_owned());
                        }
                    }
                }

                if ui.button("Clear").clicked() {
                    app.route.clear_route();
                    app.route_summary = None;
                }
            });

            match app.routing.state() {
                RoutingState::Pending => {
                    ui.label("Routing…");
                }
                RoutingState::Failed => {
                    ui.colored_label(ui.visuals().error_fg_color, "Directions failed");
                }
                RoutingState::Idle => {
                    if let Some(summary) = &app.route_summary {
                        ui.label(summary);
                    }
                }
            }
        });
}

/// User-visible notice, e.g. an unavailable location. Dismissable, never fatal.
pub fn notice(ui: &Ui, notice: &mut Option<String>) {
    let mut dismissed = false;

    if let Some(message) = notice.as_ref() {
        Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .title_bar(false)
            .anchor(Align2::CENTER_TOP, [0., 10.])
            .show(ui.ctx(), |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
    }

    if dismissed {
        *notice = None;
    }
}
