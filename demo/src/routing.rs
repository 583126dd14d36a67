//! Routing collaborator: a pair of coordinates in, a drawable geometry out.
//!
//! The actual route computation happens in OSRM; the map only renders whatever geometry comes
//! back. Same worker-thread-plus-channel shape as the search service.

use std::sync::mpsc::{Receiver, TryRecvError, channel};

use anyhow::Context as _;
use egui::Context;
use serde::Deserialize;

use meridian::{Position, lon_lat};

#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub points: Vec<Position>,
    pub distance_m: f64,
    pub duration_s: f64,
}

impl RoutePlan {
    pub fn summary(&self) -> String {
        format!(
            "{:.1} km, about {:.0} min",
            self.distance_m / 1000.,
            self.duration_s / 60.
        )
    }
}

#[derive(Deserialize)]
struct OsrmResponse {
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

pub enum RoutingState {
    Idle,
    Pending,
    Failed,
}

pub struct RoutingService {
    state: RoutingState,
    result_rx: Option<Receiver<anyhow::Result<RoutePlan>>>,
    completed: Option<RoutePlan>,
}

impl Default for RoutingService {
    fn default() -> Self {
        Self {
            state: RoutingState::Idle,
            result_rx: None,
            completed: None,
        }
    }
}

impl RoutingService {
    pub fn request(&mut self, start: Position, end: Position, egui_ctx: &Context) {
        let (result_tx, result_rx) = channel();
        self.result_rx = Some(result_rx);
        self.state = RoutingState::Pending;

        let egui_ctx = egui_ctx.to_owned();
        std::thread::spawn(move || {
            let _ = result_tx.send(plan(start, end));
            egui_ctx.request_repaint();
        });
    }

    /// Drain the worker channel. Called once per frame.
    pub fn poll(&mut self) {
        let Some(result_rx) = &self.result_rx else {
            return;
        };

        match result_rx.try_recv() {
            Ok(Ok(plan)) => {
                self.state = RoutingState::Idle;
                self.completed = Some(plan);
                self.result_rx = None;
            }
            Ok(Err(e)) => {
                log::warn!("Routing failed: {e:#}");
                self.state = RoutingState::Failed;
                self.result_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.state = RoutingState::Failed;
                self.result_rx = None;
            }
        }
    }

    /// A finished plan, handed out exactly once.
    pub fn take_plan(&mut self) -> Option<RoutePlan> {
        self.completed.take()
    }

    pub fn state(&self) -> &RoutingState {
        &self.state
    }
}

fn plan(start: Position, end: Position) -> anyhow::Result<RoutePlan> {
    let url = format!(
        "https://router.project-osrm.org/route/v1/driving/{},{};{},{}",
        start.x(),
        start.y(),
        end.x(),
        end.y()
    );

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let body = client
        .get(&url)
        .query(&[("overview", "full"), ("geometries", "geojson")])
        .send()
        .context("routing request failed")?
        .error_for_status()?
        .text()?;

    let mut response: OsrmResponse =
        serde_json::from_str(&body).context("unexpected routing response")?;

    if response.routes.is_empty() {
        anyhow::bail!("no route found");
    }
    let route = response.routes.swap_remove(0);

    Ok(RoutePlan {
        points: route
            .geometry
            .coordinates
            .iter()
            .map(|&[lon, lat]| lon_lat(lon, lat))
            .collect(),
        distance_m: route.distance,
        duration_s: route.duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_is_human_readable() {
        let plan = RoutePlan {
            points: Vec::new(),
            distance_m: 5432.,
            duration_s: 754.,
        };

        assert_eq!("5.4 km, about 13 min", plan.summary());
    }
}
