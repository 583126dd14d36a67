//! Geocoding collaborator: free text in, ordered places out.
//!
//! Queries go to the Nominatim HTTP API on a worker thread, so a slow lookup never stalls the
//! frame; the result comes back over a channel and wakes the UI up with a repaint request.

use std::sync::mpsc::{Receiver, TryRecvError, channel};

use anyhow::Context as _;
use egui::Context;
use serde::Deserialize;

use meridian::{Position, lat_lon};

/// How many results to keep; matching what fits the dropdown.
const MAX_HITS: usize = 5;

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub display_name: String,
    pub position: Position,
}

impl SearchHit {
    /// First segment of the display name, suitable for a marker title.
    pub fn short_name(&self) -> &str {
        self.display_name
            .split(',')
            .next()
            .unwrap_or(&self.display_name)
            .trim()
    }
}

#[derive(Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

pub enum SearchState {
    Idle,
    Pending,
    Ready(Vec<SearchHit>),
    Failed,
}

pub struct SearchService {
    state: SearchState,
    result_rx: Option<Receiver<anyhow::Result<Vec<SearchHit>>>>,
}

impl Default for SearchService {
    fn default() -> Self {
        Self {
            state: SearchState::Idle,
            result_rx: None,
        }
    }
}

impl SearchService {
    /// Kick off a lookup, replacing any result still displayed. A response from a query that
    /// was superseded meanwhile is dropped together with its channel.
    pub fn query(&mut self, query: &str, egui_ctx: &Context) {
        if query.trim().len() < 3 {
            return;
        }

        let (result_tx, result_rx) = channel();
        self.result_rx = Some(result_rx);
        self.state = SearchState::Pending;

        let query = query.to_owned();
        let egui_ctx = egui_ctx.to_owned();
        std::thread::spawn(move || {
            let _ = result_tx.send(search(&query));
            egui_ctx.request_repaint();
        });
    }

    /// Drain the worker channel. Called once per frame.
    pub fn poll(&mut self) {
        let Some(result_rx) = &self.result_rx else {
            return;
        };

        match result_rx.try_recv() {
            Ok(Ok(hits)) => {
                self.state = SearchState::Ready(hits);
                self.result_rx = None;
            }
            Ok(Err(e)) => {
                log::warn!("Search failed: {e:#}");
                self.state = SearchState::Failed;
                self.result_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.state = SearchState::Failed;
                self.result_rx = None;
            }
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Drop the current result, e.g. after the user picked one.
    pub fn clear(&mut self) {
        self.state = SearchState::Idle;
    }
}

fn search(query: &str) -> anyhow::Result<Vec<SearchHit>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let body = client
        .get("https://nominatim.openstreetmap.org/search")
        .query(&[("format", "json"), ("q", query)])
        .send()
        .context("geocoding request failed")?
        .error_for_status()?
        .text()?;

    let places: Vec<NominatimPlace> =
        serde_json::from_str(&body).context("unexpected geocoding response")?;

    places
        .into_iter()
        .take(MAX_HITS)
        .map(|place| {
            Ok(SearchHit {
                position: lat_lon(
                    place.lat.parse().context("bad latitude in response")?,
                    place.lon.parse().context("bad longitude in response")?,
                ),
                display_name: place.display_name,
            })
        })
        .collect()
}
