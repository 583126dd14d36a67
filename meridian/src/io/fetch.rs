//! The asynchronous fetch loop running on the IO thread.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use egui::Context;
use futures::{
    SinkExt, StreamExt,
    channel::mpsc::{Receiver, Sender},
    future::{Either, select, select_all},
};

use crate::io::tiles_io::{Stats, TileState};
use crate::mercator::TileId;
use crate::tiles::Tile;

/// Something able to produce raw tile bytes, typically over HTTP. A fake implementation is all
/// it takes to exercise the whole pipeline in tests.
pub trait Fetch {
    type Error: std::error::Error + Send + Sync;

    fn fetch(&self, tile_id: TileId) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;

    /// How many fetches may run at the same time.
    fn max_concurrency(&self) -> usize;
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("tile request channel from the main thread was broken")]
    RequestChannelBroken,

    #[error("tile channel to the main thread was closed")]
    TileChannelClosed,

    #[error("tile channel to the main thread was full")]
    TileChannelFull,

    #[error("poisoned stats lock")]
    Poisoned,
}

impl From<futures::channel::mpsc::SendError> for Error {
    fn from(error: futures::channel::mpsc::SendError) -> Self {
        if error.is_disconnected() {
            Error::TileChannelClosed
        } else {
            Error::TileChannelFull
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::Poisoned
    }
}

/// Fetch and decode a single tile. Failures terminate in [`TileState::Failed`]; the map just
/// shows a gap there and no retry is ever scheduled.
async fn fetch_and_decode(
    fetch: &impl Fetch,
    tile_id: TileId,
    egui_ctx: &Context,
) -> (TileId, TileState) {
    let state = match fetch.fetch(tile_id).await {
        Ok(bytes) => match Tile::new(&bytes, egui_ctx) {
            Ok(tile) => TileState::Ready(tile),
            Err(e) => {
                log::warn!("Failed to decode tile {tile_id:?}: {e}");
                TileState::Failed
            }
        },
        Err(e) => {
            log::warn!("Failed to fetch tile {tile_id:?}: {e}");
            TileState::Failed
        }
    };

    (tile_id, state)
}

/// Post the completion back to the UI thread and wake it up. This is the "tile ready"
/// notification; without the repaint request the result would sit in the channel until some
/// other input happened to trigger a frame.
async fn fetch_complete(
    mut tile_tx: Sender<(TileId, TileState)>,
    egui_ctx: Context,
    completed: (TileId, TileState),
) -> Result<(), Error> {
    tile_tx.send(completed).await.map_err(Error::from)?;
    egui_ctx.request_repaint();
    Ok(())
}

async fn fetch_continuously_impl(
    fetch: impl Fetch,
    stats: Arc<Mutex<Stats>>,
    mut request_rx: Receiver<TileId>,
    tile_tx: Sender<(TileId, TileState)>,
    egui_ctx: Context,
) -> Result<(), Error> {
    let mut outstanding = Vec::new();

    loop {
        if outstanding.is_empty() {
            // Only new fetches might be requested.
            let tile_id = request_rx.next().await.ok_or(Error::RequestChannelBroken)?;
            let f = fetch_and_decode(&fetch, tile_id, &egui_ctx);
            outstanding.push(Box::pin(f));
        } else if outstanding.len() < fetch.max_concurrency() {
            // New fetches might be requested or ongoing ones might be completed.
            match select(request_rx.next(), select_all(outstanding.drain(..))).await {
                Either::Left((request, remaining)) => {
                    let tile_id = request.ok_or(Error::RequestChannelBroken)?;
                    let f = fetch_and_decode(&fetch, tile_id, &egui_ctx);
                    outstanding = remaining.into_inner();
                    outstanding.push(Box::pin(f));
                }
                Either::Right(((completed, _, remaining), _)) => {
                    fetch_complete(tile_tx.to_owned(), egui_ctx.to_owned(), completed).await?;
                    outstanding = remaining;
                }
            }
        } else {
            // At the concurrency limit; only ongoing fetches might be completed.
            let (completed, _, remaining) = select_all(outstanding.drain(..)).await;
            fetch_complete(tile_tx.to_owned(), egui_ctx.to_owned(), completed).await?;
            outstanding = remaining;
        }

        let mut stats = stats.lock()?;
        stats.in_progress = outstanding.len();
    }
}

/// Continuously fetch tiles requested via the request channel.
pub(crate) async fn fetch_continuously(
    fetch: impl Fetch,
    stats: Arc<Mutex<Stats>>,
    request_rx: Receiver<TileId>,
    tile_tx: Sender<(TileId, TileState)>,
    egui_ctx: Context,
) {
    match fetch_continuously_impl(fetch, stats, request_rx, tile_tx, egui_ctx).await {
        Ok(()) | Err(Error::TileChannelClosed) | Err(Error::RequestChannelBroken) => {
            log::debug!("Tile fetch loop finished.");
        }
        Err(error) => {
            log::error!("Tile fetch loop failed: {error}.");
        }
    }
}
