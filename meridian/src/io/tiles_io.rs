//! Channel plumbing and the bounded cache between the UI thread and the IO thread.

use std::sync::{Arc, Mutex};

use egui::Context;
use futures::channel::mpsc::{Receiver, Sender, TrySendError, channel};
use lru::LruCache;

use crate::io::{Fetch, fetch::fetch_continuously, runtime::Runtime};
use crate::mercator::TileId;
use crate::tiles::Tile;

/// Lifecycle of a single requested tile.
///
/// Every cache entry starts as `Pending` the moment the fetch is enqueued, and moves to exactly
/// one of the terminal states when the completion arrives. `Failed` is terminal for the session:
/// nothing retries it, the tile just never draws.
#[derive(Clone)]
pub enum TileState {
    Pending,
    Ready(Tile),
    Failed,
}

/// Cache entries per layer.
const CACHE_SIZE: usize = 256;

#[derive(Clone, Default)]
pub struct Stats {
    /// Number of tiles that are currently being fetched.
    pub in_progress: usize,
}

/// Asynchronously load tiles and keep their state in a bounded LRU cache.
pub(crate) struct TilesIo {
    /// Tiles to be fetched by the IO thread.
    request_tx: Sender<TileId>,

    /// Tiles that got fetched and should be put in the cache.
    tile_rx: Receiver<(TileId, TileState)>,

    pub(crate) cache: LruCache<TileId, TileState>,
    stats: Arc<Mutex<Stats>>,

    #[allow(dead_code)] // Significant Drop
    runtime: Runtime,
}

impl TilesIo {
    pub fn new(fetch: impl Fetch + Send + Sync + 'static, egui_ctx: Context) -> Self {
        let stats = Arc::new(Mutex::new(Stats { in_progress: 0 }));

        // This ensures that newer requests are prioritized.
        let channel_size = fetch.max_concurrency();

        let (request_tx, request_rx) = channel(channel_size);
        let (tile_tx, tile_rx) = channel(channel_size);

        // This will run concurrently in a loop, handling fetches and talking to us via the
        // channels.
        let runtime = Runtime::new(fetch_continuously(
            fetch,
            stats.clone(),
            request_rx,
            tile_tx,
            egui_ctx,
        ));

        #[allow(clippy::unwrap_used)] // Obviously non-zero.
        let cache_size = std::num::NonZeroUsize::new(CACHE_SIZE).unwrap();

        Self {
            request_tx,
            tile_rx,
            cache: LruCache::new(cache_size),
            stats,
            runtime,
        }
    }

    /// Drain one completion from the IO thread. This is called every frame, so take just one at
    /// a time.
    pub fn put_single_completed_tile_in_cache(&mut self) {
        match self.tile_rx.try_next() {
            Ok(Some((tile_id, state))) => {
                self.cache.put(tile_id, state);
            }
            Err(_) => {
                // Just ignore. It means that no new tile was fetched.
            }
            Ok(None) => {
                log::error!("IO thread is dead");
            }
        }
    }

    /// Enqueue a fetch unless the tile is already present in any state. Two requests for the
    /// same tile therefore trigger exactly one fetch, and a failed tile is never retried.
    pub fn make_sure_is_requested(&mut self, tile_id: TileId) {
        match self
            .cache
            .try_get_or_insert(tile_id, || -> Result<TileState, TrySendError<TileId>> {
                self.request_tx.try_send(tile_id)?;
                log::trace!("Requested tile: {tile_id:?}");
                Ok(TileState::Pending)
            }) {
            Ok(_) => {}
            Err(err) if err.is_full() => {
                // Too many tiles at once; the next frame will try again.
                log::trace!("Request queue is full.");
            }
            Err(err) => {
                log::error!("Failed to request tile {tile_id:?}: {err}");
            }
        }
    }

    /// Drop all cached state. Used when tile addressing changes wholesale, e.g. on a view mode
    /// switch; dropped tiles will be re-requested on demand.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> Stats {
        if let Ok(stats) = self.stats.lock() {
            stats.clone()
        } else {
            // I really do not want this to return a Result.
            Stats::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use bytes::Bytes;

    static TILE_ID: TileId = TileId {
        x: 1,
        y: 2,
        zoom: 3,
    };

    /// Minimal valid PNG, generated in memory so the tests carry no binary assets.
    fn tile_bytes() -> Bytes {
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(4, 4))
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(bytes.into_inner())
    }

    #[derive(Debug, thiserror::Error)]
    #[error("refused")]
    struct Refused;

    /// [`Fetch`] double counting how many times it was actually asked for bytes.
    struct CountingFetch {
        fetches: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CountingFetch {
        fn new(fail: bool) -> (Self, Arc<AtomicUsize>) {
            let fetches = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    fetches: Arc::clone(&fetches),
                    fail,
                },
                fetches,
            )
        }
    }

    impl Fetch for CountingFetch {
        type Error = Refused;

        async fn fetch(&self, _: TileId) -> Result<Bytes, Self::Error> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Refused)
            } else {
                Ok(tile_bytes())
            }
        }

        fn max_concurrency(&self) -> usize {
            6
        }
    }

    async fn wait_for_terminal_state(io: &mut TilesIo, tile_id: TileId) -> TileState {
        for _ in 0..500 {
            io.put_single_completed_tile_in_cache();
            match io.cache.get(&tile_id) {
                None | Some(TileState::Pending) => {}
                Some(terminal) => return terminal.clone(),
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("tile {tile_id:?} never reached a terminal state");
    }

    #[tokio::test]
    async fn requesting_the_same_tile_twice_fetches_once() {
        let _ = env_logger::try_init();

        let (fetch, fetches) = CountingFetch::new(false);
        let mut io = TilesIo::new(fetch, Context::default());

        io.make_sure_is_requested(TILE_ID);
        io.make_sure_is_requested(TILE_ID);

        assert!(matches!(
            wait_for_terminal_state(&mut io, TILE_ID).await,
            TileState::Ready(_)
        ));

        // Even ready tiles must not be fetched again.
        io.make_sure_is_requested(TILE_ID);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(1, fetches.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failed_tile_is_not_retried() {
        let _ = env_logger::try_init();

        let (fetch, fetches) = CountingFetch::new(true);
        let mut io = TilesIo::new(fetch, Context::default());

        io.make_sure_is_requested(TILE_ID);
        assert!(matches!(
            wait_for_terminal_state(&mut io, TILE_ID).await,
            TileState::Failed
        ));

        io.make_sure_is_requested(TILE_ID);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(1, fetches.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn clearing_makes_the_tile_eligible_again() {
        let _ = env_logger::try_init();

        let (fetch, fetches) = CountingFetch::new(false);
        let mut io = TilesIo::new(fetch, Context::default());

        io.make_sure_is_requested(TILE_ID);
        let _ = wait_for_terminal_state(&mut io, TILE_ID).await;

        io.clear();
        io.make_sure_is_requested(TILE_ID);
        let _ = wait_for_terminal_state(&mut io, TILE_ID).await;

        assert_eq!(2, fetches.load(Ordering::SeqCst));
    }
}
