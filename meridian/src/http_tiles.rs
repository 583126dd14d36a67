use egui::Context;

use crate::io::http::HttpFetch;
use crate::io::tiles_io::{Stats, TileState, TilesIo};
use crate::io::HttpOptions;
use crate::mercator::TileId;
use crate::sources::{Attribution, TileSource};
use crate::tiles::{Tiles, TileTexture, interpolate_from_lower_zoom};

/// Downloads tiles via HTTP. It must persist between frames.
///
/// Each instance is its own cache namespace; two layers showing the same `(zoom, x, y)` from
/// different servers never collide because each layer owns its own `HttpTiles`.
pub struct HttpTiles {
    io: TilesIo,
    attribution: Attribution,
    tile_size: u32,
    max_zoom: u8,
}

impl HttpTiles {
    /// Construct new [`HttpTiles`] with default [`HttpOptions`].
    pub fn new<S>(source: S, egui_ctx: Context) -> Self
    where
        S: TileSource + Send + Sync + 'static,
    {
        Self::with_options(source, HttpOptions::default(), egui_ctx)
    }

    /// Construct new [`HttpTiles`] with supplied [`HttpOptions`].
    pub fn with_options<S>(source: S, http_options: HttpOptions, egui_ctx: Context) -> Self
    where
        S: TileSource + Send + Sync + 'static,
    {
        let attribution = source.attribution();
        let tile_size = source.tile_size();
        let max_zoom = source.max_zoom();

        Self {
            io: TilesIo::new(HttpFetch::new(source, http_options), egui_ctx),
            attribution,
            tile_size,
            max_zoom,
        }
    }

    pub fn stats(&self) -> Stats {
        self.io.stats()
    }

    /// Forget every cached tile. Needed when the addressing scheme changes under the layer,
    /// e.g. when the view mode toggle moves rendering to a different zoom range.
    pub fn clear(&mut self) {
        self.io.clear();
    }

    /// Get a tile, or interpolate it from lower zoom levels. This function does not start any
    /// downloads.
    fn get_from_cache_or_interpolate(&mut self, tile_id: TileId) -> Option<TileTexture> {
        let mut zoom_candidate = tile_id.zoom;

        loop {
            let (zoomed_tile_id, uv) = interpolate_from_lower_zoom(tile_id, zoom_candidate);

            if let Some(TileState::Ready(texture)) = self.io.cache.get(&zoomed_tile_id) {
                break Some(TileTexture {
                    texture: texture.clone(),
                    uv,
                });
            }

            // Keep zooming out until we find a donor or there are no more zoom levels.
            zoom_candidate = zoom_candidate.checked_sub(1)?;
        }
    }
}

impl Tiles for HttpTiles {
    /// Return a tile if already in cache, schedule a fetch otherwise.
    fn at(&mut self, tile_id: TileId) -> Option<TileTexture> {
        self.io.put_single_completed_tile_in_cache();

        if !tile_id.valid() {
            return None;
        }

        let tile_id_to_fetch = if tile_id.zoom > self.max_zoom {
            interpolate_from_lower_zoom(tile_id, self.max_zoom).0
        } else {
            tile_id
        };

        self.io.make_sure_is_requested(tile_id_to_fetch);
        self.get_from_cache_or_interpolate(tile_id)
    }

    /// Attribution of the source this tile cache pulls images from. Typically, this should be
    /// displayed somewhere on the top of the map widget.
    fn attribution(&self) -> Attribution {
        self.attribution.clone()
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }
}
