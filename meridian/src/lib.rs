#![doc = include_str!("../README.md")]
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]

mod center;
mod globe;
mod http_tiles;
mod io;
mod map;
mod memory;
mod mercator;
mod position;
mod projector;
pub mod sources;
mod tiles;
mod zoom;

pub use globe::GlobeCamera;
pub use http_tiles::HttpTiles;
pub use io::{Fetch, HeaderValue, HttpOptions, MaxParallelDownloads, Stats, TileState};
pub use map::{Map, Plugin};
pub use memory::{MapMemory, ViewMode};
pub use mercator::{MAX_LATITUDE, TileId, total_tiles, unproject};
pub use position::{AdjustedPosition, Pixels, PixelsExt, Position, lat_lon, lon_lat};
pub use projector::Projector;
pub use tiles::{Tile, TileError, TileTexture, Tiles};
pub use zoom::InvalidZoom;
