use super::{Attribution, TileSource};
use crate::TileId;

/// Carto's Voyager basemap, a general-purpose street style.
/// <https://carto.com/basemaps/>
pub struct CartoVoyager;

impl TileSource for CartoVoyager {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://basemaps.cartocdn.com/rastertiles/voyager/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© CARTO, © OpenStreetMap contributors",
            url: "https://carto.com/attributions/",
        }
    }

    fn max_zoom(&self) -> u8 {
        19
    }
}

/// Label-only companion of [`CartoVoyager`], meant to be composited above imagery that carries
/// no labels of its own.
pub struct CartoVoyagerLabels;

impl TileSource for CartoVoyagerLabels {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://basemaps.cartocdn.com/rastertiles/voyager_only_labels/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© CARTO, © OpenStreetMap contributors",
            url: "https://carto.com/attributions/",
        }
    }
}
