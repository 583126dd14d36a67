use super::{Attribution, TileSource};
use crate::TileId;

/// Esri's World Imagery satellite layer.
/// <https://www.arcgis.com/home/item.html?id=10df2279f9684e4a9f6a7f08febac2a9>
pub struct ArcGisWorldImagery;

impl TileSource for ArcGisWorldImagery {
    fn tile_url(&self, tile_id: TileId) -> String {
        // Note the z/y/x order; ArcGIS differs from the OSM convention here.
        format!(
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{}/{}/{}",
            tile_id.zoom, tile_id.y, tile_id.x
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Esri, Maxar, Earthstar Geographics",
            url: "https://www.esri.com/",
        }
    }
}
