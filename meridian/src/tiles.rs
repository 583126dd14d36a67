use std::collections::HashSet;

use egui::{Color32, ColorImage, Context, Mesh, Rect, TextureHandle, Vec2, pos2};

use crate::mercator::{TileId, project, tile_id};
use crate::position::{Pixels, PixelsExt as _, Position};
use crate::sources::Attribution;

/// Source of tiles to be put together to render the map.
pub trait Tiles {
    fn at(&mut self, tile_id: TileId) -> Option<TileTexture>;
    fn attribution(&self) -> Attribution;
    fn tile_size(&self) -> u32;
}

#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("failed to decode tile image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Single tile image, uploaded to the GPU.
#[derive(Clone)]
pub struct Tile(TextureHandle);

impl Tile {
    pub fn new(image: &[u8], ctx: &Context) -> Result<Self, TileError> {
        let image = image::load_from_memory(image)?.to_rgba8();
        let pixels = image.as_flat_samples();
        let image = ColorImage::from_rgba_unmultiplied(
            [image.width() as _, image.height() as _],
            pixels.as_slice(),
        );

        Ok(Self::from_color_image(image, ctx))
    }

    /// Load the tile from egui's [`ColorImage`].
    pub fn from_color_image(color_image: ColorImage, ctx: &Context) -> Self {
        Self(ctx.load_texture("tile", color_image, Default::default()))
    }

    /// Draw the tile on the given `rect`, tinted with `tint`. The `uv` parameter defines which
    /// part of the tile should be drawn on the `rect`.
    pub(crate) fn draw(&self, painter: &egui::Painter, rect: Rect, uv: Rect, tint: Color32) {
        let mut mesh = Mesh::with_texture(self.0.id());
        mesh.add_rect_with_uv(rect, uv, tint);
        painter.add(egui::Shape::mesh(mesh));
    }
}

/// Tile with UV coordinates, i.e. possibly a clipped part of a lower-zoom donor.
pub struct TileTexture {
    pub texture: Tile,
    pub uv: Rect,
}

pub(crate) fn rect(screen_position: Vec2, tile_size: f64) -> Rect {
    Rect::from_min_size(screen_position.to_pos2(), Vec2::splat(tile_size as f32))
}

/// Paint one tile layer covering the whole viewport. The tint is how the dark color transform
/// reaches the tiles; overlays are painted elsewhere and stay untinted.
pub(crate) fn draw_tiles(
    painter: &egui::Painter,
    map_center: Position,
    zoom: f64,
    tiles: &mut dyn Tiles,
    tint: Color32,
) {
    let mut painted = HashSet::default();
    flood_fill_tiles(
        painter,
        tile_id(map_center, zoom.round() as u8, tiles.tile_size()),
        project(map_center, zoom),
        zoom,
        tiles,
        tint,
        &mut painted,
    );
}

/// Use simple [flood fill algorithm](https://en.wikipedia.org/wiki/Flood_fill) to draw tiles on
/// the map. Starting from the tile under the center, it spreads in all four directions and stops
/// at tiles that fall outside the viewport, so the painted set always covers the visible
/// rectangle with no gaps at the edges.
fn flood_fill_tiles(
    painter: &egui::Painter,
    tile_id: TileId,
    map_center_projected_position: Pixels,
    zoom: f64,
    tiles: &mut dyn Tiles,
    tint: Color32,
    painted: &mut HashSet<TileId>,
) {
    // We need to make up the difference between integer and floating point zoom levels.
    let corrected_tile_size = tiles.tile_size() as f64 * 2f64.powf(zoom - zoom.round());
    let tile_projected = tile_id.project(corrected_tile_size);
    let tile_screen_position = painter.clip_rect().center().to_vec2()
        + (tile_projected - map_center_projected_position).to_vec2();

    if painter
        .clip_rect()
        .intersects(rect(tile_screen_position, corrected_tile_size))
        && painted.insert(tile_id)
    {
        // Pending and failed tiles draw nothing; the donor logic inside `at` may still paint a
        // scaled-up ancestor here.
        if let Some(tile) = tiles.at(tile_id) {
            tile.texture.draw(
                painter,
                rect(tile_screen_position, corrected_tile_size),
                tile.uv,
                tint,
            );
        }

        for next_tile_id in [
            tile_id.north(),
            tile_id.east(),
            tile_id.south(),
            tile_id.west(),
        ]
        .iter()
        .flatten()
        {
            flood_fill_tiles(
                painter,
                *next_tile_id,
                map_center_projected_position,
                zoom,
                tiles,
                tint,
                painted,
            );
        }
    }
}

/// Take a piece of a tile with lower zoom level and use it as a required tile.
pub(crate) fn interpolate_from_lower_zoom(tile_id: TileId, available_zoom: u8) -> (TileId, Rect) {
    assert!(tile_id.zoom >= available_zoom);

    let dzoom = 2u32.pow((tile_id.zoom - available_zoom) as u32);

    let x = (tile_id.x / dzoom, tile_id.x % dzoom);
    let y = (tile_id.y / dzoom, tile_id.y % dzoom);

    let zoomed_tile_id = TileId {
        x: x.0,
        y: y.0,
        zoom: available_zoom,
    };

    let z = (dzoom as f32).recip();

    let uv = Rect::from_min_max(
        pos2(x.1 as f32 * z, y.1 as f32 * z),
        pos2(x.1 as f32 * z + z, y.1 as f32 * z + z),
    );

    (zoomed_tile_id, uv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolating_from_the_same_zoom_is_an_identity() {
        let tile_id = TileId {
            x: 38,
            y: 12,
            zoom: 6,
        };

        let (donor, uv) = interpolate_from_lower_zoom(tile_id, 6);
        assert_eq!(donor, tile_id);
        assert_eq!(uv, Rect::from_min_max(pos2(0., 0.), pos2(1., 1.)));
    }

    #[test]
    fn interpolating_takes_the_right_quarter_of_the_parent() {
        let tile_id = TileId {
            x: 3,
            y: 2,
            zoom: 2,
        };

        let (donor, uv) = interpolate_from_lower_zoom(tile_id, 1);
        assert_eq!(
            donor,
            TileId {
                x: 1,
                y: 1,
                zoom: 1
            }
        );

        // Odd x, even y: right half, top half of the donor.
        assert_eq!(uv, Rect::from_min_max(pos2(0.5, 0.), pos2(1., 0.5)));
    }
}
