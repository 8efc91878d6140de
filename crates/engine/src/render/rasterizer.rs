use crate::palette::Palette;
use crate::world::{GridAccessor, DRAW_ORDER};

use super::{ChunkKey, ChunkSurface};

/// Cells per chunk edge.
pub const CHUNK_TILES: u32 = 64;

pub fn chunk_side_px(tile_size: u32) -> u32 {
    CHUNK_TILES.saturating_mul(tile_size)
}

/// Paints every in-bounds cell of the chunk back to front following [`DRAW_ORDER`].
/// Cells outside the grid, and cells with no layers, stay transparent.
pub fn rasterize_chunk(grid: &dyn GridAccessor, palette: &Palette, key: ChunkKey) -> ChunkSurface {
    let tile_size = key.tile_size;
    let mut surface = ChunkSurface::transparent(chunk_side_px(tile_size));
    if tile_size == 0 {
        return surface;
    }

    let origin_x = i64::from(key.chunk_x) * i64::from(CHUNK_TILES);
    let origin_y = i64::from(key.chunk_y) * i64::from(CHUNK_TILES);

    for dy in 0..CHUNK_TILES {
        let y = origin_y + i64::from(dy);
        if !grid.contains(origin_x.max(0), y) {
            continue;
        }
        for dx in 0..CHUNK_TILES {
            let x = origin_x + i64::from(dx);
            if !grid.contains(x, y) {
                continue;
            }
            let cell = grid.cell(x as u32, y as u32);
            for layer in DRAW_ORDER {
                let Some(palette_key) = layer.palette_key(&cell) else {
                    continue;
                };
                surface.fill_rect(
                    dx * tile_size,
                    dy * tile_size,
                    tile_size,
                    tile_size,
                    palette.color_of(palette_key),
                );
            }
        }
    }

    surface
}
