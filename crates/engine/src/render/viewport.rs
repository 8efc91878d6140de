use crate::camera::{Camera, Viewport};

use super::blit::{blit_surface_clipped, fill_frame};
use super::{chunk_side_px, ChunkCache, ChunkKey, CHUNK_TILES};

pub const BACKGROUND_COLOR: [u8; 4] = [40, 40, 40, 255];

/// Half-open chunk index range on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub x_start: i32,
    pub x_end: i32,
    pub y_start: i32,
    pub y_end: i32,
}

impl ChunkRange {
    pub const EMPTY: ChunkRange = ChunkRange {
        x_start: 0,
        x_end: 0,
        y_start: 0,
        y_end: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.x_start >= self.x_end || self.y_start >= self.y_end
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.x_end - self.x_start) as usize * (self.y_end - self.y_start) as usize
    }

    /// Row-major chunk coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x_start, x_end) = (self.x_start, self.x_end);
        (self.y_start..self.y_end).flat_map(move |y| (x_start..x_end).map(move |x| (x, y)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub chunks_visible: usize,
    pub chunks_drawn: usize,
    pub chunks_pending: usize,
}

/// Chunks intersecting the viewport, limited to chunks that hold at least one world cell.
pub fn visible_chunk_range(camera: &Camera, viewport: Viewport, world_cells: (u32, u32)) -> ChunkRange {
    let chunk_px = i64::from(chunk_side_px(camera.tile_size()));
    if chunk_px == 0 || viewport.is_empty() || world_cells.0 == 0 || world_cells.1 == 0 {
        return ChunkRange::EMPTY;
    }
    let (offset_x, offset_y) = camera.offset_px();
    let (x_start, x_end) = axis_range(offset_x, viewport.width, chunk_px, world_cells.0);
    let (y_start, y_end) = axis_range(offset_y, viewport.height, chunk_px, world_cells.1);
    ChunkRange {
        x_start,
        x_end,
        y_start,
        y_end,
    }
}

fn axis_range(offset: i64, extent: u32, chunk_px: i64, cells: u32) -> (i32, i32) {
    let world_chunks = i64::from(cells.div_ceil(CHUNK_TILES));
    let start = offset.div_euclid(chunk_px);
    let end = (offset + i64::from(extent)).div_euclid(chunk_px) + 1;
    let start = start.clamp(0, world_chunks);
    let end = end.clamp(start, world_chunks);
    (start as i32, end as i32)
}

/// Fills `frame` with the background and composites every visible chunk at
/// `chunk * chunk_px - offset`. Chunks still rasterizing in the background are skipped
/// for this frame.
pub fn render_viewport(
    frame: &mut [u8],
    width: u32,
    height: u32,
    camera: &Camera,
    cache: &mut ChunkCache,
) -> RenderStats {
    fill_frame(frame, BACKGROUND_COLOR);

    let world_cells = cache.grid().size();
    let range = visible_chunk_range(camera, Viewport::new(width, height), world_cells);
    let tile_size = camera.tile_size();
    let chunk_px = i64::from(chunk_side_px(tile_size));
    let (offset_x, offset_y) = camera.offset_px();

    let mut stats = RenderStats {
        chunks_visible: range.len(),
        ..RenderStats::default()
    };
    for (chunk_x, chunk_y) in range.iter() {
        let Some(surface) = cache.fetch(ChunkKey::new(tile_size, chunk_x, chunk_y)) else {
            stats.chunks_pending += 1;
            continue;
        };
        let left = i64::from(chunk_x) * chunk_px - offset_x;
        let top = i64::from(chunk_y) * chunk_px - offset_y;
        blit_surface_clipped(frame, width, height, &surface, left, top);
        stats.chunks_drawn += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::camera::Vec2;
    use crate::palette::{Palette, PaletteEntry, PaletteKey};
    use crate::world::{Cell, DenseGrid};

    const STONE: [u8; 4] = [128, 128, 128, 255];
    const DIRT: [u8; 4] = [151, 107, 75, 255];

    fn palette() -> Arc<Palette> {
        let mut palette = Palette::new();
        palette.insert(
            PaletteKey::block(1),
            PaletteEntry {
                color: STONE,
                name: "Stone".to_string(),
            },
        );
        palette.insert(
            PaletteKey::block(0),
            PaletteEntry {
                color: DIRT,
                name: "Dirt".to_string(),
            },
        );
        Arc::new(palette)
    }

    fn frame_pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let index = (y as usize * width as usize + x as usize) * 4;
        [frame[index], frame[index + 1], frame[index + 2], frame[index + 3]]
    }

    #[test]
    fn small_viewport_requests_only_first_chunk() {
        let grid = DenseGrid::from_fn(200, 200, (0, 0), |_, _| Cell::block(1)).expect("grid");
        let mut cache = ChunkCache::new(Arc::new(grid), palette());
        let camera = Camera::new(Vec2::ZERO, 16);

        let range = visible_chunk_range(&camera, Viewport::new(320, 240), (200, 200));
        assert_eq!(
            range,
            ChunkRange {
                x_start: 0,
                x_end: 1,
                y_start: 0,
                y_end: 1
            }
        );

        let mut frame = vec![0; 320 * 240 * 4];
        let stats = render_viewport(&mut frame, 320, 240, &camera, &mut cache);
        assert_eq!(stats.chunks_drawn, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(ChunkKey::new(16, 0, 0)));
    }

    #[test]
    fn range_is_clamped_to_world_chunks() {
        let camera = Camera::new(Vec2::new(0.0, 0.0), 2);
        // 100 cells -> 2 chunks; 1920 px at 128 px per chunk would otherwise span 16.
        let range = visible_chunk_range(&camera, Viewport::new(1920, 1080), (100, 70));
        assert_eq!(range.x_end, 2);
        assert_eq!(range.y_end, 2);
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn range_follows_offset_across_chunk_boundaries() {
        let camera = Camera::new(Vec2::new(1500.0, 1023.0), 16);
        let range = visible_chunk_range(&camera, Viewport::new(800, 600), (1000, 1000));
        assert_eq!((range.x_start, range.x_end), (1, 3));
        assert_eq!((range.y_start, range.y_end), (0, 2));
    }

    #[test]
    fn degenerate_inputs_yield_empty_range() {
        let camera = Camera::default();
        assert!(visible_chunk_range(&camera, Viewport::new(0, 600), (10, 10)).is_empty());
        assert!(visible_chunk_range(&camera, Viewport::new(800, 600), (0, 10)).is_empty());
        assert_eq!(ChunkRange::EMPTY.iter().count(), 0);
    }

    #[test]
    fn uncovered_area_shows_background_and_cells_land_under_offset() {
        let grid = DenseGrid::from_fn(3, 2, (0, 0), |x, _| {
            if x == 0 {
                Cell::block(0)
            } else {
                Cell::block(1)
            }
        })
        .expect("grid");
        let mut cache = ChunkCache::new(Arc::new(grid), palette());
        let camera = Camera::new(Vec2::new(4.0, 0.0), 8);

        let (width, height) = (64, 32);
        let mut frame = vec![0; (width * height * 4) as usize];
        render_viewport(&mut frame, width, height, &camera, &mut cache);

        // cell 0 spans world px [0,8) -> screen [-4,4)
        assert_eq!(frame_pixel(&frame, width, 3, 0), DIRT);
        assert_eq!(frame_pixel(&frame, width, 4, 0), STONE);
        assert_eq!(frame_pixel(&frame, width, 19, 15), STONE);
        // past world width (3 cells * 8 - 4 = 20)
        assert_eq!(frame_pixel(&frame, width, 20, 0), BACKGROUND_COLOR);
        assert_eq!(frame_pixel(&frame, width, 0, 16), BACKGROUND_COLOR);
    }

    #[test]
    fn repeated_render_reuses_cached_chunks() {
        let grid = DenseGrid::from_fn(130, 10, (0, 0), |_, _| Cell::block(1)).expect("grid");
        let mut cache = ChunkCache::new(Arc::new(grid), palette());
        let camera = Camera::new(Vec2::ZERO, 2);
        let mut frame = vec![0; 400 * 100 * 4];

        render_viewport(&mut frame, 400, 100, &camera, &mut cache);
        let first = cache.stats();
        render_viewport(&mut frame, 400, 100, &camera, &mut cache);
        let second = cache.stats();

        assert_eq!(first.rasterizations, 3);
        assert_eq!(second.rasterizations, 3);
        assert_eq!(second.hits, 3);
    }
}
