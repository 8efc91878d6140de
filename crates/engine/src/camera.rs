use tracing::debug;

use crate::render::ChunkCache;

pub const DEFAULT_TILE: u32 = 16;
pub const MIN_TILE: u32 = 2;
pub const MAX_TILE: u32 = 32;
/// Tile-size change per wheel click.
pub const ZOOM_STEP: i32 = 2;
/// Pixels per pan key press.
pub const PAN_SPEED: f32 = 32.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Vec2 {
        Vec2::new(self.width as f32 * 0.5, self.height as f32 * 0.5)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Screen-space camera: `offset` is the world pixel shown at the top-left screen pixel,
/// `tile_size` the pixels per cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    offset: Vec2,
    tile_size: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            tile_size: DEFAULT_TILE,
        }
    }
}

impl Camera {
    pub fn new(offset: Vec2, tile_size: u32) -> Self {
        Self {
            offset,
            tile_size: clamp_tile_size(i64::from(tile_size)),
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Whole-pixel offset used for compositing and picking.
    pub fn offset_px(&self) -> (i64, i64) {
        (self.offset.x.floor() as i64, self.offset.y.floor() as i64)
    }

    /// Fractional cell coordinate under a screen point.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let tile = self.tile_size as f32;
        Vec2::new(
            (screen.x + self.offset.x) / tile,
            (screen.y + self.offset.y) / tile,
        )
    }

    pub fn screen_to_cell(&self, screen: Vec2) -> (i64, i64) {
        let (ox, oy) = self.offset_px();
        let tile = self.tile_size as f64;
        (
            ((f64::from(screen.x) + ox as f64) / tile).floor() as i64,
            ((f64::from(screen.y) + oy as f64) / tile).floor() as i64,
        )
    }

    /// Screen position of the top-left corner of a cell.
    pub fn cell_to_screen(&self, x: i64, y: i64) -> (i64, i64) {
        let (ox, oy) = self.offset_px();
        let tile = i64::from(self.tile_size);
        (x * tile - ox, y * tile - oy)
    }
}

pub fn clamp_tile_size(tile_size: i64) -> u32 {
    tile_size.clamp(i64::from(MIN_TILE), i64::from(MAX_TILE)) as u32
}

/// Owns the camera and applies pan, anchored zoom and resize against a fixed world size.
#[derive(Debug, Clone)]
pub struct CameraController {
    camera: Camera,
    viewport: Viewport,
    world_cells: (u32, u32),
}

impl CameraController {
    pub fn new(world_cells: (u32, u32), viewport: Viewport, camera: Camera) -> Self {
        let mut controller = Self {
            camera,
            viewport,
            world_cells,
        };
        controller.clamp();
        controller
    }

    /// Places `cell` at the viewport center, then clamps.
    pub fn centered_on(
        cell: (u32, u32),
        world_cells: (u32, u32),
        viewport: Viewport,
        tile_size: u32,
    ) -> Self {
        let tile_size = clamp_tile_size(i64::from(tile_size));
        let center = viewport.center();
        let offset = Vec2::new(
            (cell.0 as f32 * tile_size as f32 - center.x).max(0.0),
            (cell.1 as f32 * tile_size as f32 - center.y).max(0.0),
        );
        Self::new(world_cells, viewport, Camera::new(offset, tile_size))
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn world_cells(&self) -> (u32, u32) {
        self.world_cells
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.camera.offset.x -= dx;
        self.camera.offset.y -= dy;
        self.clamp();
    }

    /// Changes tile size by `step * ZOOM_STEP` keeping the cell under `anchor` fixed on
    /// screen. Invalidates `cache` when the tile size actually changes. The offset is left
    /// unclamped so the anchor stays exact until the next frame's clamp.
    pub fn zoom(&mut self, step: i32, anchor: Vec2, cache: &mut ChunkCache) -> bool {
        let old_tile_size = self.camera.tile_size;
        let world = self.camera.screen_to_world(anchor);
        let new_tile_size = clamp_tile_size(
            i64::from(old_tile_size) + i64::from(step) * i64::from(ZOOM_STEP),
        );

        let changed = new_tile_size != old_tile_size;
        if changed {
            cache.invalidate_all();
            self.camera.tile_size = new_tile_size;
            debug!(
                from = old_tile_size,
                to = new_tile_size,
                anchor_x = anchor.x,
                anchor_y = anchor.y,
                "zoom_changed"
            );
        }

        let tile = new_tile_size as f32;
        self.camera.offset = Vec2::new(world.x * tile - anchor.x, world.y * tile - anchor.y);
        changed
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn clamp(&mut self) {
        let tile = self.camera.tile_size as f32;
        self.camera.offset = Vec2::new(
            clamp_axis(
                self.camera.offset.x,
                self.world_cells.0 as f32 * tile,
                self.viewport.width,
            ),
            clamp_axis(
                self.camera.offset.y,
                self.world_cells.1 as f32 * tile,
                self.viewport.height,
            ),
        );
    }
}

fn clamp_axis(offset: f32, world_px: f32, viewport_px: u32) -> f32 {
    if !offset.is_finite() {
        return 0.0;
    }
    let max_offset = (world_px - viewport_px as f32).max(0.0);
    offset.clamp(0.0, max_offset)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::palette::Palette;
    use crate::world::{Cell, DenseGrid};

    const BIG_WORLD: (u32, u32) = (8400, 2400);

    fn cache() -> ChunkCache {
        let grid = DenseGrid::from_fn(4, 4, (0, 0), |_, _| Cell::EMPTY).expect("grid");
        ChunkCache::new(Arc::new(grid), Arc::new(Palette::new()))
    }

    fn controller_at(offset: Vec2, tile_size: u32) -> CameraController {
        CameraController::new(
            BIG_WORLD,
            Viewport::new(1920, 1080),
            Camera::new(offset, tile_size),
        )
    }

    #[test]
    fn centered_on_spawn_places_spawn_mid_screen() {
        let controller =
            CameraController::centered_on((4200, 300), BIG_WORLD, Viewport::new(1920, 1080), 16);
        let offset = controller.camera().offset();
        assert_eq!(offset, Vec2::new(4200.0 * 16.0 - 960.0, 300.0 * 16.0 - 540.0));
        assert_eq!(controller.camera().screen_to_cell(Vec2::new(960.0, 540.0)), (4200, 300));
    }

    #[test]
    fn centered_on_near_origin_clamps_to_zero() {
        let controller =
            CameraController::centered_on((3, 2), BIG_WORLD, Viewport::new(1920, 1080), 16);
        assert_eq!(controller.camera().offset(), Vec2::ZERO);
    }

    #[test]
    fn pan_moves_opposite_to_drag_and_clamps() {
        let mut controller = controller_at(Vec2::new(500.0, 500.0), 16);
        controller.pan(100.0, -50.0);
        assert_eq!(controller.camera().offset(), Vec2::new(400.0, 550.0));

        controller.pan(10_000.0, 10_000.0);
        assert_eq!(controller.camera().offset(), Vec2::ZERO);

        controller.pan(-1.0e9, -1.0e9);
        let max_x = 8400.0 * 16.0 - 1920.0;
        let max_y = 2400.0 * 16.0 - 1080.0;
        assert_eq!(controller.camera().offset(), Vec2::new(max_x, max_y));
    }

    #[test]
    fn small_world_pins_offset_to_zero() {
        let mut controller = CameraController::new(
            (50, 20),
            Viewport::new(1920, 1080),
            Camera::new(Vec2::new(300.0, 300.0), 16),
        );
        assert_eq!(controller.camera().offset(), Vec2::ZERO);
        controller.pan(-500.0, -500.0);
        assert_eq!(controller.camera().offset(), Vec2::ZERO);
    }

    #[test]
    fn clamp_is_idempotent() {
        for (x, y) in [(-40.0, 10.0), (1.0e7, -3.0), (1234.5, 777.25), (f32::NAN, 5.0)] {
            let mut controller = controller_at(Vec2::ZERO, 16);
            controller.camera.offset = Vec2::new(x, y);
            controller.clamp();
            let once = *controller.camera();
            controller.clamp();
            assert_eq!(*controller.camera(), once);
        }
    }

    #[test]
    fn zoom_preserves_world_point_under_anchor() {
        let anchors = [
            Vec2::new(0.0, 0.0),
            Vec2::new(960.0, 540.0),
            Vec2::new(1919.0, 3.0),
            Vec2::new(17.5, 1000.25),
        ];
        for anchor in anchors {
            for step in [-3, -1, 1, 2, 5] {
                let mut cache = cache();
                let mut controller = controller_at(Vec2::new(20_000.0, 9_000.0), 16);
                let before = controller.camera().screen_to_world(anchor);
                controller.zoom(step, anchor, &mut cache);
                let after = controller.camera().screen_to_world(anchor);
                let tile = controller.camera().tile_size() as f32;
                assert!(
                    (before.x - after.x).abs() * tile <= 1.0,
                    "x drift at {anchor:?} step {step}"
                );
                assert!(
                    (before.y - after.y).abs() * tile <= 1.0,
                    "y drift at {anchor:?} step {step}"
                );
            }
        }
    }

    #[test]
    fn zoom_clamps_tile_size_and_only_invalidates_on_change() {
        let mut cache = cache();
        let mut controller = controller_at(Vec2::new(100.0, 100.0), 30);

        assert!(controller.zoom(5, Vec2::ZERO, &mut cache));
        assert_eq!(controller.camera().tile_size(), MAX_TILE);
        assert_eq!(cache.stats().invalidations, 1);

        assert!(!controller.zoom(1, Vec2::ZERO, &mut cache));
        assert_eq!(controller.camera().tile_size(), MAX_TILE);
        assert_eq!(cache.stats().invalidations, 1);

        assert!(controller.zoom(-100, Vec2::ZERO, &mut cache));
        assert_eq!(controller.camera().tile_size(), MIN_TILE);
        assert_eq!(cache.stats().invalidations, 2);
    }

    #[test]
    fn zoom_invalidates_cached_chunks() {
        let mut cache = cache();
        cache.get_or_create(0, 0, 16);
        let mut controller = controller_at(Vec2::ZERO, 16);
        controller.zoom(1, Vec2::new(10.0, 10.0), &mut cache);
        assert!(cache.is_empty());
    }

    #[test]
    fn resize_waits_for_clamp() {
        let max_x = 8400.0 * 16.0 - 1920.0;
        let mut controller = controller_at(Vec2::new(max_x, 0.0), 16);
        controller.resize(Viewport::new(2560, 1440));
        assert_eq!(controller.camera().offset().x, max_x);

        controller.clamp();
        assert_eq!(controller.camera().offset().x, 8400.0 * 16.0 - 2560.0);
    }

    #[test]
    fn screen_to_cell_floors_across_origin() {
        let camera = Camera::new(Vec2::new(10.0, 0.0), 8);
        assert_eq!(camera.screen_to_cell(Vec2::new(0.0, 0.0)), (1, 0));
        assert_eq!(camera.screen_to_cell(Vec2::new(5.0, 7.9)), (1, 0));
        assert_eq!(camera.screen_to_cell(Vec2::new(6.0, 8.0)), (2, 1));
        assert_eq!(camera.cell_to_screen(2, 1), (6, 8));
    }

    #[test]
    fn camera_new_clamps_tile_size() {
        assert_eq!(Camera::new(Vec2::ZERO, 0).tile_size(), MIN_TILE);
        assert_eq!(Camera::new(Vec2::ZERO, 1000).tile_size(), MAX_TILE);
    }
}
