use tracing::info;

use crate::camera::{Camera, CameraController, Vec2, Viewport, DEFAULT_TILE};
use crate::hover::{resolve_hover, HoverInfo};
use crate::render::{draw_rect_outline_clipped, render_viewport, CacheStats, ChunkCache, RenderStats};

pub const HIGHLIGHT_COLOR: [u8; 4] = [255, 255, 0, 255];

/// One map viewing session: camera state plus the chunk cache it renders through.
///
/// This is the whole surface a windowing layer needs: feed it pan, zoom and resize
/// events, call [`MapView::render`] once per frame, and query [`MapView::hover`].
#[derive(Debug)]
pub struct MapView {
    controller: CameraController,
    cache: ChunkCache,
}

impl MapView {
    /// Starts at the default tile size with the grid's spawn point centered.
    pub fn new(cache: ChunkCache, viewport: Viewport) -> Self {
        let grid = cache.grid();
        let controller =
            CameraController::centered_on(grid.spawn_point(), grid.size(), viewport, DEFAULT_TILE);
        let camera = controller.camera();
        info!(
            world_width = grid.width(),
            world_height = grid.height(),
            spawn_x = grid.spawn_point().0,
            spawn_y = grid.spawn_point().1,
            offset_x = camera.offset().x,
            offset_y = camera.offset().y,
            tile_size = camera.tile_size(),
            async_raster = cache.is_async(),
            "map_view_created"
        );
        Self { controller, cache }
    }

    pub fn camera(&self) -> &Camera {
        self.controller.camera()
    }

    pub fn viewport(&self) -> Viewport {
        self.controller.viewport()
    }

    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.controller.pan(dx, dy);
    }

    pub fn zoom(&mut self, step: i32, anchor: Vec2) -> bool {
        self.controller.zoom(step, anchor, &mut self.cache)
    }

    pub fn zoom_at_center(&mut self, step: i32) -> bool {
        let anchor = self.controller.viewport().center();
        self.zoom(step, anchor)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.controller.resize(Viewport::new(width, height));
    }

    pub fn clamp(&mut self) {
        self.controller.clamp();
    }

    pub fn invalidate_all(&mut self) {
        self.cache.invalidate_all();
    }

    pub fn hover(&self, screen: Vec2) -> Option<HoverInfo> {
        resolve_hover(
            screen,
            self.controller.camera(),
            self.cache.grid(),
            self.cache.palette(),
        )
    }

    /// Clamps the camera and composites the visible chunks into `frame`.
    pub fn render(&mut self, frame: &mut [u8], width: u32, height: u32) -> RenderStats {
        let viewport = Viewport::new(width, height);
        if viewport != self.controller.viewport() {
            self.controller.resize(viewport);
        }
        self.controller.clamp();
        self.cache.begin_frame();
        render_viewport(frame, width, height, self.controller.camera(), &mut self.cache)
    }

    /// Outlines a cell on top of an already rendered frame.
    pub fn draw_cell_highlight(&self, frame: &mut [u8], width: u32, cell: (u32, u32)) {
        let camera = self.controller.camera();
        let (left, top) = camera.cell_to_screen(i64::from(cell.0), i64::from(cell.1));
        draw_rect_outline_clipped(
            frame,
            width,
            left,
            top,
            i64::from(camera.tile_size()),
            HIGHLIGHT_COLOR,
        );
    }
}
