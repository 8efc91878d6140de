mod blit;
mod cache;
mod rasterizer;
mod surface;
mod viewport;
mod worker;

pub(crate) use blit::draw_rect_outline_clipped;
pub use cache::{CacheStats, ChunkCache, ChunkKey};
pub use rasterizer::{chunk_side_px, rasterize_chunk, CHUNK_TILES};
pub use surface::ChunkSurface;
pub use viewport::{render_viewport, visible_chunk_range, ChunkRange, RenderStats, BACKGROUND_COLOR};
pub use worker::RasterWorkers;
