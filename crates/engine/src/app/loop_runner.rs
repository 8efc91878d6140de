use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use rayon::ThreadPoolBuildError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::hover::HoverInfo;
use crate::palette::{Palette, PaletteError};
use crate::render::{ChunkCache, RasterWorkers};
use crate::world::{GridAccessor, GridError};
use crate::{MapView, StartupError, Viewport};

use super::input::InputCollector;
use super::metrics::MetricsAccumulator;
use super::screenshot::save_screenshot;
use super::Renderer;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
    /// `None` keeps every chunk until the next zoom change.
    pub cache_byte_budget: Option<usize>,
    pub async_raster: bool,
    /// Worker count for async rasterization; 0 picks one per logical CPU.
    pub raster_threads: usize,
    pub screenshot_dir: PathBuf,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Map Viewer".to_string(),
            window_width: 1920,
            window_height: 1080,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: Some(60),
            cache_byte_budget: None,
            async_raster: false,
            raster_threads: 0,
            screenshot_dir: PathBuf::from("screenshots"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error("failed to build world grid: {0}")]
    Grid(#[from] GridError),
    #[error("failed to start raster worker pool: {0}")]
    RasterPool(#[source] ThreadPoolBuildError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    grid: Arc<dyn GridAccessor>,
    palette: Arc<Palette>,
) -> Result<(), AppError> {
    let cache = build_cache(&config, grid, palette)?;

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;
    let (width, height) = renderer.size();
    let mut view = MapView::new(cache, Viewport::new(width, height));

    event_loop.set_control_flow(ControlFlow::Poll);

    let pacing = FramePacing::from_config(&config);
    let mut input_collector = InputCollector::new(width, height);

    info!(
        window_width = width,
        window_height = height,
        metrics_log_interval_ms = pacing.metrics_interval.as_millis() as u64,
        render_fps_cap = %pacing.cap_label(),
        cache_byte_budget = ?config.cache_byte_budget,
        async_raster = config.async_raster,
        screenshot_dir = %config.screenshot_dir.display(),
        "loop_config"
    );

    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(pacing.metrics_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    view.resize(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    view.resize(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    input_collector.handle_mouse_wheel(delta);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let input = input_collector.take_frame_input();
                    if input.pan.x != 0.0 || input.pan.y != 0.0 {
                        view.pan(input.pan.x, input.pan.y);
                    }
                    for zoom in &input.zooms {
                        let (window_width, window_height) = input_collector.window_size();
                        let anchor = zoom.anchor.unwrap_or_else(|| {
                            Viewport::new(window_width, window_height).center()
                        });
                        view.zoom(zoom.steps, anchor);
                    }

                    let cap_sleep = pacing.sleep_before_present(
                        Instant::now().saturating_duration_since(last_present_instant),
                    );
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    view.clamp();
                    let hover = input.cursor.and_then(|cursor| view.hover(cursor));
                    let hover_cell = hover.as_ref().map(|info| (info.cell_x, info.cell_y));
                    let render_stats = match renderer.render_frame(&mut view, hover_cell) {
                        Ok(stats) => stats,
                        Err(error) => {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                            return;
                        }
                    };
                    last_present_instant = Instant::now();

                    if input.screenshot_requested {
                        let (frame_width, frame_height) = renderer.size();
                        match save_screenshot(
                            &config.screenshot_dir,
                            renderer.frame(),
                            frame_width,
                            frame_height,
                        ) {
                            Ok(path) => info!(path = %path.display(), "screenshot_saved"),
                            Err(error) => warn!(error = %error, "screenshot_failed"),
                        }
                    }

                    let next_title = format_hud_title(
                        &config.window_title,
                        view.camera().tile_size(),
                        hover.as_ref(),
                    );
                    if last_applied_title.as_deref() != Some(next_title.as_str()) {
                        window.set_title(&next_title);
                        last_applied_title = Some(next_title);
                    }

                    metrics_accumulator.record_frame(frame_dt, render_stats);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        let cache = view.cache_stats();
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            avg_chunks_drawn = snapshot.avg_chunks_drawn,
                            frames_with_pending = snapshot.frames_with_pending,
                            tile_size = view.camera().tile_size(),
                            cache_entries = cache.entries,
                            cache_bytes = cache.bytes,
                            cache_hits = cache.hits,
                            cache_misses = cache.misses,
                            rasterizations = cache.rasterizations,
                            evictions = cache.evictions,
                            in_flight = cache.in_flight,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                let cache = view.cache_stats();
                info!(
                    rasterizations = cache.rasterizations,
                    invalidations = cache.invalidations,
                    stale_drops = cache.stale_drops,
                    "shutdown"
                );
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn build_cache(
    config: &LoopConfig,
    grid: Arc<dyn GridAccessor>,
    palette: Arc<Palette>,
) -> Result<ChunkCache, AppError> {
    let cache = ChunkCache::new(grid, palette).with_byte_budget(config.cache_byte_budget);
    if !config.async_raster {
        return Ok(cache);
    }
    let workers = RasterWorkers::new(config.raster_threads).map_err(AppError::RasterPool)?;
    info!(threads = workers.thread_count(), "raster_workers_started");
    Ok(cache.with_workers(workers))
}

pub(crate) fn format_hud_title(base: &str, tile_size: u32, hover: Option<&HoverInfo>) -> String {
    match hover {
        Some(info) => format!(
            "{base} | Zoom={tile_size}  Pos=({}, {})  {}",
            info.cell_x, info.cell_y, info.name
        ),
        None => format!("{base} | Zoom={tile_size}"),
    }
}

/// Render cap and metrics cadence with zero values mapped to their defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FramePacing {
    fps_cap: Option<u32>,
    metrics_interval: Duration,
}

impl FramePacing {
    fn from_config(config: &LoopConfig) -> Self {
        let metrics_interval = if config.metrics_log_interval.is_zero() {
            Duration::from_secs(1)
        } else {
            config.metrics_log_interval
        };
        Self {
            fps_cap: config.max_render_fps.filter(|fps| *fps > 0),
            metrics_interval,
        }
    }

    fn sleep_before_present(&self, since_last_present: Duration) -> Duration {
        self.fps_cap.map_or(Duration::ZERO, |fps| {
            (Duration::from_secs(1) / fps).saturating_sub(since_last_present)
        })
    }

    fn cap_label(&self) -> String {
        self.fps_cap
            .map_or_else(|| "off".to_string(), |fps| fps.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hover::HoverTarget;
    use crate::world::{Cell, DenseGrid};

    #[test]
    fn default_config_matches_reference_window() {
        let config = LoopConfig::default();
        assert_eq!((config.window_width, config.window_height), (1920, 1080));
        assert_eq!(config.max_render_fps, Some(60));
        assert_eq!(config.cache_byte_budget, None);
        assert!(!config.async_raster);
    }

    #[test]
    fn hud_title_includes_hover_details() {
        let info = HoverInfo {
            cell_x: 12,
            cell_y: 340,
            target: HoverTarget::Block(1),
            name: "Stone".to_string(),
        };
        assert_eq!(
            format_hud_title("Map Viewer", 16, Some(&info)),
            "Map Viewer | Zoom=16  Pos=(12, 340)  Stone"
        );
        assert_eq!(format_hud_title("Map Viewer", 4, None), "Map Viewer | Zoom=4");
    }

    #[test]
    fn build_cache_honours_async_and_budget() {
        let grid: Arc<dyn GridAccessor> =
            Arc::new(DenseGrid::from_fn(4, 4, (0, 0), |_, _| Cell::EMPTY).expect("grid"));
        let palette = Arc::new(Palette::new());

        let sync = build_cache(&LoopConfig::default(), Arc::clone(&grid), Arc::clone(&palette))
            .expect("sync cache");
        assert!(!sync.is_async());

        let config = LoopConfig {
            async_raster: true,
            raster_threads: 1,
            cache_byte_budget: Some(1024),
            ..LoopConfig::default()
        };
        let async_cache = build_cache(&config, grid, palette).expect("async cache");
        assert!(async_cache.is_async());
    }

    #[test]
    fn pacing_maps_zero_settings_to_defaults() {
        let pacing = FramePacing::from_config(&LoopConfig {
            max_render_fps: Some(0),
            metrics_log_interval: Duration::ZERO,
            ..LoopConfig::default()
        });
        assert_eq!(pacing.fps_cap, None);
        assert_eq!(pacing.metrics_interval, Duration::from_secs(1));
        assert_eq!(pacing.cap_label(), "off");
        assert_eq!(pacing.sleep_before_present(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn pacing_sleeps_only_for_the_rest_of_the_frame() {
        let pacing = FramePacing::from_config(&LoopConfig {
            max_render_fps: Some(50),
            ..LoopConfig::default()
        });
        assert_eq!(pacing.cap_label(), "50");
        assert_eq!(
            pacing.sleep_before_present(Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert_eq!(
            pacing.sleep_before_present(Duration::from_millis(25)),
            Duration::ZERO
        );
    }
}
