use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod camera;
pub mod hover;
pub mod palette;
pub mod render;
mod session;
pub mod world;

pub use app::{run_app, AppError, InputAction, LoopConfig, LoopMetricsSnapshot, ScreenshotError};
pub use camera::{
    Camera, CameraController, Vec2, Viewport, DEFAULT_TILE, MAX_TILE, MIN_TILE, PAN_SPEED,
    ZOOM_STEP,
};
pub use hover::{resolve_hover, HoverInfo, HoverTarget, EMPTY_CELL_NAME};
pub use palette::{
    default_palette, load_palette, Palette, PaletteEntry, PaletteError, PaletteKey,
    LIQUID_OFFSET,
};
pub use render::{
    render_viewport, visible_chunk_range, CacheStats, ChunkCache, ChunkKey, ChunkRange,
    ChunkSurface, RasterWorkers, RenderStats, BACKGROUND_COLOR, CHUNK_TILES,
};
pub use session::MapView;
pub use world::{Cell, DenseGrid, GridAccessor, GridError, Layer, LiquidKind, DRAW_ORDER};

pub const ROOT_ENV_VAR: &str = "MAPVIEW_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub palette_path: PathBuf,
    pub screenshot_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "MAPVIEW_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
export {env_var}=\"/path/to/mapview\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    Ok(app_paths_for_root(root))
}

pub fn app_paths_for_root(root: PathBuf) -> AppPaths {
    let palette_path = root.join("assets").join("palette.json");
    let screenshot_dir = root.join("screenshots");
    AppPaths {
        root,
        palette_path,
        screenshot_dir,
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var_os(ROOT_ENV_VAR) {
        Some(value) => {
            let path = fs::canonicalize(&value).unwrap_or_else(|_| PathBuf::from(&value));
            if looks_like_root(&path) {
                Ok(path)
            } else {
                Err(StartupError::InvalidEnvRoot { path })
            }
        }
        None => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_above(exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: exe_dir.to_path_buf(),
                env_var: ROOT_ENV_VAR,
            })
        }
    }
}

/// Nearest directory at or above `start` that holds the workspace manifest.
fn find_root_above(start: &Path) -> Option<PathBuf> {
    let start = fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    start
        .ancestors()
        .find(|candidate| looks_like_root(candidate))
        .map(Path::to_path_buf)
}

fn looks_like_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file()
        && (path.join("crates").is_dir() || path.join("assets").is_dir())
}
