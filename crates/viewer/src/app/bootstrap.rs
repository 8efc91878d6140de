use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use mapview_engine::{
    default_palette, load_palette, resolve_app_paths, AppError, GridAccessor, LoopConfig, Palette,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::demo_world::{self, DemoWorldConfig};

const PALETTE_ENV_VAR: &str = "MAPVIEW_PALETTE";
const WORLD_SIZE_ENV_VAR: &str = "MAPVIEW_WORLD_SIZE";
const WORLD_SEED_ENV_VAR: &str = "MAPVIEW_WORLD_SEED";
const CACHE_BUDGET_ENV_VAR: &str = "MAPVIEW_CACHE_BUDGET_MB";
const ASYNC_RASTER_ENV_VAR: &str = "MAPVIEW_ASYNC_RASTER";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) grid: Arc<dyn GridAccessor>,
    pub(crate) palette: Arc<Palette>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Map Viewer Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        screenshot_dir = %app_paths.screenshot_dir.display(),
        "startup"
    );

    let palette = load_configured_palette(app_paths.palette_path)?;

    let defaults = DemoWorldConfig::default();
    let (width, height) = read_env(WORLD_SIZE_ENV_VAR, parse_world_size)
        .unwrap_or((defaults.width, defaults.height));
    let world_config = DemoWorldConfig {
        width,
        height,
        seed: read_env(WORLD_SEED_ENV_VAR, |raw| raw.parse::<u64>().ok()).unwrap_or(defaults.seed),
    };
    let started = Instant::now();
    let grid = demo_world::generate(world_config)?;
    info!(
        width = grid.width(),
        height = grid.height(),
        seed = world_config.seed,
        spawn_x = grid.spawn_point().0,
        spawn_y = grid.spawn_point().1,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "world_generated"
    );

    let config = LoopConfig {
        cache_byte_budget: read_env(CACHE_BUDGET_ENV_VAR, parse_cache_budget_mb).flatten(),
        async_raster: read_env(ASYNC_RASTER_ENV_VAR, parse_bool_flag).unwrap_or(false),
        screenshot_dir: app_paths.screenshot_dir,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        grid: Arc::new(grid),
        palette: Arc::new(palette),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Explicit env path, then the project palette, then the bundled default.
fn load_configured_palette(project_palette: PathBuf) -> Result<Palette, AppError> {
    let (palette, source) = match env::var_os(PALETTE_ENV_VAR) {
        Some(path) => {
            let path = PathBuf::from(path);
            (load_palette(&path)?, path.display().to_string())
        }
        None if project_palette.is_file() => (
            load_palette(&project_palette)?,
            project_palette.display().to_string(),
        ),
        None => (default_palette()?, "bundled".to_string()),
    };
    info!(source = %source, entries = palette.len(), "palette_loaded");
    Ok(palette)
}

/// Reads and parses an env var; invalid values warn and yield `None`.
fn read_env<T>(var: &'static str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    match env::var(var) {
        Ok(raw) => {
            let parsed = parse(raw.trim());
            if parsed.is_none() {
                warn!(
                    env_var = var,
                    value = raw.as_str(),
                    "invalid env var value; falling back to default"
                );
            }
            parsed
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var = var,
                error = %err,
                "unable to read env var; falling back to default"
            );
            None
        }
    }
}

fn parse_world_size(raw: &str) -> Option<(u32, u32)> {
    let (width, height) = raw.split_once(['x', 'X'])?;
    let width = width.trim().parse::<u32>().ok()?;
    let height = height.trim().parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

/// `0` disables the budget.
fn parse_cache_budget_mb(raw: &str) -> Option<Option<usize>> {
    let megabytes = raw.parse::<usize>().ok()?;
    Some((megabytes > 0).then(|| megabytes.saturating_mul(1024 * 1024)))
}

fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_size_parses_width_by_height() {
        assert_eq!(parse_world_size("8400x2400"), Some((8400, 2400)));
        assert_eq!(parse_world_size("640 X 480"), Some((640, 480)));
        assert_eq!(parse_world_size("0x10"), None);
        assert_eq!(parse_world_size("wide"), None);
        assert_eq!(parse_world_size("100x"), None);
    }

    #[test]
    fn cache_budget_zero_means_unbounded() {
        assert_eq!(parse_cache_budget_mb("0"), Some(None));
        assert_eq!(parse_cache_budget_mb("256"), Some(Some(256 * 1024 * 1024)));
        assert_eq!(parse_cache_budget_mb("-1"), None);
    }

    #[test]
    fn bool_flag_accepts_common_spellings() {
        assert_eq!(parse_bool_flag("1"), Some(true));
        assert_eq!(parse_bool_flag("TRUE"), Some(true));
        assert_eq!(parse_bool_flag("off"), Some(false));
        assert_eq!(parse_bool_flag("maybe"), None);
    }

    #[test]
    fn missing_project_palette_falls_back_to_bundled() {
        if env::var_os(PALETTE_ENV_VAR).is_some() {
            return;
        }
        let temp = std::env::temp_dir().join("mapview-no-such-palette.json");
        let palette = load_configured_palette(temp).expect("bundled palette");
        assert!(!palette.is_empty());
    }
}
