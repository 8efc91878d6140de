mod input;
mod loop_runner;
mod metrics;
mod renderer;
mod screenshot;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use renderer::Renderer;
pub use screenshot::{encode_png, save_screenshot, screenshot_file_name, ScreenshotError};
