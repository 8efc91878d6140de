use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::render::RenderStats;
use crate::MapView;

/// Window-backed RGBA frame buffer the map view renders into.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    /// Draws the view, outlines `highlight` if given, and presents.
    pub fn render_frame(
        &mut self,
        view: &mut MapView,
        highlight: Option<(u32, u32)>,
    ) -> Result<RenderStats, Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(RenderStats::default());
        }
        let (width, height) = (self.width, self.height);
        let frame = self.pixels.frame_mut();
        let stats = view.render(frame, width, height);
        if let Some(cell) = highlight {
            view.draw_cell_highlight(frame, width, cell);
        }
        self.pixels.render()?;
        Ok(stats)
    }

    /// Last presented frame, RGBA8 row-major.
    pub fn frame(&self) -> &[u8] {
        self.pixels.frame()
    }
}
