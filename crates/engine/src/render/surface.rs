/// Square RGBA8 image holding one rasterized chunk. Pixels start fully transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSurface {
    side_px: u32,
    rgba: Vec<u8>,
}

impl ChunkSurface {
    pub fn transparent(side_px: u32) -> Self {
        let len = side_px as usize * side_px as usize * 4;
        Self {
            side_px,
            rgba: vec![0; len],
        }
    }

    pub fn side_px(&self) -> u32 {
        self.side_px
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn byte_len(&self) -> usize {
        self.rgba.len()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.side_px || y >= self.side_px {
            return None;
        }
        let offset = (y as usize * self.side_px as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(px)
    }

    /// Overwrites (no blending) the given rectangle, clipped to the surface.
    pub(crate) fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: [u8; 4]) {
        let end_x = x.saturating_add(width).min(self.side_px);
        let end_y = y.saturating_add(height).min(self.side_px);
        if x >= end_x || y >= end_y {
            return;
        }
        let side = self.side_px as usize;
        for py in y as usize..end_y as usize {
            let row = &mut self.rgba[(py * side + x as usize) * 4..(py * side + end_x as usize) * 4];
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }
    }
}
