use super::ChunkSurface;

pub(crate) fn fill_frame(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

/// Composites `surface` with its top-left corner at (`left`, `top`) in frame pixels.
/// Fully transparent source pixels are skipped; partial alpha blends source-over.
pub(crate) fn blit_surface_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    surface: &ChunkSurface,
    left: i64,
    top: i64,
) {
    let side = i64::from(surface.side_px());
    if side == 0 || width == 0 || height == 0 {
        return;
    }
    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = (left + side).min(i64::from(width));
    let draw_bottom = (top + side).min(i64::from(height));
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }
    let expected_len = width as usize * height as usize * 4;
    if frame.len() < expected_len {
        return;
    }

    let src = surface.rgba();
    let src_stride = side as usize * 4;
    let dst_stride = width as usize * 4;
    let span = (draw_right - draw_left) as usize * 4;

    for out_y in draw_top..draw_bottom {
        let src_x = (draw_left - left) as usize * 4;
        let src_offset = (out_y - top) as usize * src_stride + src_x;
        let dst_offset = out_y as usize * dst_stride + draw_left as usize * 4;
        let src_row = &src[src_offset..src_offset + span];
        let dst_row = &mut frame[dst_offset..dst_offset + span];

        for (dst, src) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            match src[3] {
                0 => {}
                255 => dst.copy_from_slice(src),
                alpha => blend_over(dst, src, alpha),
            }
        }
    }
}

fn blend_over(dst: &mut [u8], src: &[u8], alpha: u8) {
    let a = u32::from(alpha);
    let inv = 255 - a;
    for channel in 0..3 {
        let mixed = (u32::from(src[channel]) * a + u32::from(dst[channel]) * inv + 127) / 255;
        dst[channel] = mixed as u8;
    }
    dst[3] = 255;
}

pub(crate) fn draw_rect_outline_clipped(
    frame: &mut [u8],
    width: u32,
    left: i64,
    top: i64,
    size: i64,
    color: [u8; 4],
) {
    if size <= 0 {
        return;
    }
    let right = left + size - 1;
    let bottom = top + size - 1;
    for x in left..=right {
        write_pixel_rgba_clipped(frame, width as usize, x, top, color);
        write_pixel_rgba_clipped(frame, width as usize, x, bottom, color);
    }
    for y in top..=bottom {
        write_pixel_rgba_clipped(frame, width as usize, left, y, color);
        write_pixel_rgba_clipped(frame, width as usize, right, y, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i64, y: i64, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
