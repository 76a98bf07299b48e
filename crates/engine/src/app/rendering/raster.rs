//! Clipped primitives over an RGBA8 frame buffer.

/// Integer pixel rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    fn clip(&self, rect: ScreenRect) -> Option<(i32, i32, i32, i32)> {
        let start_x = rect.x.max(0);
        let start_y = rect.y.max(0);
        let end_x = rect.x.saturating_add(rect.width).min(self.width as i32);
        let end_y = rect.y.saturating_add(rect.height).min(self.height as i32);
        if end_x <= start_x || end_y <= start_y {
            return None;
        }
        Some((start_x, start_y, end_x, end_y))
    }
}

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

/// Writes one pixel, blending when `color` is not fully opaque. Out-of-bounds
/// writes are ignored.
pub(crate) fn put_pixel(frame: &mut [u8], canvas: Canvas, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= canvas.width as i32 || y >= canvas.height as i32 {
        return;
    }
    let Some(byte_offset) = (y as usize)
        .checked_mul(canvas.width as usize)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
    else {
        return;
    };
    let Some(dst) = frame.get_mut(byte_offset..byte_offset + 4) else {
        return;
    };
    match color[3] {
        0 => {}
        255 => dst.copy_from_slice(&color),
        alpha => {
            let alpha = alpha as u32;
            for channel in 0..3 {
                let blended = (color[channel] as u32 * alpha + dst[channel] as u32 * (255 - alpha)) / 255;
                dst[channel] = blended as u8;
            }
            dst[3] = 255;
        }
    }
}

pub(crate) fn fill_rect(frame: &mut [u8], canvas: Canvas, rect: ScreenRect, color: [u8; 4]) {
    let Some((start_x, start_y, end_x, end_y)) = canvas.clip(rect) else {
        return;
    };
    for py in start_y..end_y {
        for px in start_x..end_x {
            put_pixel(frame, canvas, px, py, color);
        }
    }
}

/// Fills the ellipse inscribed in `rect`.
pub(crate) fn fill_ellipse(frame: &mut [u8], canvas: Canvas, rect: ScreenRect, color: [u8; 4]) {
    let Some((start_x, start_y, end_x, end_y)) = canvas.clip(rect) else {
        return;
    };
    let rx = rect.width as f32 * 0.5;
    let ry = rect.height as f32 * 0.5;
    let cx = rect.x as f32 + rx;
    let cy = rect.y as f32 + ry;
    for py in start_y..end_y {
        for px in start_x..end_x {
            let dx = (px as f32 + 0.5 - cx) / rx;
            let dy = (py as f32 + 0.5 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                put_pixel(frame, canvas, px, py, color);
            }
        }
    }
}

/// Nearest-neighbour blit of an RGBA image stretched over `rect`.
pub(crate) fn blit_scaled(
    frame: &mut [u8],
    canvas: Canvas,
    rect: ScreenRect,
    image_width: u32,
    image_height: u32,
    rgba: &[u8],
) {
    if image_width == 0 || image_height == 0 {
        return;
    }
    if rgba.len() < image_width as usize * image_height as usize * 4 {
        return;
    }
    let Some((start_x, start_y, end_x, end_y)) = canvas.clip(rect) else {
        return;
    };
    for py in start_y..end_y {
        let src_y = ((py - rect.y) as u32 * image_height / rect.height as u32).min(image_height - 1);
        for px in start_x..end_x {
            let src_x = ((px - rect.x) as u32 * image_width / rect.width as u32).min(image_width - 1);
            let offset = (src_y as usize * image_width as usize + src_x as usize) * 4;
            let color = [
                rgba[offset],
                rgba[offset + 1],
                rgba[offset + 2],
                rgba[offset + 3],
            ];
            put_pixel(frame, canvas, px, py, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Canvas = Canvas {
        width: 4,
        height: 3,
    };

    fn pixel(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
        let offset = (y * CANVAS.width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn fill_rect_is_clipped_to_canvas() {
        let mut frame = vec![0u8; 4 * 3 * 4];
        fill_rect(
            &mut frame,
            CANVAS,
            ScreenRect {
                x: -2,
                y: 1,
                width: 4,
                height: 10,
            },
            [9, 9, 9, 255],
        );
        assert_eq!(pixel(&frame, 0, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 1, 2), [9, 9, 9, 255]);
        assert_eq!(pixel(&frame, 2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn translucent_color_blends_with_destination() {
        let mut frame = vec![0u8; 4 * 3 * 4];
        clear(&mut frame, [200, 100, 0, 255]);
        put_pixel(&mut frame, CANVAS, 1, 1, [0, 0, 0, 128]);
        let blended = pixel(&frame, 1, 1);
        assert_eq!(blended, [99, 49, 0, 255]);
    }

    #[test]
    fn out_of_bounds_pixels_are_ignored() {
        let mut frame = vec![0u8; 4 * 3 * 4];
        put_pixel(&mut frame, CANVAS, -1, 0, [1, 1, 1, 255]);
        put_pixel(&mut frame, CANVAS, 4, 0, [1, 1, 1, 255]);
        put_pixel(&mut frame, CANVAS, 0, 3, [1, 1, 1, 255]);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn blit_stretches_single_pixel_image() {
        let mut frame = vec![0u8; 4 * 3 * 4];
        blit_scaled(
            &mut frame,
            CANVAS,
            ScreenRect {
                x: 0,
                y: 0,
                width: 2,
                height: 2,
            },
            1,
            1,
            &[5, 6, 7, 255],
        );
        assert_eq!(pixel(&frame, 0, 0), [5, 6, 7, 255]);
        assert_eq!(pixel(&frame, 1, 1), [5, 6, 7, 255]);
        assert_eq!(pixel(&frame, 2, 0), [0, 0, 0, 0]);
    }
}
