//! Alpha-blend compositing of the watermark grid onto a base image.
//!
//! Each placement blends the scaled watermark onto the canvas with the
//! Porter-Duff "over" operator, clipped at the right and bottom edges.

use image::{Rgba, RgbaImage};

/// Blend the watermark onto the canvas at every placement.
///
/// `opacity` is applied on top of the watermark's own alpha channel and is
/// clamped to `[0.0, 1.0]`. Placements partially outside the canvas are
/// clipped, not skipped.
pub fn overlay_tiles(
    canvas: &mut RgbaImage,
    watermark: &RgbaImage,
    placements: &[(u32, u32)],
    opacity: f32,
) {
    for &(x, y) in placements {
        overlay_at(canvas, watermark, x, y, opacity);
    }
}

/// Blend a single watermark placement with its top-left corner at `(x, y)`.
fn overlay_at(canvas: &mut RgbaImage, watermark: &RgbaImage, x: u32, y: u32, opacity: f32) {
    let visible_w = watermark.width().min(canvas.width().saturating_sub(x));
    let visible_h = watermark.height().min(canvas.height().saturating_sub(y));

    for wy in 0..visible_h {
        for wx in 0..visible_w {
            let over = watermark.get_pixel(wx, wy);
            let under = canvas.get_pixel(x + wx, y + wy);
            canvas.put_pixel(x + wx, y + wy, blend_over(*under, *over, opacity));
        }
    }
}

/// Porter-Duff "over" with an extra opacity factor on the foreground.
fn blend_over(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |fg: u8, bg: u8| -> u8 {
        let fg = fg as f32 / 255.0;
        let bg = bg as f32 / 255.0;
        let out = (fg * fg_alpha + bg * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (out * 255.0).clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(foreground[0], background[0]),
        channel(foreground[1], background[1]),
        channel(foreground[2], background[2]),
        (out_alpha * 255.0) as u8,
    ])
}
