//! CPU per-pixel effects for the preview path.
//!
//! Each function mirrors one batch-path filter stage so the interactive
//! preview tracks what the encoder will produce.

use roomloop_core::FrameBuffer;
use roomloop_ir::ColorBalance;

/// Multiply the RGB channels by a brightness factor (1.0 is neutral).
pub fn apply_brightness(fb: &mut FrameBuffer, factor: f64) {
    if (factor - 1.0).abs() < 1e-9 {
        return;
    }
    let factor = factor.max(0.0);
    for px in fb.data.chunks_exact_mut(4) {
        for c in 0..3 {
            px[c] = ((px[c] as f64) * factor).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Shift the color channels by the warmth balance biases.
///
/// Approximates the encoder's shadow-weighted color balance with a flat
/// per-channel shift at half scale.
pub fn apply_color_balance(fb: &mut FrameBuffer, balance: &ColorBalance) {
    if balance.is_neutral() {
        return;
    }
    let shifts = [
        balance.red * 255.0 * 0.5,
        balance.green * 255.0 * 0.5,
        balance.blue * 255.0 * 0.5,
    ];
    for px in fb.data.chunks_exact_mut(4) {
        for c in 0..3 {
            px[c] = ((px[c] as f64) + shifts[c]).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Darken toward the corners with a centered radial gradient.
///
/// `alpha` is the overlay opacity at the gradient's outer edge; the
/// falloff starts at the center and reaches full strength at 0.7x the
/// larger canvas dimension.
pub fn apply_vignette(fb: &mut FrameBuffer, alpha: f64) {
    if alpha <= 0.0 {
        return;
    }
    let alpha = alpha.min(1.0);
    let cx = fb.width as f64 / 2.0;
    let cy = fb.height as f64 / 2.0;
    let radius = (fb.width.max(fb.height) as f64) * 0.7;
    let width = fb.width as usize;

    for y in 0..fb.height as usize {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let d = (dx * dx + dy * dy).sqrt() / radius;
            let darken = 1.0 - (d.min(1.0) * alpha);
            let offset = (y * width + x) * 4;
            for c in 0..3 {
                fb.data[offset + c] = ((fb.data[offset + c] as f64) * darken) as u8;
            }
        }
    }
}

/// Draw `src` into `dst` scaled about the canvas center and offset by a
/// drift, sampling nearest-neighbor. `src` must already cover the canvas.
pub fn blit_transformed(
    dst: &mut FrameBuffer,
    src: &FrameBuffer,
    scale: f64,
    drift_x_px: f64,
    drift_y_px: f64,
) {
    let scale = scale.max(0.01);
    let cx = dst.width as f64 / 2.0;
    let cy = dst.height as f64 / 2.0;

    for y in 0..dst.height {
        for x in 0..dst.width {
            // Inverse transform: un-drift, then un-zoom about the center.
            let sx = (x as f64 - cx - drift_x_px) / scale + cx;
            let sy = (y as f64 - cy - drift_y_px) / scale + cy;
            if sx < 0.0 || sy < 0.0 {
                continue;
            }
            let (sx, sy) = (sx as u32, sy as u32);
            if let Some(pixel) = src.get_pixel(sx.min(src.width - 1), sy.min(src.height - 1)) {
                dst.set_pixel(x, y, pixel);
            }
        }
    }
}

/// Draw `src` stretched to double the canvas height, cropped to a
/// viewport whose top edge sits at `offset_px` inside the doubled frame,
/// wrapping toroidally. This is the preview half of the seamless lift.
pub fn blit_lifted(dst: &mut FrameBuffer, src: &FrameBuffer, offset_px: f64) {
    let double_h = dst.height as f64 * 2.0;
    let offset = offset_px.rem_euclid(double_h);

    for y in 0..dst.height {
        let tall_y = (y as f64 + offset).rem_euclid(double_h);
        // The doubled frame is the source stretched 2x vertically.
        let src_y = ((tall_y / double_h) * src.height as f64) as u32;
        for x in 0..dst.width {
            let src_x = ((x as f64 / dst.width as f64) * src.width as f64) as u32;
            if let Some(pixel) = src.get_pixel(
                src_x.min(src.width - 1),
                src_y.min(src.height - 1),
            ) {
                dst.set_pixel(x, y, pixel);
            }
        }
    }
}
