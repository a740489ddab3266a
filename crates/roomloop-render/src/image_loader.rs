//! Image loading module.
//! Decodes PNG, JPEG, WebP, and other formats into FrameBuffers.

use std::path::Path;

use roomloop_core::{FrameBuffer, RoomloopError};

/// Load an image file and convert it to a FrameBuffer.
pub fn load_image(path: &Path) -> Result<FrameBuffer, RoomloopError> {
    let img = image::open(path).map_err(|e| {
        RoomloopError::asset(
            format!("failed to load image '{}': {}", path.display(), e),
            path,
        )
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut fb = FrameBuffer::new(width, height);
    fb.data = rgba.into_raw();

    Ok(fb)
}

/// Resize an image to cover the given canvas, center-cropping whatever
/// spills over (the background must fill the room edge to edge).
pub fn resize_to_cover(fb: &FrameBuffer, width: u32, height: u32) -> FrameBuffer {
    if fb.width == width && fb.height == height {
        return fb.clone();
    }
    if fb.width == 0 || fb.height == 0 || width == 0 || height == 0 {
        return FrameBuffer::new(width, height);
    }

    let scale_x = width as f64 / fb.width as f64;
    let scale_y = height as f64 / fb.height as f64;
    let scale = scale_x.max(scale_y);

    // Center of the source region that survives the crop.
    let crop_w = width as f64 / scale;
    let crop_h = height as f64 / scale;
    let off_x = (fb.width as f64 - crop_w) / 2.0;
    let off_y = (fb.height as f64 - crop_h) / 2.0;

    let mut out = FrameBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let src_x = (off_x + x as f64 / scale) as u32;
            let src_y = (off_y + y as f64 / scale) as u32;
            if let Some(pixel) =
                fb.get_pixel(src_x.min(fb.width - 1), src_y.min(fb.height - 1))
            {
                out.set_pixel(x, y, pixel);
            }
        }
    }
    out
}
