//! Quote text rasterization.
//! Uses fontdue for CPU-based font rasterization. Fonts are loaded from
//! disk; preview sessions without a configured font simply skip text.

use std::path::Path;

use fontdue::{Font, FontSettings};

use roomloop_core::{Color, FrameBuffer, RoomloopError, RoomloopResult};

/// Text renderer — rasterizes quote lines into a FrameBuffer.
pub struct TextRenderer {
    font: Font,
}

impl TextRenderer {
    /// Load the renderer's font from a TTF/OTF file.
    pub fn from_file(path: &Path) -> RoomloopResult<Self> {
        let data = std::fs::read(path)
            .map_err(|e| RoomloopError::asset(format!("failed to read font: {}", e), path))?;
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
            RoomloopError::asset(format!("failed to parse font: {}", e), path)
        })?;
        Ok(Self { font })
    }

    /// Render a quote, word-wrapped to `max_width` and center-aligned.
    ///
    /// Returns a buffer sized to fit the wrapped text.
    pub fn render_wrapped(
        &self,
        text: &str,
        font_size: f32,
        color: &Color,
        max_width: u32,
    ) -> FrameBuffer {
        let lines = self.wrap(text, font_size, max_width as i32);
        if lines.is_empty() {
            return FrameBuffer::new(1, 1);
        }

        let line_spacing = (font_size * 1.3) as i32;
        let mut measures = Vec::with_capacity(lines.len());
        let mut width: i32 = 0;
        for line in &lines {
            let m = self.measure_line(line, font_size);
            width = width.max(m.width);
            measures.push(m);
        }
        let height = line_spacing * (lines.len() as i32 - 1)
            + measures.last().map_or(0, |m| m.ascent + m.descent);

        let mut fb = FrameBuffer::new(width.max(1) as u32, height.max(1) as u32);
        let rgba = color.to_rgba8();

        let mut y_offset = 0;
        for (line, measure) in lines.iter().zip(&measures) {
            let x_offset = (width - measure.width) / 2;
            self.render_line_into(&mut fb, line, font_size, rgba, x_offset, y_offset, measure.ascent);
            y_offset += line_spacing;
        }
        fb
    }

    /// Greedy word wrap against the measured line width.
    fn wrap(&self, text: &str, font_size: f32, max_width: i32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if !current.is_empty() && self.measure_line(&candidate, font_size).width > max_width {
                lines.push(current);
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Measure a single line of text.
    fn measure_line(&self, text: &str, font_size: f32) -> LineMeasure {
        let mut total_width: i32 = 0;
        let mut max_ascent: i32 = 0;
        let mut max_descent: i32 = 0;

        for ch in text.chars() {
            let (metrics, _) = self.font.rasterize(ch, font_size);
            let ascent = metrics.height as i32 + metrics.ymin;
            let descent = -metrics.ymin;
            max_ascent = max_ascent.max(ascent);
            max_descent = max_descent.max(descent);
            total_width += metrics.advance_width as i32;
        }

        LineMeasure {
            width: total_width,
            ascent: max_ascent,
            descent: max_descent,
        }
    }

    /// Render a single line of text into an existing FrameBuffer.
    fn render_line_into(
        &self,
        fb: &mut FrameBuffer,
        text: &str,
        font_size: f32,
        color_rgba: [u8; 4],
        x_offset: i32,
        y_offset: i32,
        line_ascent: i32,
    ) {
        let [r, g, b, a] = color_rgba;
        let mut cursor_x: i32 = x_offset;

        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, font_size);
            let glyph_x = cursor_x + metrics.xmin;
            let glyph_y = y_offset + line_ascent - (metrics.height as i32 + metrics.ymin);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let px = glyph_x + gx as i32;
                    let py = glyph_y + gy as i32;
                    if px >= 0 && px < fb.width as i32 && py >= 0 && py < fb.height as i32 {
                        let glyph_alpha = (coverage as f32 / 255.0) * (a as f32 / 255.0);
                        fb.set_pixel(px as u32, py as u32, [r, g, b, (glyph_alpha * 255.0) as u8]);
                    }
                }
            }

            cursor_x += metrics.advance_width as i32;
        }
    }
}

/// Measurements for a single line of text.
#[derive(Debug, Clone)]
struct LineMeasure {
    width: i32,
    ascent: i32,
    descent: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_file_errors() {
        let result = TextRenderer::from_file(Path::new("/nonexistent/font.ttf"));
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_font_bytes_error() {
        let path = std::env::temp_dir().join("roomloop-not-a-font.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let result = TextRenderer::from_file(&path);
        assert!(result.is_err());
        let _ = std::fs::remove_file(&path);
    }
}
