//! The interactive preview session.
//!
//! A projection of (configuration, elapsed time) onto a drawable frame.
//! Each tick does a bounded amount of work: sample the signal library,
//! redraw the base image under the drift/zoom transform, apply the
//! brightness/warmth/vignette stack, advance and draw dust, and draw any
//! active quote. Dropping the session is cancellation; nothing persists.

use std::time::Instant;

use roomloop_core::{Color, FrameBuffer};
use roomloop_ir::signal::MotionPlan;
use roomloop_ir::timeline::sample;
use roomloop_ir::{RoomConfig, Theme};

use crate::dust::DustField;
use crate::effects;
use crate::image_loader::resize_to_cover;
use crate::text::TextRenderer;

/// Quote overlay color used by both paths (warm off-white).
const QUOTE_COLOR: &str = "#FFF8E7";
/// Seed for the dust field; previews only need stable randomness.
const DUST_SEED: u64 = 0xD057;

/// An interactive preview of one room configuration.
pub struct PreviewSession {
    config: RoomConfig,
    plan: MotionPlan,
    base: FrameBuffer,
    width: u32,
    height: u32,
    dust: Option<DustField>,
    text: Option<TextRenderer>,
    quote_cache: Option<(usize, FrameBuffer)>,
    started: Instant,
}

impl PreviewSession {
    /// Create a session drawing onto a `width` x `height` canvas.
    ///
    /// The background is resized once to cover the canvas; per-frame work
    /// only transforms that cached copy.
    pub fn new(config: RoomConfig, background: &FrameBuffer, width: u32, height: u32) -> Self {
        let base = resize_to_cover(background, width, height);
        let plan = MotionPlan::for_config(&config);
        let dust = dust_for(&config, width, height);
        Self {
            config,
            plan,
            base,
            width,
            height,
            dust,
            text: None,
            quote_cache: None,
            started: Instant::now(),
        }
    }

    /// Attach a text renderer for quote overlays. Without one, quotes are
    /// skipped (they are an optional resource).
    pub fn set_font(&mut self, text: TextRenderer) {
        self.text = Some(text);
        self.quote_cache = None;
    }

    /// Replace the configuration.
    ///
    /// Derived state is regenerated, never patched; switching themes also
    /// restarts the session's time origin and reseeds the dust field.
    pub fn set_config(&mut self, config: RoomConfig) {
        let theme_changed =
            config.theme.template_name() != self.config.theme.template_name();
        self.plan = MotionPlan::for_config(&config);
        self.dust = dust_for(&config, self.width, self.height);
        self.quote_cache = None;
        self.config = config;
        if theme_changed {
            self.started = Instant::now();
        }
    }

    /// Seconds since the session (or current theme) started.
    pub fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// True when this session integrates dust particles.
    pub fn dust_enabled(&self) -> bool {
        self.dust.is_some()
    }

    /// Render the frame for the current wall-clock instant.
    pub fn tick(&mut self) -> FrameBuffer {
        self.frame_at(self.elapsed())
    }

    /// Render the frame at an explicit elapsed time, in seconds.
    pub fn frame_at(&mut self, t: f64) -> FrameBuffer {
        let frame = sample(&self.plan, t);
        let mut out = FrameBuffer::new(self.width, self.height);

        if let Some(lift) = &self.plan.lift {
            // The lift signal is expressed in output-resolution pixels;
            // rescale its phase onto the preview canvas.
            let (_, out_h) = self.config.dimensions();
            let fraction = lift.eval(t) / (2.0 * out_h as f64);
            effects::blit_lifted(&mut out, &self.base, fraction * 2.0 * self.height as f64);
        } else {
            effects::blit_transformed(
                &mut out,
                &self.base,
                frame.scale * frame.zoom,
                frame.drift_x * self.width as f64,
                frame.drift_y * self.height as f64,
            );
        }

        effects::apply_brightness(&mut out, frame.brightness);
        effects::apply_color_balance(&mut out, &self.plan.warmth);
        effects::apply_vignette(&mut out, frame.vignette);

        if let Some(dust) = &mut self.dust {
            dust.advance();
            dust.draw(&mut out);
        }

        self.draw_active_quote(&mut out, t);
        out
    }

    fn draw_active_quote(&mut self, out: &mut FrameBuffer, t: f64) {
        let Some(quotes) = self.config.quotes.clone() else {
            return;
        };
        let Some(text) = &self.text else {
            return;
        };
        let total = self.config.duration.as_seconds();
        let Some((index, alpha)) = quotes.active_at(t, total) else {
            return;
        };

        let cache_hit = matches!(&self.quote_cache, Some((cached, _)) if *cached == index);
        if !cache_hit {
            let font_size = 48.0 * self.height as f32 / 1080.0;
            let color = Color::from_hex(QUOTE_COLOR).unwrap_or(Color::WHITE);
            let fb = text.render_wrapped(
                &quotes.quotes[index],
                font_size,
                &color,
                (self.width as f64 * 0.8) as u32,
            );
            self.quote_cache = Some((index, fb));
        }
        let Some((_, cached)) = &self.quote_cache else {
            return;
        };

        // Fade by scaling the rasterized glyph alpha.
        let mut faded = cached.clone();
        for px in faded.data.chunks_exact_mut(4) {
            px[3] = (px[3] as f64 * alpha) as u8;
        }

        let margin = (100.0 * self.height as f64 / 1080.0) as i32;
        let x = (self.width as i32 - faded.width as i32) / 2;
        let y = self.height as i32 - faded.height as i32 - margin;
        out.composite_over(&faded, x, y);
    }
}

fn dust_for(config: &RoomConfig, width: u32, height: u32) -> Option<DustField> {
    match &config.theme {
        Theme::DarkAcademia(p) if p.dust_particles => {
            Some(DustField::new(width, height, DUST_SEED))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomloop_core::Duration;
    use roomloop_ir::theme::{BreathingParams, DarkAcademiaParams, InfiniteLiftParams};

    fn white_background() -> FrameBuffer {
        FrameBuffer::solid(64, 64, &Color::WHITE)
    }

    fn breathing_config() -> RoomConfig {
        RoomConfig::new(
            "room.jpg",
            Duration::from_seconds(10.0),
            Theme::Breathing(BreathingParams::default()),
        )
    }

    #[test]
    fn test_frame_has_canvas_size() {
        let mut session = PreviewSession::new(breathing_config(), &white_background(), 32, 18);
        let frame = session.frame_at(0.0);
        assert_eq!((frame.width, frame.height), (32, 18));
        let center = frame.get_pixel(16, 9).unwrap();
        assert!(center[0] > 0, "base image must be visible");
    }

    #[test]
    fn test_identical_sessions_agree() {
        let mut a = PreviewSession::new(breathing_config(), &white_background(), 32, 18);
        let mut b = PreviewSession::new(breathing_config(), &white_background(), 32, 18);
        assert_eq!(a.frame_at(1.25), b.frame_at(1.25));
    }

    #[test]
    fn test_dust_only_for_dark_academia() {
        let session = PreviewSession::new(breathing_config(), &white_background(), 32, 18);
        assert!(!session.dust_enabled());

        let dusty = RoomConfig::new(
            "library.jpg",
            Duration::from_seconds(10.0),
            Theme::DarkAcademia(DarkAcademiaParams::default()),
        );
        let session = PreviewSession::new(dusty, &white_background(), 32, 18);
        assert!(session.dust_enabled());
    }

    #[test]
    fn test_set_config_toggles_dust() {
        let mut session = PreviewSession::new(breathing_config(), &white_background(), 32, 18);
        let mut params = DarkAcademiaParams::default();
        params.dust_particles = false;
        session.set_config(RoomConfig::new(
            "library.jpg",
            Duration::from_seconds(10.0),
            Theme::DarkAcademia(params),
        ));
        assert!(!session.dust_enabled());
    }

    #[test]
    fn test_lift_preview_loops_exactly() {
        // Lift speed chosen so one doubled-height traversal is an exact
        // number of seconds in floating point.
        let config = RoomConfig::new(
            "scifi.jpg",
            Duration::from_seconds(10.0),
            Theme::InfiniteLift(InfiniteLiftParams {
                lift_speed: 0.03125,
                brightness_boost: 0.1,
            }),
        );
        // Gradient background so vertical motion is observable.
        let mut background = FrameBuffer::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                background.set_pixel(x, y, [(y * 30) as u8, 0, 0, 255]);
            }
        }
        let mut session = PreviewSession::new(config.clone(), &background, 8, 8);

        // One full doubled-height traversal of the output resolution.
        let (_, out_h) = config.dimensions();
        let speed = match &config.theme {
            Theme::InfiniteLift(p) => p.lift_speed * out_h as f64,
            _ => unreachable!(),
        };
        let period = 2.0 * out_h as f64 / speed;
        assert_eq!(session.frame_at(0.0), session.frame_at(period));
    }

    #[test]
    fn test_quotes_skipped_without_font() {
        let mut config = breathing_config();
        config.quotes = Some(roomloop_ir::QuoteOverlay::new(vec!["hello".into()]));
        let mut session = PreviewSession::new(config, &white_background(), 32, 18);
        // No font attached: must not panic, just draw the room.
        let frame = session.frame_at(1.0);
        assert_eq!((frame.width, frame.height), (32, 18));
    }
}
