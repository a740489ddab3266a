//! Assembles the ordered filter chain of a room configuration.
//!
//! Stage ordering is fixed: resize, breathing scale+crop, brightness,
//! color balance, drift pan/zoom, vignette, infinite lift, quote
//! overlays, pixel-format normalization. Every stage is individually
//! toggleable; a stage whose signal folds to its neutral constant is not
//! emitted at all.

use std::path::{Path, PathBuf};

use roomloop_ir::signal::MotionPlan;
use roomloop_ir::{RoomConfig, Signal};

use crate::expr::{self, format_number};
use crate::graph::FilterGraph;

/// Bottom margin of quote overlays, in pixels.
const QUOTE_MARGIN_PX: u32 = 100;
/// Quote overlay font size, in pixels.
const QUOTE_FONT_SIZE: u32 = 48;
/// Quote overlay font color (warm off-white).
const QUOTE_FONT_COLOR: &str = "0xFFF8E7";

/// Builds a [`FilterGraph`] from a [`RoomConfig`].
pub struct GraphBuilder<'a> {
    config: &'a RoomConfig,
    font_path: Option<PathBuf>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a RoomConfig) -> Self {
        Self {
            config,
            font_path: None,
        }
    }

    /// Use a specific font file for quote overlays. Without one, drawtext
    /// falls back to the encoder's font discovery.
    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    /// Build the ordered stage chain.
    pub fn build(&self) -> FilterGraph {
        let (width, height) = self.config.dimensions();
        let plan = MotionPlan::for_config(self.config);
        let mut graph = FilterGraph::new();

        // 1. Initial resize to the target resolution.
        graph.push("resize", format!("scale={}:{}", width, height));

        // 2. Breathing: periodic scale plus a matching center-crop so the
        // output dimensions stay constant through the oscillation.
        if !plan.scale.is_const(1.0) {
            let scale_expr = expr::render(&plan.scale);
            graph.push(
                "breathe",
                format!(
                    "scale=w='iw*{expr}':h='ih*{expr}':eval=frame,\
                     crop={w}:{h}:(iw-ow)/2:(ih-oh)/2",
                    expr = scale_expr,
                    w = width,
                    h = height
                ),
            );
        }

        // 3. Brightness from the flicker/pulse signal. FFmpeg's eq
        // brightness is an additive offset with 0 neutral, so the stage
        // carries the signal minus 1.
        if !plan.brightness.is_const(1.0) {
            let offset = plan.brightness.clone().sub(Signal::constant(1.0));
            let stage = match offset.as_const() {
                Some(c) => format!("eq=brightness={}:contrast=1.0", format_number(c)),
                None => format!(
                    "eq=brightness='{}':contrast=1.0:eval=frame",
                    expr::render(&offset)
                ),
            };
            graph.push("brightness", stage);
        }

        // 4. Warmth color balance.
        if !plan.warmth.is_neutral() {
            graph.push(
                "warmth",
                format!(
                    "colorbalance=rs={}:gs={}:bs={}",
                    format_number(plan.warmth.red),
                    format_number(plan.warmth.green),
                    format_number(plan.warmth.blue)
                ),
            );
        }

        // 5. Ambient drift as a moving zoom window. zoompan exposes time
        // as the output frame counter, so signals are rendered against
        // `on/fps` instead of `t`.
        let drifting = !plan.drift_x.is_const(0.0)
            || !plan.drift_y.is_const(0.0)
            || !plan.zoom.is_const(1.0);
        if drifting {
            let time = format!("(on/{})", format_number(self.config.fps as f64));
            let z = expr::render_with(&plan.zoom, &time);
            let dx = expr::render_with(&plan.drift_x, &time);
            let dy = expr::render_with(&plan.drift_y, &time);
            graph.push(
                "drift",
                format!(
                    "zoompan=z='{z}':\
                     x='iw/2-(iw/zoom/2)+iw*{dx}':\
                     y='ih/2-(ih/zoom/2)+ih*{dy}':\
                     d=1:s={w}x{h}:fps={fps}",
                    z = z,
                    dx = dx,
                    dy = dy,
                    w = width,
                    h = height,
                    fps = self.config.fps
                ),
            );
        }

        // 6. Vignette. The weight maps onto the filter's angle so that
        // full strength lands on PI/4.
        if plan.vignette > 0.0 {
            graph.push(
                "vignette",
                format!("vignette=angle=PI*{}", format_number(plan.vignette / 2.0)),
            );
        }

        // 7. Infinite lift: double-height render, then a viewport whose
        // offset advances linearly and wraps with mod(). A reset-based
        // offset would jump at the seam.
        if let Some(lift) = &plan.lift {
            graph.push(
                "lift-stretch",
                format!("scale={}:{}", width, height * 2),
            );
            graph.push(
                "lift-crop",
                format!("crop={}:{}:0:'{}'", width, height, expr::render(lift)),
            );
        }

        // 8. Timed quote overlays.
        if let Some(quotes) = &self.config.quotes {
            for window in quotes.windows(self.config.duration.as_seconds()) {
                graph.push(
                    format!("quote-{}", window.index),
                    self.drawtext_stage(&window.text, window.start, window.end),
                );
            }
        }

        // 9. Pixel-format normalization for encoder compatibility.
        graph.push("pixfmt", "format=yuv420p");

        graph
    }

    fn drawtext_stage(&self, text: &str, start: f64, end: f64) -> String {
        let fontfile = self
            .font_path
            .as_deref()
            .map(|p: &Path| format!("fontfile={}:", p.display()))
            .unwrap_or_default();
        format!(
            "drawtext=text='{text}':{fontfile}\
             fontsize={size}:fontcolor={color}:\
             x=(w-text_w)/2:y=h-th-{margin}:\
             shadowcolor=0x000000:shadowx=2:shadowy=2:\
             alpha='clip(min(t-{start}\\,{end}-t),0,1)':\
             enable='between(t\\,{start}\\,{end})'",
            text = escape_drawtext(text),
            fontfile = fontfile,
            size = QUOTE_FONT_SIZE,
            color = QUOTE_FONT_COLOR,
            margin = QUOTE_MARGIN_PX,
            start = format_number(start),
            end = format_number(end),
        )
    }
}

/// Escape text for a drawtext `text=` argument inside a filter graph.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\\\'")
        .replace(':', "\\:")
        .replace(',', "\\,")
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomloop_ir::theme::{
        BreathingParams, DarkAcademiaParams, InfiniteLiftParams,
    };
    use roomloop_ir::{QuoteOverlay, Theme};
    use roomloop_core::{Duration, Resolution};

    fn stage_names(graph: &FilterGraph) -> Vec<&str> {
        graph.stages().iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_breathing_graph_stages() {
        let config = RoomConfig::new(
            "room.jpg",
            Duration::from_seconds(10.0),
            Theme::Breathing(BreathingParams {
                breath_duration: 4.0,
                breath_intensity: 0.02,
                brightness_pulse: 0.5,
                warmth_shift: 0.8,
            }),
        );
        let graph = GraphBuilder::new(&config).build();
        assert_eq!(
            stage_names(&graph),
            vec!["resize", "breathe", "brightness", "warmth", "pixfmt"]
        );
        let breathe = &graph.stage("breathe").unwrap().filter;
        assert!(breathe.contains("crop=1920:1080:(iw-ow)/2:(ih-oh)/2"));
        assert!(breathe.contains("sin("));
    }

    #[test]
    fn test_neutral_stages_are_omitted() {
        // Zero flicker, neutral warmth, no vignette, no motion: the chain
        // is just resize + format.
        let config = RoomConfig::new(
            "room.jpg",
            Duration::from_seconds(10.0),
            Theme::DarkAcademia(DarkAcademiaParams {
                flicker_intensity: 0.0,
                warmth_shift: 0.5,
                vignette_strength: 0.0,
                dust_particles: false,
                ambient_motion: 0.0,
            }),
        );
        let graph = GraphBuilder::new(&config).build();
        assert_eq!(stage_names(&graph), vec!["resize", "pixfmt"]);
    }

    #[test]
    fn test_dark_academia_full_chain() {
        let config = RoomConfig::new(
            "library.jpg",
            Duration::from_seconds(10.0),
            Theme::DarkAcademia(DarkAcademiaParams::default()),
        );
        let graph = GraphBuilder::new(&config).build();
        assert_eq!(
            stage_names(&graph),
            vec!["resize", "brightness", "warmth", "drift", "vignette", "pixfmt"]
        );
        let brightness = &graph.stage("brightness").unwrap().filter;
        assert!(brightness.contains("contrast=1.0"));
        assert!(brightness.contains("eval=frame"));
        let drift = &graph.stage("drift").unwrap().filter;
        assert!(drift.contains("zoompan"));
        assert!(drift.contains("(on/30.0)"));
    }

    #[test]
    fn test_lift_graph_uses_modulo_crop() {
        let config = RoomConfig::new(
            "scifi-room.jpg",
            Duration::from_seconds(10.0),
            Theme::InfiniteLift(InfiniteLiftParams {
                lift_speed: 0.03,
                brightness_boost: 0.1,
            }),
        )
        .with_resolution(Resolution::Hd1080);
        let graph = GraphBuilder::new(&config).build();
        assert_eq!(
            stage_names(&graph),
            vec!["resize", "brightness", "lift-stretch", "lift-crop", "pixfmt"]
        );
        assert_eq!(
            graph.stage("lift-stretch").unwrap().filter,
            "scale=1920:2160"
        );
        let crop = &graph.stage("lift-crop").unwrap().filter;
        assert!(crop.starts_with("crop=1920:1080:0:"));
        assert!(crop.contains("mod("), "lift crop must wrap with mod(): {}", crop);
        // Constant boost folds to a plain additive offset.
        assert_eq!(
            graph.stage("brightness").unwrap().filter,
            "eq=brightness=0.1:contrast=1.0"
        );
    }

    #[test]
    fn test_quote_stages_have_disjoint_windows() {
        let config = RoomConfig::new(
            "library.jpg",
            Duration::from_seconds(60.0),
            Theme::DarkAcademia(DarkAcademiaParams::default()),
        )
        .with_quotes(QuoteOverlay::new(vec![
            "Memento mori".to_string(),
            "Amor fati".to_string(),
        ]));
        let graph = GraphBuilder::new(&config).build();
        let q0 = &graph.stage("quote-0").unwrap().filter;
        let q1 = &graph.stage("quote-1").unwrap().filter;
        assert!(q0.contains("between(t\\,0.0\\,5.0)"));
        assert!(q1.contains("between(t\\,30.0\\,35.0)"));
        assert!(q0.contains("x=(w-text_w)/2"));
        // Quotes render after the theme stages, before format.
        let names = stage_names(&graph);
        assert_eq!(names.last().copied(), Some("pixfmt"));
        assert!(names.contains(&"quote-0"));
    }

    #[test]
    fn test_quote_text_is_escaped() {
        let config = RoomConfig::new(
            "library.jpg",
            Duration::from_seconds(60.0),
            Theme::DarkAcademia(DarkAcademiaParams::default()),
        )
        .with_quotes(QuoteOverlay::new(vec!["it's all: one, loop".to_string()]));
        let graph = GraphBuilder::new(&config).build();
        let q = &graph.stage("quote-0").unwrap().filter;
        assert!(q.contains("it\\\\'s"));
        assert!(q.contains("all\\:"));
        assert!(q.contains("one\\,"));
    }

    #[test]
    fn test_font_path_is_forwarded() {
        let config = RoomConfig::new(
            "library.jpg",
            Duration::from_seconds(60.0),
            Theme::DarkAcademia(DarkAcademiaParams::default()),
        )
        .with_quotes(QuoteOverlay::new(vec!["quiet".to_string()]));
        let graph = GraphBuilder::new(&config)
            .with_font("assets/fonts/EBGaramond.ttf")
            .build();
        let q = &graph.stage("quote-0").unwrap().filter;
        assert!(q.contains("fontfile=assets/fonts/EBGaramond.ttf:"));
    }

    #[test]
    fn test_graph_is_deterministic() {
        let config = RoomConfig::new(
            "room.jpg",
            Duration::from_seconds(10.0),
            Theme::Breathing(BreathingParams::default()),
        );
        let a = GraphBuilder::new(&config).build();
        let b = GraphBuilder::new(&config).build();
        assert_eq!(a, b);
        assert_eq!(a.to_filter_complex(), b.to_filter_complex());
    }
}
