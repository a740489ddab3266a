use serde::{Deserialize, Serialize};

use crate::signal::MotionPlan;
use crate::theme::RoomConfig;

/// The fully-resolved visual parameters of one output frame.
///
/// Frames are immutable once generated; a configuration change regenerates
/// the whole sequence instead of patching it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineFrame {
    /// Frame time in seconds.
    pub time: f64,
    /// Frame scale multiplier.
    pub scale: f64,
    /// Brightness multiplier.
    pub brightness: f64,
    /// Red-channel warmth bias (the other channels derive from it via the
    /// shared color balance).
    pub warmth: f64,
    /// Horizontal drift, fraction of frame width.
    pub drift_x: f64,
    /// Vertical drift, fraction of frame height.
    pub drift_y: f64,
    /// Zoom factor.
    pub zoom: f64,
    /// Vignette overlay alpha.
    pub vignette: f64,
}

/// A discrete, frame-indexed sampling of a configuration's motion signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Frame rate the timeline was sampled at.
    pub fps: u32,
    /// One entry per output frame, in order.
    pub frames: Vec<TimelineFrame>,
}

impl Timeline {
    /// Materialize the full timeline of a configuration.
    ///
    /// Pure and deterministic: the same configuration always yields an
    /// identical sequence. A duration shorter than one frame period yields
    /// an empty (but valid) timeline.
    pub fn generate(config: &RoomConfig) -> Timeline {
        let plan = MotionPlan::for_config(config);
        let frames = (0..config.total_frames())
            .map(|i| sample(&plan, i as f64 / config.fps as f64))
            .collect();
        Timeline {
            fps: config.fps,
            frames,
        }
    }

    /// Streaming variant: iterate frames without materializing the whole
    /// sequence (hours of output at 30 fps add up).
    pub fn frames_iter(config: &RoomConfig) -> impl Iterator<Item = TimelineFrame> {
        let plan = MotionPlan::for_config(config);
        let fps = config.fps as f64;
        (0..config.total_frames()).map(move |i| sample(&plan, i as f64 / fps))
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when the timeline has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Evaluate the motion plan at an arbitrary time.
pub fn sample(plan: &MotionPlan, t: f64) -> TimelineFrame {
    TimelineFrame {
        time: t,
        scale: plan.scale.eval(t),
        brightness: plan.brightness.eval(t),
        warmth: plan.warmth.red,
        drift_x: plan.drift_x.eval(t),
        drift_y: plan.drift_y.eval(t),
        zoom: plan.zoom.eval(t),
        vignette: plan.vignette,
    }
}
