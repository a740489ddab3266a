use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use roomloop_core::{Duration, Resolution, DEFAULT_FPS};

use crate::quote::QuoteOverlay;

/// Parameters for the breathing room theme: the whole frame slowly
/// inhales and exhales while the light pulses in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingParams {
    /// Seconds for one full inhale/exhale cycle.
    pub breath_duration: f64,
    /// Scale amount of the breathing oscillation (nominal 0.01–0.03).
    pub breath_intensity: f64,
    /// Brightness pulse intensity, 0–1.
    pub brightness_pulse: f64,
    /// Color temperature shift, 0–1 (0.5 is neutral).
    pub warmth_shift: f64,
}

impl Default for BreathingParams {
    fn default() -> Self {
        Self {
            breath_duration: 4.0,
            breath_intensity: 0.02,
            brightness_pulse: 0.5,
            warmth_shift: 0.5,
        }
    }
}

/// Parameters for the dark academia theme: candle flicker, warm grade,
/// vignette, floating dust, and a slow camera drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DarkAcademiaParams {
    /// Candle/lamp flicker intensity, 0–1.
    pub flicker_intensity: f64,
    /// Warm grade shift, 0–1 (0.5 is neutral).
    pub warmth_shift: f64,
    /// Vignette strength, 0–1.
    pub vignette_strength: f64,
    /// Floating dust particles toggle (preview only).
    pub dust_particles: bool,
    /// Subtle camera drift amount, 0–0.5.
    pub ambient_motion: f64,
}

impl Default for DarkAcademiaParams {
    fn default() -> Self {
        Self {
            flicker_intensity: 0.5,
            warmth_shift: 0.6,
            vignette_strength: 0.4,
            dust_particles: true,
            ambient_motion: 0.2,
        }
    }
}

/// Parameters for the infinite lift theme: a seamless, endlessly
/// repeating upward scroll through the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfiniteLiftParams {
    /// Upward scroll speed as a fraction of frame height per second
    /// (nominal 0.02–0.03).
    pub lift_speed: f64,
    /// Constant brightness boost applied to the whole frame.
    pub brightness_boost: f64,
}

impl Default for InfiniteLiftParams {
    fn default() -> Self {
        Self {
            lift_speed: 0.03,
            brightness_boost: 0.1,
        }
    }
}

/// Room theme — one variant per template, structurally similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "template", content = "params")]
pub enum Theme {
    #[serde(rename = "breathing-room")]
    Breathing(BreathingParams),
    #[serde(rename = "dark-academia-room")]
    DarkAcademia(DarkAcademiaParams),
    #[serde(rename = "infinite-lift")]
    InfiniteLift(InfiniteLiftParams),
}

impl Theme {
    /// Stable template name, matching the serialized tag.
    pub fn template_name(&self) -> &'static str {
        match self {
            Theme::Breathing(_) => "breathing-room",
            Theme::DarkAcademia(_) => "dark-academia-room",
            Theme::InfiniteLift(_) => "infinite-lift",
        }
    }
}

/// Where the audio bed comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AudioSource {
    /// A built-in track id (e.g. "brown_noise").
    Track(String),
    /// A user-supplied audio file.
    File(PathBuf),
}

/// The full declarative configuration of one room render.
///
/// A `RoomConfig` is the single input to both rendering paths. It is
/// immutable for the lifetime of a render; previews regenerate all derived
/// state when it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Static background image for the room.
    pub background_image: PathBuf,
    /// Requested total output length.
    pub duration: Duration,
    /// Output frame rate. Fixed at 30 for this system.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Output resolution.
    #[serde(default)]
    pub resolution: Resolution,
    /// Optional looped audio bed.
    #[serde(default)]
    pub audio: Option<AudioSource>,
    /// Optional timed quote overlays.
    #[serde(default)]
    pub quotes: Option<QuoteOverlay>,
    /// The room theme and its parameters.
    pub theme: Theme,
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

impl RoomConfig {
    /// Create a config with defaults for everything but the image, length
    /// and theme.
    pub fn new(background_image: impl Into<PathBuf>, duration: Duration, theme: Theme) -> Self {
        Self {
            background_image: background_image.into(),
            duration,
            fps: DEFAULT_FPS,
            resolution: Resolution::default(),
            audio: None,
            quotes: None,
            theme,
        }
    }

    /// Builder: set the output resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Builder: set the audio source.
    pub fn with_audio(mut self, audio: AudioSource) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Builder: set the quote overlay.
    pub fn with_quotes(mut self, quotes: QuoteOverlay) -> Self {
        self.quotes = Some(quotes);
        self
    }

    /// Number of output frames: `floor(duration_seconds * fps)`.
    pub fn total_frames(&self) -> u64 {
        self.duration.frame_count(self.fps as f64)
    }

    /// Output dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.resolution.dimensions()
    }
}
