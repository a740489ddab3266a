use serde::{Deserialize, Serialize};

/// Settings for the external FFmpeg encoder invocation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncoderConfig {
    /// Path to the ffmpeg binary. Empty means "resolve from PATH".
    pub ffmpeg_path: String,
    pub preset: String,
    pub crf: u32,
    pub audio_bitrate: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: String::new(),
            preset: "medium".to_string(),
            crf: 23,
            audio_bitrate: "192k".to_string(),
        }
    }
}

/// Credentials and model ids for the generation providers.
///
/// Keys left empty are filled from the environment (`RUNWARE_API_KEY`,
/// `FAL_KEY`) by the CLI before any provider call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    pub runware_api_key: String,
    pub fal_api_key: String,
    /// Image model used for background generation (e.g. "runware:111@1").
    pub image_model: String,
    /// Primary motion model (short clips).
    pub motion_model_primary: String,
    /// Alternate motion model (long clips).
    pub motion_model_alternate: String,
    /// Clip durations at or above this many seconds route to the alternate
    /// motion provider.
    pub motion_duration_threshold: f64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            runware_api_key: String::new(),
            fal_api_key: String::new(),
            image_model: String::new(),
            motion_model_primary: String::new(),
            motion_model_alternate: String::new(),
            motion_duration_threshold: 10.0,
        }
    }
}

/// Locations of bundled assets.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetsConfig {
    /// Directory holding room background images.
    pub rooms_dir: String,
    /// Directory holding the built-in audio tracks.
    pub audio_dir: String,
    /// TTF font used for preview quote overlays; empty disables text.
    pub font_path: String,
    /// Cache directory for generated assets.
    pub cache_dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            rooms_dir: "assets/rooms".to_string(),
            audio_dir: "assets/audio".to_string(),
            font_path: String::new(),
            cache_dir: "~/.roomloop/cache".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RoomloopConfig {
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

impl RoomloopConfig {
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: RoomloopConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
