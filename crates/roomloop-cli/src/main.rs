mod generation;
mod rooms;
mod tracks;

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use roomloop_core::RoomloopConfig;
use roomloop_encode::{CancelToken, FfmpegRenderer, RenderJob};
use roomloop_fx::GraphBuilder;
use roomloop_ir::{validate_config, AudioSource, RoomConfig, Timeline};
use roomloop_render::{image_loader, PreviewSession, TextRenderer};

/// Duration used for quick test renders, in seconds.
const TEST_RENDER_SECONDS: f64 = 10.0;

#[derive(Parser)]
#[command(
    name = "roomloop",
    version,
    about = "Roomloop — ambient looping room videos",
    long_about = "Roomloop turns a static room image and a small declarative theme\nconfiguration into hours of gently animated ambient video, with a live\npreview that matches the batch render frame for frame."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a room config (JSON) to an MP4 file
    Render {
        /// Path to the room config JSON
        #[arg()]
        config: PathBuf,

        /// Output file path (default: output/<template>.mp4)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Quick test render: clamp the duration to 10 seconds
        #[arg(long)]
        test: bool,
    },

    /// Render the first preview frames of a config to PNG files
    Preview {
        /// Path to the room config JSON
        #[arg()]
        config: PathBuf,

        /// Number of frames to write
        #[arg(long, default_value_t = 90)]
        frames: u32,

        /// Preview canvas width (height follows 16:9)
        #[arg(long, default_value_t = 960)]
        width: u32,

        /// Output directory
        #[arg(short, long, default_value = "preview")]
        out_dir: PathBuf,
    },

    /// Dump the sampled animation timeline of a config as JSON
    Timeline {
        /// Path to the room config JSON
        #[arg()]
        config: PathBuf,

        /// Cap the number of frames emitted
        #[arg(long)]
        frames: Option<u64>,
    },

    /// Print the FFmpeg filter graph a config compiles to
    Graph {
        /// Path to the room config JSON
        #[arg()]
        config: PathBuf,
    },

    /// Diagnose the FFmpeg installation and local setup
    Doctor,

    /// List the built-in audio tracks
    Tracks,

    /// List the built-in room presets
    Rooms,

    /// Generate a background image from a text prompt
    Generate {
        /// Image prompt
        #[arg()]
        prompt: String,

        /// Output image width
        #[arg(long, default_value_t = 1920)]
        width: u32,

        /// Output image height
        #[arg(long, default_value_t = 1080)]
        height: u32,

        /// Download the result into the asset cache
        #[arg(long)]
        download: bool,
    },

    /// Generate a motion clip from a still image URL
    Motion {
        /// Source image URL
        #[arg()]
        image_url: String,

        /// Motion intensity (0-1)
        #[arg(long, default_value_t = 0.4)]
        intensity: f64,

        /// Clip duration in seconds (5, 10 or 20)
        #[arg(long, default_value_t = 5.0)]
        duration: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    );
    subscriber.init();

    match cli.command {
        Commands::Render {
            config,
            output,
            test,
        } => cmd_render(&config, output, test),
        Commands::Preview {
            config,
            frames,
            width,
            out_dir,
        } => cmd_preview(&config, frames, width, &out_dir),
        Commands::Timeline { config, frames } => cmd_timeline(&config, frames),
        Commands::Graph { config } => cmd_graph(&config),
        Commands::Doctor => cmd_doctor(),
        Commands::Tracks => cmd_tracks(),
        Commands::Rooms => cmd_rooms(),
        Commands::Generate {
            prompt,
            width,
            height,
            download,
        } => cmd_generate(&prompt, width, height, download),
        Commands::Motion {
            image_url,
            intensity,
            duration,
        } => cmd_motion(&image_url, intensity, duration),
    }
}

/// Load roomloop.toml from the working directory, falling back to
/// defaults, and fill empty provider fields from the environment.
fn load_app_config() -> RoomloopConfig {
    let path = Path::new("roomloop.toml");
    let mut config = if path.exists() {
        match RoomloopConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to load roomloop.toml: {}; using defaults", e);
                RoomloopConfig::default()
            }
        }
    } else {
        RoomloopConfig::default()
    };

    let fill = |target: &mut String, var: &str| {
        if target.is_empty() {
            if let Ok(value) = std::env::var(var) {
                *target = value;
            }
        }
    };
    fill(&mut config.providers.runware_api_key, "RUNWARE_API_KEY");
    fill(&mut config.providers.fal_api_key, "FAL_KEY");
    fill(&mut config.providers.image_model, "RUNWARE_MODEL_FLUX");
    fill(&mut config.providers.motion_model_primary, "FAL_MODEL_LTX");
    fill(
        &mut config.providers.motion_model_alternate,
        "RUNWARE_MODEL_MOTION",
    );
    config
}

/// Read and validate a room config JSON file.
fn load_room_config(path: &Path) -> Result<RoomConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: RoomConfig = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    validate_config(&config).map_err(|errors| {
        anyhow!(
            "invalid config {}: {}",
            path.display(),
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        )
    })?;
    Ok(config)
}

/// Resolve the configured audio source to a file path.
fn resolve_audio(app: &RoomloopConfig, room: &RoomConfig) -> Option<PathBuf> {
    match &room.audio {
        Some(AudioSource::File(path)) => Some(path.clone()),
        Some(AudioSource::Track(id)) => {
            let resolved = tracks::resolve(id, Path::new(&app.assets.audio_dir));
            if resolved.is_none() {
                tracing::warn!("unknown audio track '{}'; rendering without audio", id);
            }
            resolved
        }
        None => None,
    }
}

fn font_path(app: &RoomloopConfig) -> Option<PathBuf> {
    if app.assets.font_path.is_empty() {
        None
    } else {
        Some(PathBuf::from(&app.assets.font_path))
    }
}

fn cmd_render(config_path: &Path, output: Option<PathBuf>, test: bool) -> Result<()> {
    let app = load_app_config();
    let mut room = load_room_config(config_path)?;

    if test {
        room.duration = roomloop_core::Duration::from_seconds(TEST_RENDER_SECONDS);
        println!("🧪 Test render: duration clamped to {}s", TEST_RENDER_SECONDS);
    }

    let output = output.unwrap_or_else(|| {
        let name = if test {
            format!("test-{}.mp4", room.theme.template_name())
        } else {
            format!("{}.mp4", room.theme.template_name())
        };
        PathBuf::from("output").join(name)
    });

    let mut job = RenderJob::new(room.clone(), room.background_image.clone(), &output);
    if let Some(audio) = resolve_audio(&app, &room) {
        job = job.with_audio(audio);
    }
    if let Some(font) = font_path(&app) {
        job = job.with_font(font);
    }

    println!(
        "🎬 Rendering {} ({}, {} @ {}fps) -> {}",
        room.theme.template_name(),
        room.duration,
        room.resolution,
        room.fps,
        output.display()
    );

    let renderer = FfmpegRenderer::new(app.encoder.clone());
    let cancel = CancelToken::new();
    renderer
        .render(&job, &cancel, |percent| {
            print!("\r   progress: {:5.1}%", percent);
            let _ = std::io::stdout().flush();
        })
        .map_err(|e| anyhow!("{}", e))?;
    println!("\r   progress: 100.0%");
    println!("✅ Wrote {}", output.display());
    Ok(())
}

fn cmd_preview(config_path: &Path, frames: u32, width: u32, out_dir: &Path) -> Result<()> {
    let app = load_app_config();
    let room = load_room_config(config_path)?;
    let height = width * 9 / 16;

    let background = image_loader::load_image(&room.background_image)
        .map_err(|e| anyhow!("{}", e))?;
    let mut session = PreviewSession::new(room.clone(), &background, width, height);
    if let Some(font) = font_path(&app) {
        match TextRenderer::from_file(&font) {
            Ok(text) => session.set_font(text),
            Err(e) => tracing::warn!("quote font unavailable: {}", e),
        }
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for i in 0..frames {
        let t = i as f64 / room.fps as f64;
        let frame = session.frame_at(t);
        let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.data)
            .ok_or_else(|| anyhow!("preview frame buffer has unexpected size"))?;
        let path = out_dir.join(format!("frame_{:04}.png", i));
        image
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    println!("✅ Wrote {} preview frames to {}", frames, out_dir.display());
    Ok(())
}

fn cmd_timeline(config_path: &Path, frames: Option<u64>) -> Result<()> {
    let room = load_room_config(config_path)?;
    let timeline = match frames {
        Some(cap) => Timeline {
            fps: room.fps,
            frames: Timeline::frames_iter(&room).take(cap as usize).collect(),
        },
        None => Timeline::generate(&room),
    };
    println!("{}", serde_json::to_string_pretty(&timeline)?);
    Ok(())
}

fn cmd_graph(config_path: &Path) -> Result<()> {
    let app = load_app_config();
    let room = load_room_config(config_path)?;
    let mut builder = GraphBuilder::new(&room);
    if let Some(font) = font_path(&app) {
        builder = builder.with_font(font);
    }
    let graph = builder.build();

    println!("Stages:");
    for stage in graph.stages() {
        println!("  {:<14} {}", stage.name, stage.filter);
    }
    println!();
    println!("filter_complex:");
    println!("  {}", graph.to_filter_complex());
    Ok(())
}

fn cmd_doctor() -> Result<()> {
    let app = load_app_config();
    let mut warnings: Vec<String> = Vec::new();

    println!("🩺 Roomloop Doctor");
    println!("   CLI version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "   OS: {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    let renderer = FfmpegRenderer::new(app.encoder.clone());
    if renderer.is_available() {
        match renderer.version() {
            Ok(banner) => {
                let first = banner.lines().next().unwrap_or("unknown");
                println!("   FFmpeg: {}", first);
                if let Some(libavfilter) =
                    banner.lines().find(|l| l.trim_start().starts_with("libavfilter"))
                {
                    println!("   {}", libavfilter.trim());
                }
            }
            Err(e) => warnings.push(format!("ffmpeg -version failed: {}", e)),
        }
    } else {
        warnings.push("ffmpeg not found on PATH (required for batch rendering)".to_string());
    }

    println!(
        "   Project config: {}",
        if Path::new("roomloop.toml").exists() {
            "roomloop.toml"
        } else {
            "(none found — using defaults)"
        }
    );

    for (label, dir) in [
        ("rooms dir", &app.assets.rooms_dir),
        ("audio dir", &app.assets.audio_dir),
    ] {
        if Path::new(dir).is_dir() {
            println!("   {}: {}", label, dir);
        } else {
            warnings.push(format!("{} '{}' does not exist", label, dir));
        }
    }

    if app.assets.font_path.is_empty() {
        println!("   Quote font: (unset — overlays use encoder font discovery)");
    } else if Path::new(&app.assets.font_path).is_file() {
        println!("   Quote font: {}", app.assets.font_path);
    } else {
        warnings.push(format!("quote font '{}' not found", app.assets.font_path));
    }

    if let Err(e) = std::fs::create_dir_all("output") {
        warnings.push(format!("failed to create output/: {}", e));
    }

    if warnings.is_empty() {
        println!("   All checks passed ✓");
    } else {
        println!();
        for warning in &warnings {
            println!("   ⚠ {}", warning);
        }
    }
    Ok(())
}

fn cmd_tracks() -> Result<()> {
    println!("Built-in audio tracks:");
    for track in tracks::AUDIO_TRACKS {
        println!("  {:<20} {:<22} [{}]", track.id, track.name, track.category);
    }
    Ok(())
}

fn cmd_rooms() -> Result<()> {
    println!("Built-in room presets:");
    for room in rooms::ROOM_PRESETS {
        let marker = if room.id == rooms::DEFAULT_ROOM { "*" } else { " " };
        println!(
            "{} {:<16} {:<26} lift {:.3}, boost {:.2}",
            marker,
            room.id,
            room.name,
            room.lift_speed_milli as f64 / 1000.0,
            room.brightness_boost_milli as f64 / 1000.0,
        );
    }
    Ok(())
}

fn cmd_generate(prompt: &str, width: u32, height: u32, download: bool) -> Result<()> {
    let app = load_app_config();
    let url = generation::generate_background(&app.providers, prompt, width, height)?;
    println!("🖼  {}", url);
    if download {
        let cache_root = generation::expand_tilde(&app.assets.cache_dir)?;
        let path = generation::download_to_cache(&cache_root, &url, "jpg")?;
        println!("   cached at {}", path.display());
    }
    Ok(())
}

fn cmd_motion(image_url: &str, intensity: f64, duration: f64) -> Result<()> {
    let app = load_app_config();
    let request = generation::MotionRequest {
        image_url: image_url.to_string(),
        intensity,
        duration_seconds: duration,
    };
    let url = generation::generate_motion(&app.providers, &request)?;
    println!("🎞  {}", url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_audio_unknown_track_is_none() {
        let app = RoomloopConfig::default();
        let room = RoomConfig::new(
            "room.jpg",
            roomloop_core::Duration::from_seconds(1.0),
            roomloop_ir::Theme::Breathing(roomloop_ir::theme::BreathingParams::default()),
        )
        .with_audio(AudioSource::Track("does_not_exist".to_string()));
        assert!(resolve_audio(&app, &room).is_none());
    }

    #[test]
    fn test_resolve_audio_known_track() {
        let app = RoomloopConfig::default();
        let room = RoomConfig::new(
            "room.jpg",
            roomloop_core::Duration::from_seconds(1.0),
            roomloop_ir::Theme::Breathing(roomloop_ir::theme::BreathingParams::default()),
        )
        .with_audio(AudioSource::Track("brown_noise".to_string()));
        let path = resolve_audio(&app, &room).unwrap();
        assert!(path.ends_with("brown-noise.mp3"));
    }
}
