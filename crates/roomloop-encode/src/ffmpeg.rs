use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use roomloop_core::{EncoderConfig, RoomloopError, RoomloopResult};
use roomloop_fx::graph::OUTPUT_LABEL;
use roomloop_fx::GraphBuilder;
use roomloop_ir::{validate_config, RoomConfig};

use crate::progress::ProgressParser;

/// Cooperative cancellation handle for a running render.
///
/// Cloning shares the flag; triggering it makes the orchestrator kill the
/// encoder process and remove the partial output file.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// One batch render request: a configuration plus resolved file paths.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Job identifier, used in logs.
    pub id: Uuid,
    /// The room configuration to render.
    pub config: RoomConfig,
    /// Resolved background image path.
    pub background: PathBuf,
    /// Resolved audio path, if any.
    pub audio: Option<PathBuf>,
    /// Font file for quote overlays, if any.
    pub font: Option<PathBuf>,
    /// Output MP4 path. The caller owns this file afterwards and must not
    /// run two renders against the same path concurrently.
    pub output: PathBuf,
}

impl RenderJob {
    pub fn new(
        config: RoomConfig,
        background: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            background: background.into(),
            audio: None,
            font: None,
            output: output.into(),
        }
    }

    /// Builder: attach a looped audio bed.
    pub fn with_audio(mut self, audio: impl Into<PathBuf>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// Builder: set the overlay font.
    pub fn with_font(mut self, font: impl Into<PathBuf>) -> Self {
        self.font = Some(font.into());
        self
    }
}

/// Orchestrates the external FFmpeg encoder.
pub struct FfmpegRenderer {
    encoder: EncoderConfig,
}

impl FfmpegRenderer {
    pub fn new(encoder: EncoderConfig) -> Self {
        Self { encoder }
    }

    fn ffmpeg_binary(&self) -> &str {
        if self.encoder.ffmpeg_path.is_empty() {
            "ffmpeg"
        } else {
            &self.encoder.ffmpeg_path
        }
    }

    /// Check if FFmpeg is available on the system.
    pub fn is_available(&self) -> bool {
        Command::new(self.ffmpeg_binary())
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// The full `ffmpeg -version` banner, for diagnostics.
    pub fn version(&self) -> RoomloopResult<String> {
        let output = Command::new(self.ffmpeg_binary())
            .arg("-version")
            .output()
            .map_err(|e| RoomloopError::Encode(format!("failed to run ffmpeg: {}", e)))?;
        if !output.status.success() {
            return Err(RoomloopError::Encode(format!(
                "ffmpeg -version exited with {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Render one job to its output path, reporting progress as FFmpeg
    /// reports it.
    ///
    /// Resolves when the output file is finalized; rejects with the
    /// encoder's diagnostic text on any non-zero exit. Cancelling through
    /// the token kills the encoder and removes the partial output — a
    /// cancelled render never looks like a success.
    pub fn render(
        &self,
        job: &RenderJob,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(f64),
    ) -> RoomloopResult<()> {
        validate_config(&job.config).map_err(|errors| {
            RoomloopError::Validation(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        // The background is required; fail before touching the encoder.
        if !job.background.is_file() {
            return Err(RoomloopError::asset(
                "background image not found",
                &job.background,
            ));
        }

        // Audio is optional: a missing file downgrades to a silent render.
        let audio = match &job.audio {
            Some(path) if path.is_file() => Some(path.clone()),
            Some(path) => {
                tracing::warn!(
                    "audio file {} not found; rendering without audio",
                    path.display()
                );
                None
            }
            None => None,
        };

        if cancel.is_cancelled() {
            return Err(RoomloopError::Render("render cancelled".into()));
        }

        if let Some(parent) = job.output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let args = self.build_args(job, audio.as_ref());
        tracing::info!(
            "job {}: ffmpeg {}",
            job.id,
            args.join(" ")
        );

        let mut child = Command::new(self.ffmpeg_binary())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RoomloopError::Encode(format!("failed to start ffmpeg: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RoomloopError::Encode("failed to open ffmpeg stdout".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RoomloopError::Encode("failed to open ffmpeg stderr".into()))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = stderr.read_to_end(&mut bytes);
            bytes
        });

        let mut parser = ProgressParser::new(job.config.duration.as_seconds());
        let mut cancelled = false;
        for line in BufReader::new(stdout).lines() {
            if cancel.is_cancelled() {
                cancelled = true;
                let _ = child.kill();
                break;
            }
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            if let Some(percent) = parser.push_line(&line) {
                on_progress(percent);
            }
        }

        let status = child
            .wait()
            .map_err(|e| RoomloopError::Encode(format!("ffmpeg process error: {}", e)))?;
        let stderr_bytes = stderr_drain.join().unwrap_or_default();

        if cancelled {
            // Never leave a half-written file behind after a cancel.
            if job.output.exists() {
                let _ = std::fs::remove_file(&job.output);
            }
            tracing::info!(
                "job {}: cancelled at {} ({:.1}%)",
                job.id,
                parser.position(),
                parser.percent()
            );
            return Err(RoomloopError::Render("render cancelled".into()));
        }

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(RoomloopError::Encode(format!(
                "ffmpeg failed with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::info!(
            "job {}: encoded {} ({} @ {}fps, {})",
            job.id,
            job.output.display(),
            job.config.resolution,
            job.config.fps,
            job.config.duration
        );
        Ok(())
    }

    /// The full FFmpeg argument list for a job. Pure; split out so the
    /// invocation is testable without an encoder installed.
    pub fn build_args(&self, job: &RenderJob, audio: Option<&PathBuf>) -> Vec<String> {
        let fps = job.config.fps.to_string();
        let duration = format!("{}", job.config.duration.as_seconds());

        let mut builder = GraphBuilder::new(&job.config);
        if let Some(font) = &job.font {
            builder = builder.with_font(font);
        }
        let graph = builder.build();

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-nostats".into(),
            // Input 0: the still background, held for the full duration.
            "-loop".into(),
            "1".into(),
            "-framerate".into(),
            fps.clone(),
            "-t".into(),
            duration.clone(),
            "-i".into(),
            job.background.display().to_string(),
        ];

        if let Some(audio) = audio {
            // Input 1: the audio bed, looped indefinitely and trimmed by
            // -shortest below.
            args.extend([
                "-stream_loop".into(),
                "-1".into(),
                "-i".into(),
                audio.display().to_string(),
            ]);
        }

        args.extend([
            "-filter_complex".into(),
            graph.to_filter_complex(),
            "-map".into(),
            OUTPUT_LABEL.into(),
        ]);

        if audio.is_some() {
            args.extend([
                "-map".into(),
                "1:a".into(),
                "-c:a".into(),
                "aac".into(),
                "-b:a".into(),
                self.encoder.audio_bitrate.clone(),
                "-shortest".into(),
            ]);
        } else {
            args.push("-an".into());
        }

        args.extend([
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            self.encoder.preset.clone(),
            "-crf".into(),
            self.encoder.crf.to_string(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-r".into(),
            fps,
            "-t".into(),
            duration,
            "-movflags".into(),
            "+faststart".into(),
            "-progress".into(),
            "pipe:1".into(),
            job.output.display().to_string(),
        ]);

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomloop_core::Duration;
    use roomloop_ir::theme::{BreathingParams, Theme};

    fn job(background: &str) -> RenderJob {
        let config = RoomConfig::new(
            background,
            Duration::from_seconds(10.0),
            Theme::Breathing(BreathingParams::default()),
        );
        RenderJob::new(config, background, "/tmp/roomloop-test-out.mp4")
    }

    fn renderer() -> FfmpegRenderer {
        FfmpegRenderer::new(EncoderConfig::default())
    }

    #[test]
    fn test_missing_background_rejects_before_encoding() {
        let job = job("/nonexistent/roomloop/background.jpg");
        let err = renderer()
            .render(&job, &CancelToken::new(), |_| {})
            .unwrap_err();
        assert!(matches!(err, RoomloopError::Asset { .. }), "got {:?}", err);
    }

    #[test]
    fn test_invalid_config_rejects_first() {
        let mut job = job("/nonexistent/background.jpg");
        job.config.duration = Duration::zero();
        let err = renderer()
            .render(&job, &CancelToken::new(), |_| {})
            .unwrap_err();
        assert!(matches!(err, RoomloopError::Validation(_)), "got {:?}", err);
    }

    #[test]
    fn test_pre_cancelled_token_short_circuits() {
        let background = std::env::temp_dir().join("roomloop-cancel-test.jpg");
        std::fs::write(&background, b"not really a jpeg").unwrap();
        let job = job(background.to_str().unwrap());
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = renderer().render(&job, &cancel, |_| {}).unwrap_err();
        assert!(err.to_string().contains("cancelled"));
        let _ = std::fs::remove_file(&background);
    }

    #[test]
    fn test_args_without_audio_are_silent() {
        let job = job("bg.jpg");
        let args = renderer().build_args(&job, None);
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-stream_loop".to_string()));
        assert!(args.contains(&"-filter_complex".to_string()));
        assert!(args.contains(&"[vout]".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/roomloop-test-out.mp4");
    }

    #[test]
    fn test_args_with_audio_loop_and_trim() {
        let job = job("bg.jpg");
        let audio = PathBuf::from("audio/brown-noise.mp3");
        let args = renderer().build_args(&job, Some(&audio));
        assert!(args.contains(&"-stream_loop".to_string()));
        assert!(args.contains(&"-shortest".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(!args.contains(&"-an".to_string()));
    }

    #[test]
    fn test_args_carry_encoder_settings() {
        let mut encoder = EncoderConfig::default();
        encoder.preset = "slow".to_string();
        encoder.crf = 18;
        let renderer = FfmpegRenderer::new(encoder);
        let args = renderer.build_args(&job("bg.jpg"), None);
        let preset_idx = args.iter().position(|a| a == "-preset").unwrap();
        assert_eq!(args[preset_idx + 1], "slow");
        let crf_idx = args.iter().position(|a| a == "-crf").unwrap();
        assert_eq!(args[crf_idx + 1], "18");
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }
}
