//! # roomloop-encode
//!
//! The render orchestrator — builds the filter graph for a configuration
//! and drives the system FFmpeg binary to materialize it into an MP4,
//! forwarding fractional progress and supporting cooperative cancellation.

pub mod ffmpeg;
pub mod progress;

pub use ffmpeg::{CancelToken, FfmpegRenderer, RenderJob};
pub use progress::ProgressParser;
