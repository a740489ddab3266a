//! # roomloop-core
//!
//! Core types and primitives for the Roomloop ambient video engine.
//! This crate contains foundational types shared across all Roomloop crates:
//! frame buffers, colors, durations, resolutions, app configuration, and
//! error types.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod math;
pub mod time;
pub mod types;

pub use config::*;

pub use color::Color;
pub use error::{RoomloopError, RoomloopResult};
pub use frame::FrameBuffer;
pub use math::Point2D;
pub use time::{Duration, Timestamp};
pub use types::{Resolution, DEFAULT_FPS};
