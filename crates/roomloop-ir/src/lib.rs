//! # roomloop-ir
//!
//! The Roomloop Intermediate Representation — the declarative model of an
//! ambient room video. A [`RoomConfig`] describes a theme and its numeric
//! parameters; the signal library turns it into closed-form motion signals
//! that both the preview path (sampled per frame) and the batch path
//! (rendered to FFmpeg expressions) consume, so the two rendering paths
//! agree by construction.

pub mod quote;
pub mod signal;
pub mod theme;
pub mod timeline;
pub mod validate;

pub use quote::{QuoteOverlay, QuoteWindow};
pub use signal::{ColorBalance, MotionPlan, Signal};
pub use theme::{AudioSource, RoomConfig, Theme};
pub use timeline::{Timeline, TimelineFrame};
pub use validate::validate_config;
