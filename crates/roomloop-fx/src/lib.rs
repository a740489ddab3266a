//! # roomloop-fx
//!
//! The transform graph builder: compiles a [`roomloop_ir::RoomConfig`]
//! into an ordered chain of FFmpeg filter stages, with every
//! time-dependent parameter rendered from the same [`roomloop_ir::Signal`]
//! trees the preview path samples, so what a user previews is what the
//! batch render produces.

pub mod builder;
pub mod expr;
pub mod graph;

pub use builder::GraphBuilder;
pub use graph::{FilterGraph, FilterStage};
