//! # roomloop-render
//!
//! The Roomloop preview renderer. Projects a configuration plus elapsed
//! wall-clock time onto a drawable RGBA frame, evaluating the same signal
//! library the batch path compiles to FFmpeg expressions. Single-threaded,
//! CPU-only, bounded work per tick.

pub mod dust;
pub mod effects;
pub mod image_loader;
pub mod preview;
pub mod text;

pub use dust::DustField;
pub use preview::PreviewSession;
pub use text::TextRenderer;
