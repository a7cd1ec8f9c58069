//! Render targets.
//!
//! The compositor only talks to [`target::RenderTarget`]; [`cpu::CpuTarget`] rasterizes for real
//! and [`recording::RecordingTarget`] records calls for headless use.

/// CPU raster target (`vello_cpu` + Parley).
pub mod cpu;
/// Call-recording target with deterministic text measurement.
pub mod recording;
/// Target capability traits and the frame readback type.
pub mod target;

pub use cpu::CpuTarget;
pub use recording::{DrawOp, RecordingTarget};
pub use target::{FrameRGBA, RenderTarget, TextMeasure};
