//! wgpu backend for the silk renderer.
//!
//! - `context` owns the instance/device/surface wiring and implements
//!   [`RenderingContext`](crate::context::RenderingContext) on top of it.
//! - `backing` holds the offscreen texture the program renders into and the
//!   blit that scales it onto the swapchain.
//! - `uniforms` mirrors the `SilkParams` std140 block.

mod backing;
mod context;
mod uniforms;

pub use context::{GpuBuffer, GpuProgram, GpuStage, WgpuContext};
pub use uniforms::SilkUniforms;

/// Adapter selection hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GpuPowerPreference {
    #[default]
    Low,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuOptions {
    pub power: GpuPowerPreference,
}
