//! Silk background renderer.
//!
//! Draws a slowly animating, dark indigo "silk" pattern behind whatever the
//! host puts on top of it. The pattern is layered simplex noise folded through
//! a sine and tinted from a fixed four-colour palette; it is computed entirely
//! in a fragment shader over a fullscreen quad. The flow is:
//!
//! ```text
//!   host (window, frame callbacks)
//!          │ SurfaceMetrics / AnimationHandle
//!          ▼
//!   Background::mount ──▶ Renderer::acquire ──▶ ProgramBuilder + GeometryBuffer
//!          │                                            │
//!          └─▶ Renderer::frame ──▶ RenderLoop ──▶ RenderingContext::draw
//! ```
//!
//! [`RenderingContext`] is the seam between the lifecycle and the GPU: the
//! [`gpu::WgpuContext`] implementation drives wgpu, and tests substitute a
//! recording mock. [`FrameRequester`] plays the same role for the host's
//! "call me before the next repaint" primitive. [`still`] renders the same
//! pattern on the CPU for PNG exports.

pub mod context;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod lifecycle;
pub mod program;
pub mod scheduler;
pub mod shaders;
pub mod shading;
pub mod still;
pub mod viewport;

pub use context::{RenderingContext, Uniforms};
pub use error::{BuildError, FrameError, RendererError, StageKind};
pub use geometry::{GeometryBuffer, FULLSCREEN_QUAD};
pub use gpu::{GpuOptions, GpuPowerPreference, WgpuContext};
pub use lifecycle::{Background, BackgroundStatus, Renderer, RendererOptions};
pub use program::{ProgramBuilder, ShaderProgram};
pub use scheduler::{AnimationHandle, FrameOutcome, FrameRequester, LoopError, LoopState, RenderLoop};
pub use viewport::{SurfaceMetrics, Viewport, ViewportManager, DEFAULT_DENSITY_CAP};
