use winit::dpi::PhysicalSize;

use crate::error::{FrameError, StageKind};
use crate::viewport::Viewport;

/// Per-frame values handed to the program. Never persisted between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    /// Seconds since the render loop started.
    pub elapsed_time: f32,
    /// Backing-store resolution in pixels.
    pub resolution: PhysicalSize<u32>,
}

/// Handle through which all GPU work for one renderer instance is issued.
///
/// Objects returned by the `compile`/`link`/`create` calls are owned by the
/// caller and must be handed back through the matching `release_*` call; the
/// context never frees them on its own.
pub trait RenderingContext {
    type Stage;
    type Program;
    type Buffer;

    /// Compiles one stage. `Err` carries the compiler diagnostic.
    fn compile_stage(&mut self, stage: StageKind, source: &str) -> Result<Self::Stage, String>;

    /// Links two compiled stages. `Err` carries the linker diagnostic.
    fn link_program(
        &mut self,
        vertex: &Self::Stage,
        fragment: &Self::Stage,
    ) -> Result<Self::Program, String>;

    /// Uploads an immutable buffer of 2D vertex positions.
    fn create_vertex_buffer(&mut self, vertices: &[[f32; 2]]) -> Result<Self::Buffer, String>;

    /// Reconfigures the drawable area before the next draw.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Draws `vertex_count` vertices as a triangle strip with `program` bound.
    fn draw(
        &mut self,
        program: &Self::Program,
        geometry: &Self::Buffer,
        vertex_count: u32,
        uniforms: Uniforms,
    ) -> Result<(), FrameError>;

    fn release_program(&mut self, program: Self::Program);
    fn release_stage(&mut self, stage: Self::Stage);
    fn release_buffer(&mut self, buffer: Self::Buffer);
}
