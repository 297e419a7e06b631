use tracing::debug;

use crate::context::RenderingContext;
use crate::error::RendererError;

/// Two triangles covering clip space, in triangle-strip order.
pub const FULLSCREEN_QUAD: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

/// The immutable fullscreen quad, uploaded once at startup.
pub struct GeometryBuffer<C: RenderingContext> {
    buffer: C::Buffer,
}

impl<C: RenderingContext> GeometryBuffer<C> {
    pub fn create_fullscreen_quad(context: &mut C) -> Result<Self, RendererError> {
        let buffer = context
            .create_vertex_buffer(&FULLSCREEN_QUAD)
            .map_err(RendererError::AllocationFailed)?;
        debug!(vertices = FULLSCREEN_QUAD.len(), "uploaded fullscreen quad");
        Ok(Self { buffer })
    }

    pub fn vertex_count(&self) -> u32 {
        FULLSCREEN_QUAD.len() as u32
    }

    pub(crate) fn handle(&self) -> &C::Buffer {
        &self.buffer
    }

    pub fn release(self, context: &mut C) {
        context.release_buffer(self.buffer);
    }
}
