use bytemuck::{Pod, Zeroable};

use crate::context::Uniforms;

/// CPU mirror of the `SilkParams` std140 block.
///
/// `u_resolution` is a `vec2`, so std140 aligns it to 8 bytes and the block
/// needs one float of padding after `u_time`. The whole block is 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SilkUniforms {
    pub time: f32,
    _padding: f32,
    pub resolution: [f32; 2],
}

impl SilkUniforms {
    pub fn new(time: f32, width: u32, height: u32) -> Self {
        Self {
            time,
            _padding: 0.0,
            resolution: [width as f32, height as f32],
        }
    }
}

impl From<Uniforms> for SilkUniforms {
    fn from(value: Uniforms) -> Self {
        Self::new(
            value.elapsed_time,
            value.resolution.width,
            value.resolution.height,
        )
    }
}
