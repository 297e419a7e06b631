use std::borrow::Cow;
use std::sync::Arc;

use anyhow::{anyhow, Context as AnyhowContext, Result};
use tracing::{debug, error, warn};
use wgpu::naga::ShaderStage;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::backing::{BackingTarget, Blitter, BACKING_FORMAT};
use super::uniforms::SilkUniforms;
use super::{GpuOptions, GpuPowerPreference};
use crate::context::{RenderingContext, Uniforms};
use crate::error::{FrameError, RendererError, StageKind};
use crate::viewport::Viewport;

/// A compiled GLSL stage.
pub struct GpuStage {
    module: wgpu::ShaderModule,
    kind: StageKind,
}

/// The silk render pipeline targeting the backing texture.
pub struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
}

pub struct GpuBuffer {
    buffer: wgpu::Buffer,
}

/// wgpu implementation of [`RenderingContext`] bound to one window.
///
/// The silk program draws into an offscreen [`BackingTarget`] sized to the
/// capped backing resolution, which is then stretched over the swapchain image.
pub struct WgpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    backing: BackingTarget,
    blitter: Blitter,
}

impl WgpuContext {
    /// Creates the surface, device and swapchain for `window`.
    ///
    /// Any failure means GPU rendering is unavailable on this host.
    pub fn new(window: Arc<Window>, options: &GpuOptions) -> Result<Self, RendererError> {
        Self::try_new(window, options)
            .map_err(|err| RendererError::ContextUnavailable(format!("{err:#}")))
    }

    fn try_new(window: Arc<Window>, options: &GpuOptions) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let initial_size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .context("failed to create rendering surface")?;

        let power_preference = match options.power {
            GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
            GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        debug!(
            name = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("silk device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;
        device.on_uncaptured_error(Box::new(|err| {
            error!(error = %err, "uncaptured wgpu error");
        }));

        let caps = surface.get_capabilities(&adapter);
        let fallback_format = caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        // Colours are authored for a gamma-encoded canvas.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or_else(|| {
                warn!(
                    ?fallback_format,
                    "no non-sRGB surface format available; colours will look lighter"
                );
                fallback_format
            });
        let present_mode = if caps.present_modes.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            caps.present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::AutoVsync)
        };
        let alpha_mode = if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
            wgpu::CompositeAlphaMode::Opaque
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: initial_size.width.max(1),
            height: initial_size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        debug!(?format, ?present_mode, "configured silk surface");

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("silk uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("silk uniforms"),
            size: std::mem::size_of::<SilkUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("silk uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let backing = BackingTarget::new(&device, initial_size);
        let mut blitter = Blitter::new(&device, format);
        blitter.bind(&device, &backing);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            backing,
            blitter,
        })
    }

    pub fn surface_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn backing_size(&self) -> PhysicalSize<u32> {
        self.backing.size()
    }

    fn resize_surface(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 || size == self.surface_size() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn resize_backing(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 || size == self.backing.size() {
            return;
        }
        self.backing.destroy();
        self.backing = BackingTarget::new(&self.device, size);
        self.blitter.bind(&self.device, &self.backing);
    }

    fn acquire_frame(&mut self) -> Result<wgpu::SurfaceTexture, FrameError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                Err(FrameError::Skip("surface lost; reconfigured".into()))
            }
            Err(wgpu::SurfaceError::Timeout) => {
                Err(FrameError::Skip("timed out acquiring surface texture".into()))
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(FrameError::Fatal("out of GPU memory".into()))
            }
            Err(other) => Err(FrameError::Skip(other.to_string())),
        }
    }

    fn scoped<T>(&self, filter: wgpu::ErrorFilter, create: impl FnOnce() -> T) -> Result<T, String> {
        self.device.push_error_scope(filter);
        let value = create();
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(err.to_string()),
            None => Ok(value),
        }
    }
}

impl RenderingContext for WgpuContext {
    type Stage = GpuStage;
    type Program = GpuProgram;
    type Buffer = GpuBuffer;

    fn compile_stage(&mut self, stage: StageKind, source: &str) -> Result<GpuStage, String> {
        let (label, naga_stage) = match stage {
            StageKind::Vertex => ("silk vertex", ShaderStage::Vertex),
            StageKind::Fragment => ("silk fragment", ShaderStage::Fragment),
        };
        let module = self.scoped(wgpu::ErrorFilter::Validation, || {
            self.device
                .create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(label),
                    source: wgpu::ShaderSource::Glsl {
                        shader: Cow::Owned(source.to_owned()),
                        stage: naga_stage,
                        defines: &[],
                    },
                })
        })?;
        Ok(GpuStage {
            module,
            kind: stage,
        })
    }

    fn link_program(&mut self, vertex: &GpuStage, fragment: &GpuStage) -> Result<GpuProgram, String> {
        if vertex.kind != StageKind::Vertex || fragment.kind != StageKind::Fragment {
            return Err(format!(
                "expected vertex and fragment stages, got {} and {}",
                vertex.kind, fragment.kind
            ));
        }

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("silk pipeline layout"),
                bind_group_layouts: &[&self.uniform_layout],
                push_constant_ranges: &[],
            });
        let attributes = wgpu::vertex_attr_array![0 => Float32x2];
        let pipeline = self.scoped(wgpu::ErrorFilter::Validation, || {
            self.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("silk pipeline"),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &vertex.module,
                        entry_point: Some("main"),
                        buffers: &[wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &attributes,
                        }],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleStrip,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    fragment: Some(wgpu::FragmentState {
                        module: &fragment.module,
                        entry_point: Some("main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: BACKING_FORMAT,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    multiview: None,
                    cache: None,
                })
        })?;
        Ok(GpuProgram { pipeline })
    }

    fn create_vertex_buffer(&mut self, vertices: &[[f32; 2]]) -> Result<GpuBuffer, String> {
        let buffer = self.scoped(wgpu::ErrorFilter::OutOfMemory, || {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("silk fullscreen quad"),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        })?;
        Ok(GpuBuffer { buffer })
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.resize_surface(viewport.surface);
        self.resize_backing(viewport.resolution);
    }

    fn draw(
        &mut self,
        program: &GpuProgram,
        geometry: &GpuBuffer,
        vertex_count: u32,
        uniforms: Uniforms,
    ) -> Result<(), FrameError> {
        let frame = self.acquire_frame()?;
        let silk_uniforms = SilkUniforms::from(uniforms);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&silk_uniforms));

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("silk encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("silk pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.backing.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, geometry.buffer.slice(..));
            pass.draw(0..vertex_count, 0..1);
        }
        self.blitter.encode(&mut encoder, &view);

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release_program(&mut self, program: GpuProgram) {
        drop(program);
    }

    fn release_stage(&mut self, stage: GpuStage) {
        drop(stage);
    }

    fn release_buffer(&mut self, buffer: GpuBuffer) {
        buffer.buffer.destroy();
    }
}

impl Drop for WgpuContext {
    fn drop(&mut self) {
        self.backing.destroy();
        self.uniform_buffer.destroy();
        debug!("released silk GPU context");
    }
}
