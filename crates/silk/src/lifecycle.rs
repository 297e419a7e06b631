//! Mount/unmount orchestration for the silk background.
//!
//! [`Renderer`] is the scoped owner of every GPU object one instance creates:
//! acquiring it builds the program, uploads the quad and starts the frame loop;
//! dropping or releasing it cancels the loop before anything is freed.
//! [`Background`] wraps that in the host-facing contract where mounting never
//! fails and teardown happens exactly once.

use std::borrow::Cow;
use std::time::Instant;

use tracing::{debug, error, info, trace, warn};

use crate::context::{RenderingContext, Uniforms};
use crate::error::{FrameError, RendererError};
use crate::geometry::GeometryBuffer;
use crate::program::{ProgramBuilder, ShaderProgram};
use crate::scheduler::{AnimationHandle, FrameOutcome, FrameRequester, LoopState, RenderLoop};
use crate::shaders::{FRAGMENT_SHADER_GLSL, VERTEX_SHADER_GLSL};
use crate::viewport::{SurfaceMetrics, Viewport, ViewportManager, DEFAULT_DENSITY_CAP};

/// Knobs fixed at mount time.
#[derive(Debug, Clone)]
pub struct RendererOptions {
    /// Upper bound applied to the surface's device pixel density.
    pub density_cap: f64,
    pub vertex_source: Cow<'static, str>,
    pub fragment_source: Cow<'static, str>,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            density_cap: DEFAULT_DENSITY_CAP,
            vertex_source: Cow::Borrowed(VERTEX_SHADER_GLSL),
            fragment_source: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
        }
    }
}

/// A running silk renderer bound to one surface.
///
/// Field order matters only for documentation: resources are released
/// explicitly in [`Renderer::release`], and the context is dropped with the
/// struct afterwards.
pub struct Renderer<C: RenderingContext, F: FrameRequester> {
    render_loop: RenderLoop,
    frames: F,
    geometry: Option<GeometryBuffer<C>>,
    program: Option<ShaderProgram<C>>,
    viewport: ViewportManager,
    applied_viewport: Option<Viewport>,
    context: C,
}

impl<C: RenderingContext, F: FrameRequester> Renderer<C, F> {
    /// Builds the program, uploads the quad, applies the initial viewport and
    /// requests the first frame.
    ///
    /// On error everything acquired so far has already been released.
    pub fn acquire(
        context: C,
        frames: F,
        metrics: SurfaceMetrics,
        options: &RendererOptions,
        now: Instant,
    ) -> Result<Self, RendererError> {
        let mut renderer = Self {
            render_loop: RenderLoop::new(),
            frames,
            geometry: None,
            program: None,
            viewport: ViewportManager::with_density_cap(metrics, options.density_cap),
            applied_viewport: None,
            context,
        };

        renderer.program = Some(ProgramBuilder::build(
            &mut renderer.context,
            &options.vertex_source,
            &options.fragment_source,
        )?);
        renderer.geometry = Some(GeometryBuffer::create_fullscreen_quad(
            &mut renderer.context,
        )?);

        renderer.apply_viewport();
        if let Err(err) = renderer.render_loop.start(&mut renderer.frames, now) {
            error!(error = %err, "failed to start silk render loop");
        }

        let resolution = renderer.viewport.current_resolution();
        info!(
            width = resolution.width,
            height = resolution.height,
            density_cap = renderer.viewport.density_cap(),
            "silk background mounted"
        );
        Ok(renderer)
    }

    /// Records the surface's new geometry; it takes effect on the next frame.
    pub fn notify_resize(&mut self, metrics: SurfaceMetrics) {
        trace!(
            width = metrics.logical.width,
            height = metrics.logical.height,
            scale_factor = metrics.scale_factor,
            "surface resized"
        );
        self.viewport.notify_resize(metrics);
    }

    /// Host frame callback. Stale or post-cancel handles are ignored.
    pub fn frame(&mut self, handle: AnimationHandle, now: Instant) -> FrameOutcome {
        let Self {
            render_loop,
            frames,
            geometry,
            program,
            viewport,
            applied_viewport,
            context,
        } = self;
        let (Some(program), Some(geometry)) = (program.as_ref(), geometry.as_ref()) else {
            return FrameOutcome::Ignored;
        };

        render_loop.on_frame(frames, handle, now, |elapsed| {
            let current = viewport.current_viewport();
            if *applied_viewport != Some(current) {
                context.set_viewport(current);
                *applied_viewport = Some(current);
                debug!(
                    width = current.resolution.width,
                    height = current.resolution.height,
                    "applied new backing resolution"
                );
            }
            if !current.is_drawable() {
                trace!("surface has no area; skipping draw");
                return true;
            }

            let uniforms = Uniforms {
                elapsed_time: elapsed,
                resolution: current.resolution,
            };
            match context.draw(
                program.handle(),
                geometry.handle(),
                geometry.vertex_count(),
                uniforms,
            ) {
                Ok(()) => true,
                Err(FrameError::Skip(reason)) => {
                    debug!(%reason, "skipped silk frame");
                    true
                }
                Err(FrameError::Fatal(reason)) => {
                    error!(%reason, "silk background stopped after a fatal draw error");
                    false
                }
            }
        })
    }

    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    pub fn pending_frame(&self) -> Option<AnimationHandle> {
        self.render_loop.pending()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.render_loop.frames_rendered()
    }

    pub fn current_viewport(&self) -> Viewport {
        self.viewport.current_viewport()
    }

    /// Cancels the loop, then frees the quad and the program. Idempotent; the
    /// context itself goes away when the renderer is dropped.
    pub fn release(&mut self) {
        self.render_loop.cancel(&mut self.frames);
        if let Some(geometry) = self.geometry.take() {
            geometry.release(&mut self.context);
        }
        if let Some(program) = self.program.take() {
            program.release(&mut self.context);
        }
    }

    fn apply_viewport(&mut self) {
        let current = self.viewport.current_viewport();
        self.context.set_viewport(current);
        self.applied_viewport = Some(current);
    }
}

impl<C: RenderingContext, F: FrameRequester> Drop for Renderer<C, F> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Coarse lifecycle state reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundStatus {
    /// Mounted and owning GPU resources.
    Active,
    /// Mount failed; nothing is drawn and nothing is owned.
    Inert,
    /// `teardown` ran.
    TornDown,
}

enum Slot<C: RenderingContext, F: FrameRequester> {
    Active(Renderer<C, F>),
    Inert(RendererError),
    TornDown,
}

/// The component a host mounts and unmounts.
///
/// Mounting never returns an error: every failure is logged and leaves the
/// background inert so the host keeps whatever it painted underneath.
pub struct Background<C: RenderingContext, F: FrameRequester> {
    slot: Slot<C, F>,
}

impl<C: RenderingContext, F: FrameRequester> Background<C, F> {
    pub fn mount<A>(
        acquire_context: A,
        frames: F,
        metrics: SurfaceMetrics,
        options: &RendererOptions,
        now: Instant,
    ) -> Self
    where
        A: FnOnce() -> Result<C, RendererError>,
    {
        let result = acquire_context()
            .and_then(|context| Renderer::acquire(context, frames, metrics, options, now));
        let slot = match result {
            Ok(renderer) => Slot::Active(renderer),
            Err(err @ RendererError::ContextUnavailable(_)) => {
                warn!(error = %err, "GPU rendering not supported; background stays static");
                Slot::Inert(err)
            }
            Err(err) => {
                error!(error = %err, "silk background failed to initialise; rendering nothing");
                Slot::Inert(err)
            }
        };
        Self { slot }
    }

    pub fn status(&self) -> BackgroundStatus {
        match self.slot {
            Slot::Active(_) => BackgroundStatus::Active,
            Slot::Inert(_) => BackgroundStatus::Inert,
            Slot::TornDown => BackgroundStatus::TornDown,
        }
    }

    /// Why mounting failed, if it did.
    pub fn failure(&self) -> Option<&RendererError> {
        match &self.slot {
            Slot::Inert(err) => Some(err),
            _ => None,
        }
    }

    pub fn renderer(&self) -> Option<&Renderer<C, F>> {
        match &self.slot {
            Slot::Active(renderer) => Some(renderer),
            _ => None,
        }
    }

    pub fn notify_resize(&mut self, metrics: SurfaceMetrics) {
        if let Slot::Active(renderer) = &mut self.slot {
            renderer.notify_resize(metrics);
        }
    }

    pub fn frame(&mut self, handle: AnimationHandle, now: Instant) -> FrameOutcome {
        match &mut self.slot {
            Slot::Active(renderer) => renderer.frame(handle, now),
            _ => FrameOutcome::Ignored,
        }
    }

    /// Unmounts. Synchronous: when this returns no frame is pending and every
    /// GPU object this instance created has been released. Later calls are
    /// no-ops.
    pub fn teardown(&mut self) {
        match std::mem::replace(&mut self.slot, Slot::TornDown) {
            Slot::Active(mut renderer) => {
                renderer.release();
                drop(renderer);
                info!("silk background torn down");
            }
            Slot::Inert(_) => debug!("tearing down inert silk background"),
            Slot::TornDown => {}
        }
    }
}
