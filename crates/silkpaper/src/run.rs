//! Opens the host window, mounts the silk background on it, and pumps winit
//! events into the background until the window closes. Still exports skip the
//! window entirely and render on the CPU.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use silk::still::export_still;
use silk::{
    Background, BackgroundStatus, GpuOptions, RendererOptions, SurfaceMetrics, WgpuContext,
};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::{Settings, StillRequest, SurfaceSize};
use crate::frames::RedrawQueue;

const DEFAULT_FILTER: &str =
    "warn,silkpaper=info,silk=info,naga=error,wgpu=error,wgpu_core=error,wgpu_hal=error,winit=error";

/// `RUST_LOG` wins, then the config file's `log_filter`, then the built-in default.
pub fn initialise_tracing(config_filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| config_filter.and_then(|directives| EnvFilter::try_new(directives).ok()))
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(settings: Settings) -> Result<()> {
    tracing::debug!(
        config = ?settings.config_path,
        width = settings.size.width,
        height = settings.size.height,
        density_cap = settings.density_cap,
        power = ?settings.power,
        "resolved silkpaper settings"
    );

    if let Some(still) = &settings.still {
        return run_still(settings.size, still);
    }
    run_window(settings)
}

fn run_still(size: SurfaceSize, still: &StillRequest) -> Result<()> {
    export_still(
        &still.path,
        PhysicalSize::new(size.width, size.height),
        still.time,
    )
}

fn run_window(settings: Settings) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window = WindowBuilder::new()
        .with_title(settings.title.as_str())
        .with_inner_size(PhysicalSize::new(settings.size.width, settings.size.height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let redraw_window = window.clone();
    let frames = RedrawQueue::new(move || redraw_window.request_redraw());
    let metrics = SurfaceMetrics::from_physical(window.inner_size(), window.scale_factor());
    let gpu_options = GpuOptions {
        power: settings.power,
    };
    let options = RendererOptions {
        density_cap: settings.density_cap,
        ..RendererOptions::default()
    };

    let context_window = window.clone();
    let mut background = Background::mount(
        move || WgpuContext::new(context_window, &gpu_options),
        frames.clone(),
        metrics,
        &options,
        Instant::now(),
    );
    if background.status() == BackgroundStatus::Inert {
        tracing::info!("window stays blank; close it to exit");
    }

    let run_result = event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);
        match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    background.teardown();
                    elwt.exit();
                }
                WindowEvent::Resized(size) => {
                    background
                        .notify_resize(SurfaceMetrics::from_physical(size, window.scale_factor()));
                }
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    background.notify_resize(SurfaceMetrics::from_physical(
                        window.inner_size(),
                        scale_factor,
                    ));
                }
                WindowEvent::RedrawRequested => {
                    if frames.is_empty() {
                        return;
                    }
                    let now = Instant::now();
                    for handle in frames.drain() {
                        background.frame(handle, now);
                    }
                }
                _ => {}
            },
            Event::LoopExiting => background.teardown(),
            _ => {}
        }
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
