//! CPU rendition of the silk pattern for still exports and previews.

use std::path::Path;

use anyhow::{bail, Context, Result};
use image::{Rgb, RgbImage};
use tracing::info;
use winit::dpi::PhysicalSize;

use crate::shading;

/// Renders one frame at `time` seconds, sampling each pixel at its centre.
///
/// Row 0 of the returned image is the top of the frame, matching what the GPU
/// path presents.
pub fn render_still(resolution: PhysicalSize<u32>, time: f32) -> RgbImage {
    let PhysicalSize { width, height } = resolution;
    let size = [width as f32, height as f32];
    RgbImage::from_fn(width, height, |x, y| {
        let frag_coord = [x as f32 + 0.5, (height - 1 - y) as f32 + 0.5];
        let [r, g, b] = shading::shade(frag_coord, size, time);
        Rgb([to_byte(r), to_byte(g), to_byte(b)])
    })
}

/// Renders a still and writes it to `path`; the format follows the extension.
pub fn export_still(path: &Path, resolution: PhysicalSize<u32>, time: f32) -> Result<()> {
    if resolution.width == 0 || resolution.height == 0 {
        bail!(
            "cannot export a {}x{} still",
            resolution.width,
            resolution.height
        );
    }
    if !time.is_finite() || time < 0.0 {
        bail!("still time must be a non-negative number of seconds, got {time}");
    }

    let frame = render_still(resolution, time);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    frame
        .save(path)
        .with_context(|| format!("failed to write still to {}", path.display()))?;
    info!(
        path = %path.display(),
        width = resolution.width,
        height = resolution.height,
        time,
        "exported silk still"
    );
    Ok(())
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
