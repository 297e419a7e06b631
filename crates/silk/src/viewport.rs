use winit::dpi::{LogicalSize, PhysicalSize};

/// Densities above this are clamped; the extra fragment cost is not worth it
/// for a soft generative pattern.
pub const DEFAULT_DENSITY_CAP: f64 = 1.5;

/// Host-reported geometry of the surface the background is mounted on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    pub logical: LogicalSize<f64>,
    pub scale_factor: f64,
}

impl SurfaceMetrics {
    pub fn new(logical: LogicalSize<f64>, scale_factor: f64) -> Self {
        Self {
            logical,
            scale_factor,
        }
    }

    /// Builds metrics from the physical size and scale factor a window reports.
    pub fn from_physical(physical: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let scale_factor = sanitize_density(scale_factor);
        Self::new(physical.to_logical(scale_factor), scale_factor)
    }

    /// Size of the surface in device pixels.
    pub fn physical_size(&self) -> PhysicalSize<u32> {
        self.logical.to_physical(sanitize_density(self.scale_factor))
    }
}

/// Everything a rendering context needs to size its targets for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Device-pixel size of the presented surface.
    pub surface: PhysicalSize<u32>,
    /// Backing-store resolution the program renders at.
    pub resolution: PhysicalSize<u32>,
}

impl Viewport {
    pub fn is_drawable(&self) -> bool {
        self.surface.width > 0
            && self.surface.height > 0
            && self.resolution.width > 0
            && self.resolution.height > 0
    }
}

/// Tracks the latest surface metrics and derives the backing resolution.
///
/// Resize notifications overwrite each other; only the most recent one before
/// a frame matters.
#[derive(Debug, Clone)]
pub struct ViewportManager {
    metrics: SurfaceMetrics,
    density_cap: f64,
}

impl ViewportManager {
    pub fn new(metrics: SurfaceMetrics) -> Self {
        Self::with_density_cap(metrics, DEFAULT_DENSITY_CAP)
    }

    pub fn with_density_cap(metrics: SurfaceMetrics, density_cap: f64) -> Self {
        let density_cap = if density_cap.is_finite() && density_cap > 0.0 {
            density_cap
        } else {
            DEFAULT_DENSITY_CAP
        };
        Self {
            metrics,
            density_cap,
        }
    }

    pub fn notify_resize(&mut self, metrics: SurfaceMetrics) {
        self.metrics = metrics;
    }

    pub fn metrics(&self) -> SurfaceMetrics {
        self.metrics
    }

    pub fn density_cap(&self) -> f64 {
        self.density_cap
    }

    /// `logical size × min(density, cap)`, truncated to whole pixels.
    pub fn current_resolution(&self) -> PhysicalSize<u32> {
        let density = sanitize_density(self.metrics.scale_factor).min(self.density_cap);
        PhysicalSize::new(
            scale_dimension(self.metrics.logical.width, density),
            scale_dimension(self.metrics.logical.height, density),
        )
    }

    pub fn current_viewport(&self) -> Viewport {
        Viewport {
            surface: self.metrics.physical_size(),
            resolution: self.current_resolution(),
        }
    }
}

fn sanitize_density(density: f64) -> f64 {
    if density.is_finite() && density > 0.0 {
        density
    } else {
        1.0
    }
}

fn scale_dimension(logical: f64, density: f64) -> u32 {
    let scaled = logical * density;
    if scaled.is_finite() && scaled > 0.0 {
        scaled.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(width: f64, height: f64, density: f64) -> SurfaceMetrics {
        SurfaceMetrics::new(LogicalSize::new(width, height), density)
    }

    #[test]
    fn resolution_is_capped_at_one_and_a_half() {
        let cases = [
            (0.5, PhysicalSize::new(640, 360)),
            (1.0, PhysicalSize::new(1280, 720)),
            (2.0, PhysicalSize::new(1920, 1080)),
            (3.0, PhysicalSize::new(1920, 1080)),
        ];
        for (density, expected) in cases {
            let manager = ViewportManager::new(metrics(1280.0, 720.0, density));
            assert_eq!(manager.current_resolution(), expected, "density {density}");
        }
    }

    #[test]
    fn latest_resize_wins() {
        let mut manager = ViewportManager::new(metrics(800.0, 600.0, 1.0));
        manager.notify_resize(metrics(1024.0, 768.0, 1.0));
        manager.notify_resize(metrics(300.0, 200.0, 2.0));
        assert_eq!(manager.current_resolution(), PhysicalSize::new(450, 300));
    }

    #[test]
    fn fractional_sizes_truncate() {
        let manager = ViewportManager::new(metrics(333.0, 101.0, 1.25));
        assert_eq!(manager.current_resolution(), PhysicalSize::new(416, 126));
    }

    #[test]
    fn invalid_density_falls_back_to_one() {
        for density in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let manager = ViewportManager::new(metrics(100.0, 50.0, density));
            assert_eq!(manager.current_resolution(), PhysicalSize::new(100, 50));
        }
    }

    #[test]
    fn custom_cap_is_honoured() {
        let manager = ViewportManager::with_density_cap(metrics(100.0, 100.0, 3.0), 2.0);
        assert_eq!(manager.current_resolution(), PhysicalSize::new(200, 200));
        let fallback = ViewportManager::with_density_cap(metrics(100.0, 100.0, 3.0), 0.0);
        assert_eq!(fallback.density_cap(), DEFAULT_DENSITY_CAP);
    }

    #[test]
    fn viewport_tracks_physical_surface_separately() {
        let manager = ViewportManager::new(metrics(1000.0, 500.0, 2.0));
        let viewport = manager.current_viewport();
        assert_eq!(viewport.surface, PhysicalSize::new(2000, 1000));
        assert_eq!(viewport.resolution, PhysicalSize::new(1500, 750));
        assert!(viewport.is_drawable());
        let empty = ViewportManager::new(metrics(0.0, 500.0, 1.0)).current_viewport();
        assert!(!empty.is_drawable());
    }
}
