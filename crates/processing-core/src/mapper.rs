//! World ↔ raster coordinate mapping.

use heatfield_common::error::{HeatfieldError, HeatfieldResult};
use heatfield_event_model::geometry::WorldRect;
use heatfield_event_model::settings::HeatmapSettings;

/// Affine transform between the world rectangle and the pixel grid.
///
/// Raster `(0, 0)` is the top-left pixel and corresponds to
/// `(xmin, ymin)`. Negative world extents flip the corresponding axis;
/// that is the configured orientation, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    world: WorldRect,
    width: u32,
    height: u32,
}

impl CoordinateMapper {
    /// Create a mapper, rejecting empty rasters and zero-area worlds.
    pub fn new(world: WorldRect, width: u32, height: u32) -> HeatfieldResult<Self> {
        if width == 0 || height == 0 {
            return Err(HeatfieldError::config(format!(
                "raster dimensions must be positive, got {width}x{height}"
            )));
        }
        if world.is_degenerate() {
            return Err(HeatfieldError::config(format!(
                "world rectangle ({}, {})-({}, {}) has zero area",
                world.xmin, world.ymin, world.xmax, world.ymax
            )));
        }
        Ok(Self {
            world,
            width,
            height,
        })
    }

    pub fn from_settings(settings: &HeatmapSettings) -> HeatfieldResult<Self> {
        Self::new(settings.world, settings.width, settings.height)
    }

    /// Pixel containing a world position. Not range-checked.
    pub fn world_to_raster(&self, x: f64, y: f64) -> (i64, i64) {
        let px = (x - self.world.xmin) * self.width as f64 / self.world.width();
        let py = (y - self.world.ymin) * self.height as f64 / self.world.height();
        (px.floor() as i64, py.floor() as i64)
    }

    /// World position of a (possibly fractional) raster coordinate.
    pub fn raster_to_world(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.world.width() * px / self.width as f64 + self.world.xmin,
            self.world.height() * py / self.height as f64 + self.world.ymin,
        )
    }

    /// Whether a pixel lies inside the grid.
    pub fn contains(&self, px: i64, py: i64) -> bool {
        px >= 0 && py >= 0 && px < self.width as i64 && py < self.height as i64
    }

    /// World area covered by one pixel.
    pub fn pixel_area(&self) -> f64 {
        (self.world.width() * self.world.height() / (self.width as f64 * self.height as f64)).abs()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn world(&self) -> WorldRect {
        self.world
    }
}
