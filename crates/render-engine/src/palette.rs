//! Color ramps: mapping a magnitude onto a low → high RGBA gradient.

use image::Rgba;

use heatfield_event_model::settings::ColorRamp;
use heatfield_processing_core::noise_floor;

/// Fully transparent pixel used for "no data".
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Magnitude range a ramp is stretched over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampBounds {
    pub min: f64,
    pub max: f64,
}

impl RampBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// From the noise floor of `peak` up to `peak` itself.
    pub fn for_peak(peak: f64) -> Self {
        Self::new(noise_floor(peak), peak)
    }

    /// Nothing rises above the floor, so every pixel is transparent.
    pub fn is_empty(&self) -> bool {
        self.max <= self.min
    }
}

/// Color of one magnitude.
///
/// Values at or below `bounds.min` are transparent. Values above
/// `bounds.max` are clamped, so `max` itself gets exactly the high color.
pub fn shade(ramp: &ColorRamp, bounds: RampBounds, magnitude: f64) -> Rgba<u8> {
    let m = magnitude.min(bounds.max);
    if m <= bounds.min {
        return TRANSPARENT;
    }

    let t = (m - bounds.min) / (bounds.max - bounds.min);
    let mut out = [0u8; 4];
    for (channel, (&lo, &hi)) in out.iter_mut().zip(ramp.low.iter().zip(&ramp.high)) {
        let (lo, hi) = (lo as f64, hi as f64);
        *channel = (lo + (hi - lo) * t) as u8;
    }
    Rgba(out)
}
