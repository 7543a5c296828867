//! Distance decay: how much of an event reaches a neighboring pixel.
//!
//! The spread is evaluated on the square of pixel offsets `[-R, R]²`
//! around the event's base pixel. For every offset the neighbor pixel's
//! real world position is recovered and compared against the event's
//! exact position, so the falloff works at finer than pixel resolution
//! and stays round even when world units per pixel differ between axes.

use heatfield_common::error::{HeatfieldError, HeatfieldResult};
use heatfield_event_model::geometry::WorldPoint;
use heatfield_event_model::settings::{Falloff, HeatmapSettings};

use crate::mapper::CoordinateMapper;

/// Per-pixel contribution rule for one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayKernel {
    mapper: CoordinateMapper,
    spread_radius: u32,
    decay_radius: f64,
    falloff: Falloff,
}

impl DecayKernel {
    pub fn new(
        mapper: CoordinateMapper,
        spread_radius: u32,
        falloff: Falloff,
    ) -> HeatfieldResult<Self> {
        if spread_radius == 0 {
            return Err(HeatfieldError::config("spread radius must be positive"));
        }
        let decay_radius = mapper.pixel_area() * (spread_radius as f64).powi(2);
        if !decay_radius.is_finite() || decay_radius <= 0.0 {
            return Err(HeatfieldError::config(format!(
                "decay radius {decay_radius} is not usable"
            )));
        }
        Ok(Self {
            mapper,
            spread_radius,
            decay_radius,
            falloff,
        })
    }

    pub fn from_settings(settings: &HeatmapSettings) -> HeatfieldResult<Self> {
        Self::new(
            CoordinateMapper::from_settings(settings)?,
            settings.spread_radius,
            settings.falloff,
        )
    }

    /// Contribution of an event of `weight` at `origin` to the pixel at
    /// `offset` from the event's `base` pixel.
    ///
    /// The base pixel itself always receives the full weight. Neighbors at
    /// or beyond the decay radius (the corners of the square) receive 0.
    pub fn contribution(
        &self,
        origin: WorldPoint,
        base: (i64, i64),
        offset: (i64, i64),
        weight: f64,
    ) -> f64 {
        if offset == (0, 0) {
            return weight;
        }

        let (alt_x, alt_y) = self.mapper.raster_to_world(
            base.0.saturating_add(offset.0) as f64,
            base.1.saturating_add(offset.1) as f64,
        );
        let dist = origin.distance_sq(&WorldPoint::new(alt_x, alt_y));
        if dist.is_nan() || dist >= self.decay_radius {
            return 0.0;
        }

        match self.falloff {
            Falloff::Linear => weight * (self.decay_radius - dist) / self.decay_radius,
            Falloff::SquareRoot => weight * ((self.decay_radius - dist) / self.decay_radius).sqrt(),
        }
    }

    /// Every offset of the spread square, row by row.
    pub fn offsets(&self) -> impl Iterator<Item = (i64, i64)> {
        let r = self.spread_radius as i64;
        (-r..=r).flat_map(move |dy| (-r..=r).map(move |dx| (dx, dy)))
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Squared world distance at which contributions reach zero.
    pub fn decay_radius(&self) -> f64 {
        self.decay_radius
    }

    pub fn spread_radius(&self) -> u32 {
        self.spread_radius
    }

    pub fn falloff(&self) -> Falloff {
        self.falloff
    }
}
