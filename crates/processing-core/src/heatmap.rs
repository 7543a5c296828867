//! Heatmap accumulators: dense intensity grids with running statistics.

use serde::{Deserialize, Serialize};

use heatfield_event_model::geometry::WorldPoint;
use heatfield_event_model::metric::MetricId;
use heatfield_event_model::record::Tick;

use crate::kernel::DecayKernel;

/// Lower bound of the adaptive noise floor.
pub const NOISE_FLOOR_MIN: f64 = 0.875;

/// The floor rises to `peak / NOISE_FLOOR_DIVISOR` for busy heatmaps.
pub const NOISE_FLOOR_DIVISOR: f64 = 16.0;

/// Values at or below this threshold are treated as "no data".
pub fn noise_floor(peak: f64) -> f64 {
    NOISE_FLOOR_MIN.max(peak / NOISE_FLOOR_DIVISOR)
}

/// Identity of a heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeatmapKey {
    pub metric: MetricId,
    pub subject: String,
    pub grouping: String,
}

impl HeatmapKey {
    pub fn new(
        metric: impl Into<MetricId>,
        subject: impl Into<String>,
        grouping: impl Into<String>,
    ) -> Self {
        Self {
            metric: metric.into(),
            subject: subject.into(),
            grouping: grouping.into(),
        }
    }

    /// Same subject and grouping under a different metric.
    pub fn with_metric(&self, metric: impl Into<MetricId>) -> Self {
        Self {
            metric: metric.into(),
            subject: self.subject.clone(),
            grouping: self.grouping.clone(),
        }
    }
}

/// First and last tick observed by a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    first: Tick,
    last: Tick,
}

impl TimeRange {
    /// Nothing observed yet: `first` starts above and `last` below any tick.
    pub const EMPTY: TimeRange = TimeRange {
        first: Tick::MAX,
        last: Tick::MIN,
    };

    pub fn observe(&mut self, tick: Tick) {
        self.first = self.first.min(tick);
        self.last = self.last.max(tick);
    }

    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    pub fn first(&self) -> Option<Tick> {
        (!self.is_empty()).then_some(self.first)
    }

    pub fn last(&self) -> Option<Tick> {
        (!self.is_empty()).then_some(self.last)
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &TimeRange) -> TimeRange {
        TimeRange {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A single heatmap: a row-major grid of intensities plus peak statistics.
///
/// Base heatmaps only ever grow through [`apply_event`](Self::apply_event).
/// Ratio heatmaps are built once by the ratio combiner and may hold
/// negative values; `negpeak` tracks their largest magnitude.
#[derive(Debug, Clone)]
pub struct HeatmapAccumulator {
    key: HeatmapKey,
    width: usize,
    height: usize,
    cells: Vec<f64>,
    peak: f64,
    negpeak: f64,
    time_range: TimeRange,
    events: usize,
}

impl HeatmapAccumulator {
    /// A zeroed heatmap of the given raster size.
    pub fn new(key: HeatmapKey, width: usize, height: usize) -> Self {
        Self {
            key,
            width,
            height,
            cells: vec![0.0; width * height],
            peak: 0.0,
            negpeak: 0.0,
            time_range: TimeRange::EMPTY,
            events: 0,
        }
    }

    /// Spread one event over the grid.
    ///
    /// Pixels that fall off the grid are skipped silently; there is no
    /// wraparound. Positions that are not finite, or so far off the map
    /// that the spread cannot reach the grid, touch no pixel at all. The
    /// weight must already be filtered to a positive, finite value.
    pub fn apply_event(&mut self, kernel: &DecayKernel, tick: Tick, x: f64, y: f64, weight: f64) {
        debug_assert!(!self.is_signed(), "ratio heatmaps are not fed events");
        debug_assert!(weight >= 0.0, "negative weight {weight}");
        debug_assert_eq!(kernel.mapper().width() as usize, self.width);
        debug_assert_eq!(kernel.mapper().height() as usize, self.height);

        self.time_range.observe(tick);
        self.events += 1;

        if !x.is_finite() || !y.is_finite() {
            return;
        }

        let mapper = kernel.mapper();
        let origin = WorldPoint::new(x, y);
        let base = mapper.world_to_raster(x, y);

        let reach = kernel.spread_radius() as i64;
        if base.0 < -reach
            || base.1 < -reach
            || base.0 >= self.width as i64 + reach
            || base.1 >= self.height as i64 + reach
        {
            return;
        }

        for (dx, dy) in kernel.offsets() {
            let (Some(px), Some(py)) = (base.0.checked_add(dx), base.1.checked_add(dy)) else {
                continue;
            };
            if !mapper.contains(px, py) {
                continue;
            }
            let amount = kernel.contribution(origin, base, (dx, dy), weight);
            if amount == 0.0 {
                continue;
            }

            let idx = py as usize * self.width + px as usize;
            let value = self.cells[idx] + amount;
            self.cells[idx] = value;
            self.peak = self.peak.max(value);
        }
    }

    /// Store a finished ratio value. Only used while building ratio heatmaps.
    pub(crate) fn put_signed(&mut self, idx: usize, value: f64) {
        self.cells[idx] = value;
        if value > 0.0 {
            self.peak = self.peak.max(value);
        } else if value < 0.0 {
            self.negpeak = self.negpeak.max(-value);
        }
    }

    pub(crate) fn set_time_range(&mut self, range: TimeRange) {
        self.time_range = range;
    }

    /// Value at a pixel, or `None` outside the grid.
    pub fn cell(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    /// Row-major grid values.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn key(&self) -> &HeatmapKey {
        &self.key
    }

    /// Whether the heatmap holds signed (ratio) data.
    pub fn is_signed(&self) -> bool {
        self.key.metric.is_ratio()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Largest value written.
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Largest magnitude of a negative value; always 0 for base heatmaps.
    pub fn negpeak(&self) -> f64 {
        self.negpeak
    }

    pub fn floor_peak(&self) -> f64 {
        noise_floor(self.peak)
    }

    pub fn floor_negpeak(&self) -> f64 {
        noise_floor(self.negpeak)
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    /// Number of events applied.
    pub fn event_count(&self) -> usize {
        self.events
    }
}
