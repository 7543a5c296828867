//! Spatial events: the unit of input the heatmap engine consumes.
//!
//! Records are expanded into events through the metric table. Each usable
//! contribution becomes two events: one for the "all" grouping and one for
//! the subject's team.

use serde::{Deserialize, Serialize};

use crate::geometry::WorldPoint;
use crate::metric::MetricKind;
use crate::record::{GameRecord, Tick};

/// Grouping tag that aggregates every team.
pub const ALL_GROUPING: &str = "all";

/// One weighted position destined for a single heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialEvent {
    pub tick: Tick,
    pub subject: String,
    pub position: WorldPoint,
    pub weight: f64,
    pub metric: MetricKind,
    pub grouping: String,
}

impl SpatialEvent {
    /// Whether the weight can contribute to a heatmap.
    pub fn has_usable_weight(&self) -> bool {
        is_usable_weight(self.weight)
    }

    /// Whether both coordinates are finite numbers.
    pub fn has_finite_position(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite()
    }

    /// Whether the event can be applied to a heatmap at all.
    pub fn is_usable(&self) -> bool {
        self.has_usable_weight() && self.has_finite_position()
    }
}

/// Zero, negative and non-finite weights are dropped before accumulation.
pub fn is_usable_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

/// Counters gathered while expanding records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionStats {
    /// Records examined.
    pub records: usize,
    /// Records skipped because they happened during warmup.
    pub warmup_skipped: usize,
    /// Metric extractions rejected for an unusable weight.
    pub dropped: usize,
    /// Events produced.
    pub events: usize,
}

/// Expand a single record into events for every metric that reads it.
pub fn expand_record(record: &GameRecord, out: &mut Vec<SpatialEvent>) -> usize {
    let mut dropped = 0;
    for metric in MetricKind::ALL {
        let Some(contribution) = metric.extract(record) else {
            continue;
        };
        if !is_usable_weight(contribution.weight) {
            dropped += 1;
            continue;
        }

        let subject = contribution.actor.subject().to_string();
        for grouping in [ALL_GROUPING, contribution.actor.team.as_str()] {
            out.push(SpatialEvent {
                tick: record.tick,
                subject: subject.clone(),
                position: contribution.position,
                weight: contribution.weight,
                metric,
                grouping: grouping.to_string(),
            });
        }
    }
    dropped
}

/// Expand records into events, skipping warmup.
pub fn expand_records(records: &[GameRecord]) -> (Vec<SpatialEvent>, ExpansionStats) {
    let mut events = Vec::with_capacity(records.len() * 2);
    let mut stats = ExpansionStats {
        records: records.len(),
        ..Default::default()
    };

    for record in records {
        if record.is_warmup() {
            stats.warmup_skipped += 1;
            continue;
        }
        stats.dropped += expand_record(record, &mut events);
    }

    stats.events = events.len();
    (events, stats)
}
