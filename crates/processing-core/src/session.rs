//! One processing run: settings, kernel and the heatmaps being filled.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use heatfield_common::error::{HeatfieldError, HeatfieldResult};
use heatfield_event_model::event::{expand_records, ExpansionStats, SpatialEvent};
use heatfield_event_model::record::GameRecord;
use heatfield_event_model::settings::HeatmapSettings;

use crate::heatmap::{HeatmapAccumulator, HeatmapKey};
use crate::kernel::DecayKernel;
use crate::ratio::RatioCombiner;
use crate::store::HeatmapStore;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Records read, including skipped warmup records.
    pub records: usize,
    /// Events applied to heatmaps.
    pub events: usize,
    /// Events and extractions dropped for an unusable weight or position.
    pub dropped: usize,
    /// Base heatmaps.
    pub accumulators: usize,
    /// Ratio heatmaps.
    pub ratio_accumulators: usize,
}

/// Owns everything a single heatmap run needs.
///
/// Feed it events (or records), then call [`finish`](Self::finish) to run
/// the ratio pass and take the finished store.
#[derive(Debug)]
pub struct ProcessingSession {
    settings: HeatmapSettings,
    kernel: DecayKernel,
    store: HeatmapStore,
    stats: SessionStats,
}

impl ProcessingSession {
    /// Validate the settings and prepare an empty store.
    pub fn new(settings: HeatmapSettings) -> HeatfieldResult<Self> {
        settings
            .validate()
            .map_err(|e| HeatfieldError::config(e.to_string()))?;
        let kernel = DecayKernel::from_settings(&settings)?;
        let store = HeatmapStore::new(settings.width as usize, settings.height as usize);

        tracing::debug!(
            width = settings.width,
            height = settings.height,
            spread_radius = settings.spread_radius,
            decay_radius = kernel.decay_radius(),
            falloff = ?settings.falloff,
            "Processing session ready"
        );

        Ok(Self {
            settings,
            kernel,
            store,
            stats: SessionStats::default(),
        })
    }

    /// Apply one event. Returns `false` if its weight or position was
    /// unusable.
    pub fn ingest(&mut self, event: &SpatialEvent) -> bool {
        if !self.accept(event) {
            return false;
        }

        self.store
            .get(event.metric, &event.subject, &event.grouping)
            .apply_event(
                &self.kernel,
                event.tick,
                event.position.x,
                event.position.y,
                event.weight,
            );
        self.stats.events += 1;
        true
    }

    /// Apply events in order. Returns how many were applied.
    pub fn ingest_all<'a>(&mut self, events: impl IntoIterator<Item = &'a SpatialEvent>) -> usize {
        events
            .into_iter()
            .filter(|event| self.ingest(event))
            .count()
    }

    /// Expand records through the metric table and apply the events.
    pub fn ingest_records(&mut self, records: &[GameRecord]) -> ExpansionStats {
        self.ingest_expanded(records, false)
    }

    /// [`ingest_records`](Self::ingest_records) on top of
    /// [`ingest_partitioned`](Self::ingest_partitioned).
    pub fn ingest_records_partitioned(&mut self, records: &[GameRecord]) -> ExpansionStats {
        self.ingest_expanded(records, true)
    }

    fn ingest_expanded(&mut self, records: &[GameRecord], partitioned: bool) -> ExpansionStats {
        let (events, expansion) = expand_records(records);
        self.stats.records += expansion.records;
        self.stats.dropped += expansion.dropped;
        let applied = if partitioned {
            self.ingest_partitioned(&events)
        } else {
            self.ingest_all(&events)
        };

        tracing::info!(
            partitioned,
            records = expansion.records,
            warmup_skipped = expansion.warmup_skipped,
            events = applied,
            heatmaps = self.store.len(),
            "Ingested records"
        );
        expansion
    }

    /// Like [`ingest_all`](Self::ingest_all), but each heatmap is filled on
    /// its own rayon worker.
    ///
    /// Events are grouped by heatmap first; each group keeps its input
    /// order. Since pixel sums do not depend on order the result matches
    /// sequential ingestion.
    pub fn ingest_partitioned(&mut self, events: &[SpatialEvent]) -> usize {
        let mut groups: BTreeMap<HeatmapKey, Vec<&SpatialEvent>> = BTreeMap::new();
        for event in events {
            if !self.accept(event) {
                continue;
            }
            groups
                .entry(HeatmapKey::new(event.metric, &event.subject, &event.grouping))
                .or_default()
                .push(event);
        }

        let mut work = Vec::with_capacity(groups.len());
        for (key, group) in groups {
            let heatmap = self.store.take(&key).unwrap_or_else(|| {
                HeatmapAccumulator::new(key, self.store.width(), self.store.height())
            });
            work.push((heatmap, group));
        }

        let kernel = &self.kernel;
        let filled: Vec<_> = work
            .into_par_iter()
            .map(|(mut heatmap, group)| {
                for event in &group {
                    heatmap.apply_event(
                        kernel,
                        event.tick,
                        event.position.x,
                        event.position.y,
                        event.weight,
                    );
                }
                (heatmap, group.len())
            })
            .collect();

        let mut applied = 0;
        for (heatmap, count) in filled {
            applied += count;
            self.store.insert(heatmap);
        }
        self.stats.events += applied;

        tracing::debug!(events = applied, heatmaps = self.store.len(), "Partitioned ingest done");
        applied
    }

    /// Count and log events that cannot reach a heatmap.
    fn accept(&mut self, event: &SpatialEvent) -> bool {
        if event.is_usable() {
            return true;
        }
        tracing::debug!(
            subject = %event.subject,
            metric = %event.metric.slug(),
            weight = event.weight,
            x = event.position.x,
            y = event.position.y,
            "Dropping event with unusable weight or position"
        );
        self.stats.dropped += 1;
        false
    }

    /// Run the ratio pass and hand back the finished heatmaps.
    pub fn finish(mut self) -> HeatfieldResult<(HeatmapStore, SessionStats)> {
        RatioCombiner::from_settings(&self.settings).apply(&mut self.store)?;

        self.stats.ratio_accumulators = self.store.ratio_count();
        self.stats.accumulators = self.store.len() - self.stats.ratio_accumulators;

        tracing::info!(
            records = self.stats.records,
            events = self.stats.events,
            dropped = self.stats.dropped,
            accumulators = self.stats.accumulators,
            ratio_accumulators = self.stats.ratio_accumulators,
            "Processing session finished"
        );
        Ok((self.store, self.stats))
    }

    pub fn settings(&self) -> &HeatmapSettings {
        &self.settings
    }

    pub fn kernel(&self) -> &DecayKernel {
        &self.kernel
    }

    /// Heatmaps filled so far. Ratio heatmaps appear only after `finish`.
    pub fn store(&self) -> &HeatmapStore {
        &self.store
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}
