//! The per-run collection of heatmaps.

use std::collections::BTreeMap;

use heatfield_event_model::metric::MetricId;

use crate::heatmap::{HeatmapAccumulator, HeatmapKey};

/// Heatmaps of one processing run, keyed by identity.
///
/// Heatmaps are created on first reference and never removed while the
/// run lasts. Iteration is ordered by key, so output is deterministic.
#[derive(Debug, Clone)]
pub struct HeatmapStore {
    width: usize,
    height: usize,
    heatmaps: BTreeMap<HeatmapKey, HeatmapAccumulator>,
}

impl HeatmapStore {
    /// An empty store whose heatmaps all share one raster size.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            heatmaps: BTreeMap::new(),
        }
    }

    /// The heatmap for an identity, created zeroed if unseen.
    pub fn get(
        &mut self,
        metric: impl Into<MetricId>,
        subject: &str,
        grouping: &str,
    ) -> &mut HeatmapAccumulator {
        self.get_or_create(HeatmapKey::new(metric, subject, grouping))
    }

    /// The heatmap for a key, created zeroed if unseen.
    pub fn get_or_create(&mut self, key: HeatmapKey) -> &mut HeatmapAccumulator {
        let (width, height) = (self.width, self.height);
        self.heatmaps
            .entry(key)
            .or_insert_with_key(|key| HeatmapAccumulator::new(key.clone(), width, height))
    }

    /// Look up a heatmap without creating it.
    pub fn lookup(&self, key: &HeatmapKey) -> Option<&HeatmapAccumulator> {
        self.heatmaps.get(key)
    }

    /// Register a finished heatmap, returning any heatmap it replaces.
    pub fn insert(&mut self, heatmap: HeatmapAccumulator) -> Option<HeatmapAccumulator> {
        debug_assert_eq!((heatmap.width(), heatmap.height()), (self.width, self.height));
        self.heatmaps.insert(heatmap.key().clone(), heatmap)
    }

    /// Take a heatmap out temporarily, e.g. to fill it on another thread.
    pub(crate) fn take(&mut self, key: &HeatmapKey) -> Option<HeatmapAccumulator> {
        self.heatmaps.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeatmapKey, &HeatmapAccumulator)> {
        self.heatmaps.iter()
    }

    pub fn heatmaps(&self) -> impl Iterator<Item = &HeatmapAccumulator> {
        self.heatmaps.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &HeatmapKey> {
        self.heatmaps.keys()
    }

    /// Heatmaps of a given metric.
    pub fn with_metric(&self, metric: MetricId) -> impl Iterator<Item = &HeatmapAccumulator> {
        self.heatmaps
            .values()
            .filter(move |heatmap| heatmap.key().metric == metric)
    }

    pub fn len(&self) -> usize {
        self.heatmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heatmaps.is_empty()
    }

    /// Number of ratio heatmaps.
    pub fn ratio_count(&self) -> usize {
        self.keys().filter(|key| key.metric.is_ratio()).count()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatfield_event_model::metric::MetricKind;

    #[test]
    fn test_get_creates_lazily() {
        let mut store = HeatmapStore::new(8, 8);
        assert!(store.is_empty());

        let heatmap = store.get(MetricKind::Smoke, "Rosuav", "all");
        assert_eq!(heatmap.peak(), 0.0);
        assert_eq!(heatmap.cells().len(), 64);
        assert_eq!(store.len(), 1);

        // Same identity returns the same heatmap.
        store.get(MetricKind::Smoke, "Rosuav", "all");
        assert_eq!(store.len(), 1);

        store.get(MetricKind::Smoke, "Rosuav", "T");
        store.get(MetricKind::Smoke, "Stephen", "all");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_lookup_does_not_create() {
        let store = HeatmapStore::new(4, 4);
        let key = HeatmapKey::new(MetricKind::Kills, "Rosuav", "all");
        assert!(store.lookup(&key).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_replaces() {
        let mut store = HeatmapStore::new(4, 4);
        let key = HeatmapKey::new(MetricKind::Kills, "Rosuav", "all");
        assert!(store.insert(HeatmapAccumulator::new(key.clone(), 4, 4)).is_none());
        assert!(store.insert(HeatmapAccumulator::new(key, 4, 4)).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut store = HeatmapStore::new(2, 2);
        store.get(MetricKind::Deaths, "b", "all");
        store.get(MetricKind::Smoke, "a", "all");
        store.get(MetricKind::Smoke, "a", "T");
        let subjects: Vec<_> = store
            .keys()
            .map(|k| (k.metric.slug(), k.grouping.clone()))
            .collect();
        assert_eq!(
            subjects,
            vec![
                ("smoke".to_string(), "T".to_string()),
                ("smoke".to_string(), "all".to_string()),
                ("deaths".to_string(), "all".to_string()),
            ]
        );
        assert_eq!(store.with_metric(MetricKind::Smoke.into()).count(), 2);
        assert_eq!(store.ratio_count(), 0);
    }
}
