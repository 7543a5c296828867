//! Ratio heatmaps: signed comparison of two base heatmaps.
//!
//! For a relation `numerator → denominator`, every subject/grouping that
//! has both heatmaps gets a ratio heatmap. Each pixel says which side
//! dominates there and by how much: `+n/d` where the numerator is
//! stronger, `-d/n` where the denominator is.
//!
//! Both inputs are first raised to their own noise floor, so a pixel
//! with a little activity on one side and none on the other yields a
//! bounded ratio instead of a division blow-up. Where both sides are
//! below their floors the pixel is left at 0 ("no data").

use heatfield_common::error::{HeatfieldError, HeatfieldResult};
use heatfield_event_model::metric::{MetricId, RatioRelation};
use heatfield_event_model::settings::HeatmapSettings;

use crate::heatmap::{noise_floor, HeatmapAccumulator};
use crate::store::HeatmapStore;

/// Signed ratio of two pixel values against their noise floors.
///
/// Exactly antisymmetric: swapping the sides negates the result. When
/// both sides are equal after flooring neither dominates and the result
/// is 0.
pub fn ratio_value(numerator: f64, numerator_floor: f64, denominator: f64, denominator_floor: f64) -> f64 {
    if numerator < numerator_floor && denominator < denominator_floor {
        return 0.0;
    }

    let n = numerator.max(numerator_floor);
    let d = denominator.max(denominator_floor);
    if n > d {
        n / d
    } else if d > n {
        -(d / n)
    } else {
        0.0
    }
}

/// Builds ratio heatmaps for a set of declared relations.
#[derive(Debug, Clone, Default)]
pub struct RatioCombiner {
    relations: Vec<RatioRelation>,
}

impl RatioCombiner {
    pub fn new(relations: Vec<RatioRelation>) -> Self {
        Self { relations }
    }

    pub fn from_settings(settings: &HeatmapSettings) -> Self {
        Self::new(settings.ratios.clone())
    }

    pub fn relations(&self) -> &[RatioRelation] {
        &self.relations
    }

    /// Combine two base heatmaps into a fresh ratio heatmap.
    ///
    /// The result takes the subject and grouping of `numerator`, the
    /// given ratio `metric`, and the union of both time ranges. Neither
    /// input is modified.
    ///
    /// Pixels where both sides tie after flooring are left at 0 and render
    /// as no data, like pixels where both sides are below their floors.
    pub fn combine(
        numerator: &HeatmapAccumulator,
        denominator: &HeatmapAccumulator,
        metric: MetricId,
    ) -> HeatfieldResult<HeatmapAccumulator> {
        if (numerator.width(), numerator.height()) != (denominator.width(), denominator.height())
        {
            return Err(HeatfieldError::processing(format!(
                "cannot combine {}x{} heatmap with {}x{} heatmap",
                numerator.width(),
                numerator.height(),
                denominator.width(),
                denominator.height()
            )));
        }
        if numerator.is_signed() || denominator.is_signed() {
            return Err(HeatfieldError::processing(
                "ratio heatmaps can only be built from base heatmaps",
            ));
        }
        if !metric.is_ratio() {
            return Err(HeatfieldError::processing(format!(
                "{metric} is not a ratio metric"
            )));
        }

        let mut target = HeatmapAccumulator::new(
            numerator.key().with_metric(metric),
            numerator.width(),
            numerator.height(),
        );
        target.set_time_range(numerator.time_range().union(&denominator.time_range()));

        let floor_n = noise_floor(numerator.peak());
        let floor_d = noise_floor(denominator.peak());
        for (idx, (&n, &d)) in numerator
            .cells()
            .iter()
            .zip(denominator.cells())
            .enumerate()
        {
            let value = ratio_value(n, floor_n, d, floor_d);
            if value != 0.0 {
                target.put_signed(idx, value);
            }
        }

        Ok(target)
    }

    /// Build every ratio heatmap the relations call for and add them to
    /// the store. Returns how many were produced.
    ///
    /// Only base heatmaps are read, so a ratio never feeds another ratio.
    /// Re-running replaces earlier results with identical ones.
    pub fn apply(&self, store: &mut HeatmapStore) -> HeatfieldResult<usize> {
        let mut produced = Vec::new();

        for relation in &self.relations {
            let target = relation.target();
            for numerator in store.with_metric(relation.numerator.into()) {
                let sibling = numerator.key().with_metric(relation.denominator);
                let Some(denominator) = store.lookup(&sibling) else {
                    tracing::debug!(
                        metric = %target,
                        subject = %numerator.key().subject,
                        grouping = %numerator.key().grouping,
                        "No denominator heatmap; skipping ratio"
                    );
                    continue;
                };
                produced.push(Self::combine(numerator, denominator, target)?);
            }
        }

        let count = produced.len();
        for heatmap in produced {
            store.insert(heatmap);
        }

        tracing::info!(
            relations = self.relations.len(),
            ratio_heatmaps = count,
            "Combined ratio heatmaps"
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatfield_event_model::geometry::WorldRect;
    use heatfield_event_model::metric::MetricKind;
    use heatfield_event_model::settings::Falloff;

    use crate::heatmap::HeatmapKey;
    use crate::kernel::DecayKernel;
    use crate::mapper::CoordinateMapper;

    const FLOOR: f64 = 0.875;

    fn kernel() -> DecayKernel {
        let mapper =
            CoordinateMapper::new(WorldRect::new(0.0, 0.0, 1000.0, 1000.0), 100, 100).unwrap();
        DecayKernel::new(mapper, 2, Falloff::Linear).unwrap()
    }

    fn kills_vs_deaths() -> MetricId {
        RatioRelation::new(MetricKind::Kills, MetricKind::Deaths).target()
    }

    #[test]
    fn test_ratio_value_cases() {
        // Both below floor: no data.
        assert_eq!(ratio_value(0.5, FLOOR, 0.1, FLOOR), 0.0);
        // Numerator dominates.
        assert_eq!(ratio_value(3.5, FLOOR, 0.0, FLOOR), 4.0);
        // Denominator dominates.
        assert_eq!(ratio_value(0.0, FLOOR, 1.75, FLOOR), -2.0);
        // Balanced.
        assert_eq!(ratio_value(2.0, FLOOR, 2.0, FLOOR), 0.0);
        // Adaptive floor on a busy denominator.
        assert_eq!(ratio_value(8.0, FLOOR, 0.0, 4.0), 2.0);
    }

    #[test]
    fn test_ratio_value_antisymmetry() {
        let samples = [0.0, 0.3, 0.875, 1.0, 2.5, 7.0, 100.0];
        for &a in &samples {
            for &b in &samples {
                let forward = ratio_value(a, FLOOR, b, 1.5);
                let backward = ratio_value(b, 1.5, a, FLOOR);
                assert_eq!(forward, -backward, "a={a} b={b}");
            }
        }
    }

    #[test]
    fn test_combine_builds_signed_heatmap() {
        let k = kernel();
        let mut kills = HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Kills, "R", "all"), 100, 100);
        let mut deaths =
            HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Deaths, "R", "all"), 100, 100);
        kills.apply_event(&k, 10, 205.0, 205.0, 4.0);
        deaths.apply_event(&k, 20, 805.0, 805.0, 2.0);
        deaths.apply_event(&k, 5, 805.0, 805.0, 2.0);

        let ratio = RatioCombiner::combine(&kills, &deaths, kills_vs_deaths()).unwrap();
        assert!(ratio.is_signed());
        assert_eq!(ratio.key().subject, "R");
        assert_eq!(ratio.cell(20, 20), Some(4.0 / FLOOR));
        assert_eq!(ratio.cell(80, 80), Some(-(4.0 / FLOOR)));
        assert_eq!(ratio.cell(50, 50), Some(0.0));
        assert_eq!(ratio.peak(), 4.0 / FLOOR);
        assert_eq!(ratio.negpeak(), 4.0 / FLOOR);
        assert_eq!(ratio.time_range().first(), Some(5));
        assert_eq!(ratio.time_range().last(), Some(20));

        // Sources untouched.
        assert_eq!(kills.cell(20, 20), Some(4.0));
        assert_eq!(deaths.negpeak(), 0.0);
    }

    #[test]
    fn test_combine_tie_is_no_data() {
        let k = kernel();
        let mut kills = HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Kills, "R", "all"), 100, 100);
        let mut deaths =
            HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Deaths, "R", "all"), 100, 100);
        kills.apply_event(&k, 1, 505.0, 505.0, 2.0);
        deaths.apply_event(&k, 2, 505.0, 505.0, 2.0);

        let ratio = RatioCombiner::combine(&kills, &deaths, kills_vs_deaths()).unwrap();
        assert_eq!(ratio.cell(50, 50), Some(0.0));
        assert_eq!(ratio.peak(), 0.0);
        assert_eq!(ratio.negpeak(), 0.0);
    }

    #[test]
    fn test_combine_rejects_mismatch() {
        let a = HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Kills, "R", "all"), 10, 10);
        let b = HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Deaths, "R", "all"), 20, 20);
        assert!(RatioCombiner::combine(&a, &b, kills_vs_deaths()).is_err());

        let c = HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Deaths, "R", "all"), 10, 10);
        assert!(RatioCombiner::combine(&a, &c, MetricKind::Smoke.into()).is_err());
    }

    #[test]
    fn test_apply_pairs_by_subject_and_grouping() {
        let k = kernel();
        let mut store = HeatmapStore::new(100, 100);
        store
            .get(MetricKind::Kills, "R", "all")
            .apply_event(&k, 1, 500.0, 500.0, 1.0);
        store
            .get(MetricKind::Deaths, "R", "all")
            .apply_event(&k, 2, 100.0, 100.0, 1.0);
        // Kills without matching deaths for this grouping: skipped.
        store
            .get(MetricKind::Kills, "R", "T")
            .apply_event(&k, 3, 500.0, 500.0, 1.0);
        // Deaths of another subject do not pair with R.
        store
            .get(MetricKind::Deaths, "S", "T")
            .apply_event(&k, 4, 500.0, 500.0, 1.0);

        let combiner = RatioCombiner::new(RatioRelation::defaults());
        assert_eq!(combiner.apply(&mut store).unwrap(), 1);
        assert_eq!(store.ratio_count(), 1);

        let key = HeatmapKey::new(MetricKind::Kills, "R", "all").with_metric(kills_vs_deaths());
        let ratio = store.lookup(&key).unwrap();
        assert_eq!(ratio.cell(50, 50), Some(1.0 / FLOOR));
        assert_eq!(ratio.cell(10, 10), Some(-(1.0 / FLOOR)));

        // Idempotent.
        assert_eq!(combiner.apply(&mut store).unwrap(), 1);
        assert_eq!(store.ratio_count(), 1);
    }
}
