use proptest::prelude::*;

use heatfield_event_model::geometry::WorldRect;
use heatfield_event_model::metric::{MetricKind, RatioRelation};
use heatfield_event_model::settings::Falloff;
use heatfield_processing_core::{
    noise_floor, CoordinateMapper, DecayKernel, HeatmapAccumulator, HeatmapKey, RatioCombiner,
};

const SIZE: usize = 64;

fn kernel() -> DecayKernel {
    let mapper =
        CoordinateMapper::new(WorldRect::new(0.0, 0.0, 640.0, 640.0), SIZE as u32, SIZE as u32)
            .unwrap();
    DecayKernel::new(mapper, 3, Falloff::Linear).unwrap()
}

fn events() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((-50.0..690.0f64, -50.0..690.0f64, 0.1..8.0f64), 1..40)
}

fn fill(metric: MetricKind, events: &[(f64, f64, f64)]) -> HeatmapAccumulator {
    let k = kernel();
    let mut heatmap = HeatmapAccumulator::new(HeatmapKey::new(metric, "R", "all"), SIZE, SIZE);
    for (tick, &(x, y, w)) in events.iter().enumerate() {
        heatmap.apply_event(&k, tick as u64, x, y, w);
    }
    heatmap
}

proptest! {
    #[test]
    fn accumulation_is_order_independent(
        (original, shuffled) in events().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let a = fill(MetricKind::Smoke, &original);
        let b = fill(MetricKind::Smoke, &shuffled);

        for (x, y) in a.cells().iter().zip(b.cells()) {
            prop_assert!((x - y).abs() <= 1e-9 * x.abs().max(1.0));
        }
        prop_assert!((a.peak() - b.peak()).abs() <= 1e-9 * a.peak().max(1.0));
        prop_assert_eq!(a.time_range(), b.time_range());
    }

    #[test]
    fn peak_is_the_largest_cell(batch in events()) {
        let heatmap = fill(MetricKind::Smoke, &batch);
        let max = heatmap.cells().iter().cloned().fold(0.0, f64::max);
        prop_assert_eq!(heatmap.peak(), max);
        prop_assert!(heatmap.cells().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn ratio_is_antisymmetric(kills in events(), deaths in events()) {
        let a = fill(MetricKind::Kills, &kills);
        let b = fill(MetricKind::Deaths, &deaths);
        let forward = RatioCombiner::combine(
            &a,
            &b,
            RatioRelation::new(MetricKind::Kills, MetricKind::Deaths).target(),
        )
        .unwrap();
        let backward = RatioCombiner::combine(
            &b,
            &a,
            RatioRelation::new(MetricKind::Deaths, MetricKind::Kills).target(),
        )
        .unwrap();

        for (f, r) in forward.cells().iter().zip(backward.cells()) {
            prop_assert_eq!(*f, -*r);
        }
        prop_assert_eq!(forward.peak(), backward.negpeak());
        prop_assert_eq!(forward.negpeak(), backward.peak());
    }

    #[test]
    fn ratio_is_zero_where_both_sides_are_quiet(kills in events(), deaths in events()) {
        let a = fill(MetricKind::Kills, &kills);
        let b = fill(MetricKind::Deaths, &deaths);
        let ratio = RatioCombiner::combine(
            &a,
            &b,
            RatioRelation::new(MetricKind::Kills, MetricKind::Deaths).target(),
        )
        .unwrap();

        let (fa, fb) = (noise_floor(a.peak()), noise_floor(b.peak()));
        for ((n, d), r) in a.cells().iter().zip(b.cells()).zip(ratio.cells()) {
            if *n < fa && *d < fb {
                prop_assert_eq!(*r, 0.0);
            } else {
                // Any non-zero ratio is at least 1 in magnitude.
                prop_assert!(*r == 0.0 || r.abs() > 1.0);
            }
        }
    }
}
