use std::path::PathBuf;

use heatfield_event_model::event::SpatialEvent;
use heatfield_event_model::geometry::{WorldPoint, WorldRect};
use heatfield_event_model::metric::{MetricKind, RatioRelation};
use heatfield_event_model::record::{load_records, GameRecord};
use heatfield_event_model::settings::HeatmapSettings;
use heatfield_processing_core::{HeatmapKey, ProcessingSession};

fn load_fixture_records() -> Vec<GameRecord> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-match")
        .join("records.jsonl");

    load_records(path).expect("fixture records should parse")
}

fn small_settings() -> HeatmapSettings {
    HeatmapSettings {
        width: 100,
        height: 100,
        world: WorldRect::new(0.0, 0.0, 1000.0, 1000.0),
        spread_radius: 2,
        ..Default::default()
    }
}

#[test]
fn single_event_scenario_on_small_grid() {
    let mut session = ProcessingSession::new(small_settings()).unwrap();
    assert_eq!(session.kernel().decay_radius(), 400.0);

    session.ingest(&SpatialEvent {
        tick: 7,
        subject: "Rosuav".to_string(),
        position: WorldPoint::new(500.0, 500.0),
        weight: 1.0,
        metric: MetricKind::Smoke,
        grouping: "all".to_string(),
    });
    let (store, stats) = session.finish().unwrap();
    assert_eq!(stats.events, 1);
    assert_eq!(store.len(), 1);

    let heatmap = store
        .lookup(&HeatmapKey::new(MetricKind::Smoke, "Rosuav", "all"))
        .unwrap();
    assert_eq!(heatmap.cell(50, 50), Some(1.0));
    assert_eq!(heatmap.peak(), 1.0);
    assert_eq!(heatmap.negpeak(), 0.0);

    // Every pixel at or beyond the decay radius stays untouched.
    for row in 0..100usize {
        for col in 0..100usize {
            let dx = col as f64 * 10.0 - 500.0;
            let dy = row as f64 * 10.0 - 500.0;
            if (col, row) != (50, 50) && dx * dx + dy * dy >= 400.0 {
                assert_eq!(heatmap.cell(col, row), Some(0.0), "pixel ({col}, {row})");
            }
        }
    }
    assert_eq!(heatmap.time_range().first(), Some(7));
    assert_eq!(heatmap.time_range().last(), Some(7));
}

#[test]
fn fixture_match_produces_expected_heatmaps() {
    let records = load_fixture_records();
    assert_eq!(records.len(), 10);

    let mut session = ProcessingSession::new(HeatmapSettings::default()).unwrap();
    let expansion = session.ingest_records(&records);
    assert_eq!(expansion.warmup_skipped, 1);
    assert_eq!(expansion.dropped, 2);
    assert_eq!(expansion.events, 20);

    let (store, stats) = session.finish().unwrap();
    assert_eq!(stats.records, 10);
    assert_eq!(stats.events, 20);
    assert_eq!(stats.dropped, 2);
    assert_eq!(stats.accumulators, 18);
    assert_eq!(stats.ratio_accumulators, 4);

    // The first word of the name is the subject; z is ignored.
    let smoke = store
        .lookup(&HeatmapKey::new(MetricKind::Smoke, "Rosuav", "T"))
        .unwrap();
    assert_eq!(smoke.cell(512, 512), Some(1.0));
    assert_eq!(smoke.time_range().first(), Some(2000));

    // Team flashes and self kills feed nothing.
    assert!(store
        .lookup(&HeatmapKey::new(MetricKind::FlashPop, "Rosuav", "all"))
        .is_some_and(|h| h.event_count() == 1));
    assert!(store
        .lookup(&HeatmapKey::new(MetricKind::Kills, "Kim", "all"))
        .is_none());
    assert!(store
        .lookup(&HeatmapKey::new(MetricKind::Deaths, "Stephen", "CT"))
        .is_some_and(|h| h.event_count() == 2));

    // Rosuav killed from the same spot the smoke landed and died nearby.
    let ratio_key = HeatmapKey::new(
        RatioRelation::new(MetricKind::Kills, MetricKind::Deaths).target(),
        "Rosuav",
        "all",
    );
    let ratio = store.lookup(&ratio_key).unwrap();
    assert!(ratio.is_signed());
    assert!(ratio.cell(512, 512).unwrap() > 0.0);
    assert!(ratio.peak() > 1.0);
    assert!(ratio.negpeak() > 1.0);
    assert_eq!(ratio.time_range().first(), Some(3000));
    assert_eq!(ratio.time_range().last(), Some(3500));
}

#[test]
fn partitioned_ingest_of_fixture_matches_sequential() {
    let records = load_fixture_records();

    let mut sequential = ProcessingSession::new(HeatmapSettings::default()).unwrap();
    sequential.ingest_records(&records);
    let mut partitioned = ProcessingSession::new(HeatmapSettings::default()).unwrap();
    partitioned.ingest_records_partitioned(&records);

    let (a, a_stats) = sequential.finish().unwrap();
    let (b, b_stats) = partitioned.finish().unwrap();
    assert_eq!(a_stats, b_stats);
    assert_eq!(a.keys().collect::<Vec<_>>(), b.keys().collect::<Vec<_>>());
    for (ha, hb) in a.heatmaps().zip(b.heatmaps()) {
        assert_eq!(ha.cells(), hb.cells());
        assert_eq!(ha.peak(), hb.peak());
    }
}
