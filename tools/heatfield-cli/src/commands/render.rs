//! Full pipeline: records → heatmaps → PNGs + manifest.

use std::path::PathBuf;

use heatfield_event_model::record::load_records;
use heatfield_event_model::settings::HeatmapSettings;
use heatfield_processing_core::ProcessingSession;
use heatfield_render_engine::export_heatmaps;

pub fn run(
    records_path: PathBuf,
    settings_path: Option<PathBuf>,
    output: PathBuf,
    parallel: bool,
) -> anyhow::Result<()> {
    let settings = match &settings_path {
        Some(path) => HeatmapSettings::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load settings: {e}"))?,
        None => HeatmapSettings::default(),
    };
    tracing::debug!(settings = ?settings_path, output = %output.display(), "Starting render");

    let records = load_records(&records_path)
        .map_err(|e| anyhow::anyhow!("Failed to load records: {e}"))?;

    let mut session = ProcessingSession::new(settings)?;
    if parallel {
        session.ingest_records_partitioned(&records);
    } else {
        session.ingest_records(&records);
    }
    let palette = session.settings().palette;
    let (store, stats) = session.finish()?;

    let manifest = export_heatmaps(&store, &palette, &output)?;

    println!("Rendered {} heatmaps to {}", manifest.heatmaps.len(), output.display());
    println!("  Records: {}", stats.records);
    println!("  Events: {} ({} dropped)", stats.events, stats.dropped);
    println!(
        "  Heatmaps: {} base, {} ratio",
        stats.accumulators, stats.ratio_accumulators
    );
    println!("  Subjects: {}", manifest.options.subjects.join(", "));

    Ok(())
}
