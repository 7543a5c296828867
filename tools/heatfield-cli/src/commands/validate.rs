//! Validate a heatmap settings file.

use std::path::PathBuf;

use heatfield_event_model::settings::HeatmapSettings;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating settings at: {}", path.display());

    let settings = HeatmapSettings::load(&path)
        .map_err(|e| anyhow::anyhow!("Invalid settings: {e}"))?;

    println!("  Raster: {}x{}", settings.width, settings.height);
    println!(
        "  World: ({}, {}) - ({}, {})",
        settings.world.xmin, settings.world.ymin, settings.world.xmax, settings.world.ymax
    );
    if settings.world.is_x_inverted() || settings.world.is_y_inverted() {
        println!(
            "  Inverted axes: x={} y={}",
            settings.world.is_x_inverted(),
            settings.world.is_y_inverted()
        );
    }
    println!("  Spread radius: {} px", settings.spread_radius);
    println!("  Decay radius: {:.1} (world units squared)", settings.decay_radius());
    println!("  Falloff: {:?}", settings.falloff);
    for relation in &settings.ratios {
        println!("  Ratio: {}", relation.target().label());
    }

    println!("\nSettings are valid.");
    Ok(())
}
