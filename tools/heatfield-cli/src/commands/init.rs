//! Write default heatmap settings.

use std::path::PathBuf;

use heatfield_common::config::AppConfig;
use heatfield_event_model::settings::HeatmapSettings;

pub fn run(output: PathBuf, remember: bool, mut config: AppConfig) -> anyhow::Result<()> {
    if output.exists() {
        anyhow::bail!("{} already exists; not overwriting", output.display());
    }

    let settings = HeatmapSettings::default();
    settings
        .save(&output)
        .map_err(|e| anyhow::anyhow!("Failed to write settings: {e}"))?;

    println!("Settings written to {}", output.display());
    println!("  Raster: {}x{}", settings.width, settings.height);
    println!(
        "  World: ({}, {}) - ({}, {})",
        settings.world.xmin, settings.world.ymin, settings.world.xmax, settings.world.ymax
    );
    println!("  Spread radius: {} px", settings.spread_radius);

    if remember {
        let settings_path = std::fs::canonicalize(&output).unwrap_or(output);
        config.settings_path = Some(settings_path);
        let config_path = config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
        tracing::info!(config = %config_path.display(), "Recorded default settings file");
        println!("Config updated at {}", config_path.display());
    }

    Ok(())
}
