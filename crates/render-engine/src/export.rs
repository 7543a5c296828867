//! Writing rendered heatmaps to disk: one PNG per heatmap plus a manifest.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use heatfield_common::error::{HeatfieldError, HeatfieldResult};
use heatfield_event_model::event::ALL_GROUPING;
use heatfield_event_model::record::Tick;
use heatfield_event_model::settings::PaletteSettings;
use heatfield_processing_core::{HeatmapAccumulator, HeatmapKey, HeatmapStore};

use crate::renderer::Renderer;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Index of one export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub generated_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub options: SelectorOptions,
    pub heatmaps: Vec<ManifestEntry>,
}

/// Choices a viewer offers for picking a heatmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorOptions {
    pub metrics: Vec<SelectorOption>,
    pub subjects: Vec<String>,
    pub groupings: Vec<SelectorOption>,
}

/// A machine value with its display label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectorOption {
    pub value: String,
    pub label: String,
}

/// One exported image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub metric: String,
    pub subject: String,
    pub grouping: String,
    pub file: String,
    pub label: String,
    pub peak: f64,
    pub negpeak: f64,
    pub floor_peak: f64,
    pub floor_negpeak: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_tick: Option<Tick>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tick: Option<Tick>,
}

impl ManifestEntry {
    fn describe(heatmap: &HeatmapAccumulator, file: String) -> Self {
        let key = heatmap.key();
        let range = heatmap.time_range();
        Self {
            metric: key.metric.slug(),
            subject: key.subject.clone(),
            grouping: key.grouping.clone(),
            file,
            label: format!(
                "{}: {} ({})",
                key.metric.label(),
                key.subject,
                grouping_label(&key.grouping)
            ),
            peak: heatmap.peak(),
            negpeak: heatmap.negpeak(),
            floor_peak: heatmap.floor_peak(),
            floor_negpeak: heatmap.floor_negpeak(),
            first_tick: range.first(),
            last_tick: range.last(),
        }
    }
}

/// Replace anything that is not alphanumeric, `-` or `_` with `.`.
pub fn sanitize_component(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '.'
            }
        })
        .collect()
}

/// `{metric}_{subject}_{grouping}.png`
pub fn file_name(key: &HeatmapKey) -> String {
    format!(
        "{}_{}_{}.png",
        sanitize_component(&key.metric.slug()),
        sanitize_component(&key.subject),
        sanitize_component(&key.grouping)
    )
}

/// The file name for `key`, suffixed `-2`, `-3`, ... when an earlier
/// heatmap of this export already took it.
fn claim_file_name(key: &HeatmapKey, taken: &mut HashSet<String>) -> String {
    let base = file_name(key);
    if taken.insert(base.clone()) {
        return base;
    }

    let stem = base.trim_end_matches(".png");
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}.png");
        if taken.insert(candidate.clone()) {
            tracing::warn!(
                subject = %key.subject,
                grouping = %key.grouping,
                file = %candidate,
                "File name clashes after sanitizing; using a suffix"
            );
            return candidate;
        }
        n += 1;
    }
}

/// Display name for a grouping tag.
pub fn grouping_label(grouping: &str) -> String {
    if grouping == ALL_GROUPING {
        "All".to_string()
    } else {
        grouping.to_string()
    }
}

fn selector_options(store: &HeatmapStore) -> SelectorOptions {
    let mut metrics = BTreeSet::new();
    let mut subjects = BTreeSet::new();
    let mut groupings = BTreeSet::new();
    for key in store.keys() {
        metrics.insert((key.metric, key.metric.label()));
        subjects.insert(key.subject.clone());
        groupings.insert(key.grouping.clone());
    }

    SelectorOptions {
        metrics: metrics
            .into_iter()
            .map(|(metric, label)| SelectorOption {
                value: metric.slug(),
                label,
            })
            .collect(),
        subjects: subjects.into_iter().collect(),
        groupings: groupings
            .into_iter()
            .map(|grouping| SelectorOption {
                label: grouping_label(&grouping),
                value: grouping,
            })
            .collect(),
    }
}

/// Render every heatmap in the store into `out_dir` and write the manifest.
///
/// The directory is created if needed. Existing files with the same names
/// are overwritten. Names that clash after sanitizing get a numeric suffix.
pub fn export_heatmaps(
    store: &HeatmapStore,
    palette: &PaletteSettings,
    out_dir: &Path,
) -> HeatfieldResult<ExportManifest> {
    std::fs::create_dir_all(out_dir)?;

    let renderer = Renderer::new(*palette);
    let mut heatmaps = Vec::with_capacity(store.len());
    let mut taken = HashSet::new();
    for (key, image) in renderer.render_all(store) {
        let heatmap = store
            .lookup(&key)
            .ok_or_else(|| HeatfieldError::render(format!("heatmap {key:?} vanished")))?;
        let entry = ManifestEntry::describe(heatmap, claim_file_name(&key, &mut taken));
        let path = out_dir.join(&entry.file);
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| HeatfieldError::render(format!("{}: {e}", path.display())))?;
        tracing::debug!(file = %entry.file, peak = entry.peak, "Wrote heatmap image");
        heatmaps.push(entry);
    }

    let manifest = ExportManifest {
        generated_at: Utc::now(),
        width: store.width() as u32,
        height: store.height() as u32,
        options: selector_options(store),
        heatmaps,
    };
    let manifest_path = write_manifest(&manifest, out_dir)?;

    tracing::info!(
        images = manifest.heatmaps.len(),
        manifest = %manifest_path.display(),
        "Exported heatmaps"
    );
    Ok(manifest)
}

/// Write `manifest.json` into `out_dir`, returning its path.
pub fn write_manifest(manifest: &ExportManifest, out_dir: &Path) -> HeatfieldResult<PathBuf> {
    let path = out_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

/// Read a manifest written by [`write_manifest`].
pub fn load_manifest(out_dir: &Path) -> HeatfieldResult<ExportManifest> {
    let path = out_dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Err(HeatfieldError::FileNotFound { path });
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}
