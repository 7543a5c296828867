//! Heatmap → RGBA raster.

use image::RgbaImage;
use rayon::prelude::*;

use heatfield_event_model::settings::{HeatmapSettings, PaletteSettings};
use heatfield_processing_core::{HeatmapAccumulator, HeatmapKey, HeatmapStore};

use crate::palette::{shade, RampBounds, TRANSPARENT};

/// Colors finished heatmaps with a fixed palette.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    palette: PaletteSettings,
}

impl Renderer {
    pub fn new(palette: PaletteSettings) -> Self {
        Self { palette }
    }

    pub fn from_settings(settings: &HeatmapSettings) -> Self {
        Self::new(settings.palette)
    }

    pub fn palette(&self) -> &PaletteSettings {
        &self.palette
    }

    /// Render one heatmap at its own grid size.
    ///
    /// Base heatmaps use the unsigned ramp between their noise floor and
    /// peak. Ratio heatmaps color positive cells with the positive ramp
    /// and negative cells by magnitude with the negative ramp, each side
    /// scaled by its own peak.
    pub fn render(&self, heatmap: &HeatmapAccumulator) -> RgbaImage {
        let width = heatmap.width() as u32;
        let height = heatmap.height() as u32;
        let cells = heatmap.cells();
        let stride = heatmap.width();

        if heatmap.is_signed() {
            let positive = RampBounds::for_peak(heatmap.peak());
            let negative = RampBounds::for_peak(heatmap.negpeak());
            RgbaImage::from_fn(width, height, |x, y| {
                let value = cells[y as usize * stride + x as usize];
                if value > 0.0 {
                    shade(&self.palette.positive, positive, value)
                } else if value < 0.0 {
                    shade(&self.palette.negative, negative, -value)
                } else {
                    TRANSPARENT
                }
            })
        } else {
            let bounds = RampBounds::for_peak(heatmap.peak());
            RgbaImage::from_fn(width, height, |x, y| {
                shade(
                    &self.palette.unsigned,
                    bounds,
                    cells[y as usize * stride + x as usize],
                )
            })
        }
    }

    /// Render every heatmap in the store on the rayon pool, in key order.
    pub fn render_all(&self, store: &HeatmapStore) -> Vec<(HeatmapKey, RgbaImage)> {
        let heatmaps: Vec<&HeatmapAccumulator> = store.heatmaps().collect();
        let images: Vec<_> = heatmaps
            .par_iter()
            .map(|heatmap| (heatmap.key().clone(), self.render(heatmap)))
            .collect();

        tracing::debug!(images = images.len(), "Rendered heatmaps");
        images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatfield_event_model::geometry::WorldRect;
    use heatfield_event_model::metric::{MetricKind, RatioRelation};
    use heatfield_event_model::settings::Falloff;
    use heatfield_processing_core::{CoordinateMapper, DecayKernel, RatioCombiner};
    use image::Rgba;

    fn kernel() -> DecayKernel {
        let mapper =
            CoordinateMapper::new(WorldRect::new(0.0, 0.0, 1000.0, 1000.0), 100, 100).unwrap();
        DecayKernel::new(mapper, 2, Falloff::Linear).unwrap()
    }

    #[test]
    fn test_single_event_render() {
        let mut heatmap =
            HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Smoke, "R", "all"), 100, 100);
        heatmap.apply_event(&kernel(), 1, 500.0, 500.0, 4.0);

        let image = Renderer::default().render(&heatmap);
        assert_eq!(image.dimensions(), (100, 100));
        // Peak pixel gets the high color.
        assert_eq!(*image.get_pixel(50, 50), Rgba([240, 255, 240, 255]));
        // Neighbor at 3.0 sits between floor (0.875) and peak.
        let neighbor = *image.get_pixel(51, 50);
        assert_ne!(neighbor, TRANSPARENT);
        assert_ne!(neighbor, Rgba([240, 255, 240, 255]));
        // Untouched pixels are transparent.
        assert_eq!(*image.get_pixel(0, 0), TRANSPARENT);
    }

    #[test]
    fn test_faint_heatmap_is_fully_transparent() {
        let mut heatmap =
            HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Smoke, "R", "all"), 100, 100);
        heatmap.apply_event(&kernel(), 1, 500.0, 500.0, 0.5);

        let image = Renderer::default().render(&heatmap);
        assert!(image.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_signed_render_uses_both_ramps() {
        let k = kernel();
        let mut kills =
            HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Kills, "R", "all"), 100, 100);
        let mut deaths =
            HeatmapAccumulator::new(HeatmapKey::new(MetricKind::Deaths, "R", "all"), 100, 100);
        kills.apply_event(&k, 1, 205.0, 205.0, 2.0);
        deaths.apply_event(&k, 2, 805.0, 805.0, 2.0);
        let ratio = RatioCombiner::combine(
            &kills,
            &deaths,
            RatioRelation::new(MetricKind::Kills, MetricKind::Deaths).target(),
        )
        .unwrap();

        let image = Renderer::default().render(&ratio);
        assert_eq!(*image.get_pixel(20, 20), Rgba([240, 255, 240, 255]));
        assert_eq!(*image.get_pixel(80, 80), Rgba([255, 240, 240, 255]));
        assert_eq!(*image.get_pixel(50, 50), TRANSPARENT);
    }

    #[test]
    fn test_render_all_follows_store_order() {
        let k = kernel();
        let mut store = HeatmapStore::new(100, 100);
        store
            .get(MetricKind::Deaths, "R", "all")
            .apply_event(&k, 1, 500.0, 500.0, 1.0);
        store
            .get(MetricKind::Smoke, "R", "all")
            .apply_event(&k, 1, 500.0, 500.0, 1.0);

        let images = Renderer::default().render_all(&store);
        let keys: Vec<_> = images.iter().map(|(key, _)| key.clone()).collect();
        assert_eq!(keys, store.keys().cloned().collect::<Vec<_>>());
    }
}
